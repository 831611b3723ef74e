//! Stateless HTTP request builder and response parser for the poll API.
//!
//! # Design
//! `PollClient` holds only the API base path and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Admin-scoped builders take the current token as an
//! argument instead of reading it from ambient storage, so the caller
//! decides where it comes from on every call.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::http::{
    HttpMethod, HttpRequest, HttpResponse, ADMIN_TOKEN_HEADER, CONTENT_TYPE_HEADER,
    JSON_CONTENT_TYPE,
};
use crate::types::{
    AdminAuth, EventSummary, LogoutResult, ParticipantSaved, Poll, PollCreated, PollDeleted,
};

pub const DEFAULT_API_BASE: &str = "/api";

/// Synchronous, stateless client for the poll API.
#[derive(Debug, Clone)]
pub struct PollClient {
    base: String,
}

impl Default for PollClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE)
    }
}

impl PollClient {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.api_base)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Anonymous request primitive. A body, when given, is sent as JSON.
    pub fn build_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = Vec::new();
        let body = match body {
            Some(payload) => {
                headers.push((CONTENT_TYPE_HEADER.to_string(), JSON_CONTENT_TYPE.to_string()));
                Some(
                    serde_json::to_string(payload)
                        .map_err(|e| ApiError::Serialization(e.to_string()))?,
                )
            }
            None => None,
        };
        Ok(HttpRequest {
            method,
            path: format!("{}{path}", self.base),
            headers,
            body,
        })
    }

    /// Admin-scoped request primitive. Attaches `X-Admin-Token` only when
    /// `token` is present and non-empty.
    pub fn build_admin_request<B>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let mut req = self.build_request(method, path, body)?;
        attach_token(&mut req, token);
        Ok(req)
    }

    /// Body-less request; carries the token when one is given.
    fn bare(&self, method: HttpMethod, path: &str, token: Option<&str>) -> HttpRequest {
        let mut req = HttpRequest {
            method,
            path: format!("{}{path}", self.base),
            headers: Vec::new(),
            body: None,
        };
        attach_token(&mut req, token);
        req
    }

    pub fn build_get_poll(&self, id: &str) -> HttpRequest {
        self.bare(HttpMethod::Get, &format!("/poll/{id}"), None)
    }

    pub fn build_create_poll<B>(
        &self,
        payload: &B,
        token: Option<&str>,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_admin_request(HttpMethod::Post, "/poll", Some(payload), token)
    }

    pub fn build_list_events(&self, token: Option<&str>) -> HttpRequest {
        self.bare(HttpMethod::Get, "/events", token)
    }

    pub fn build_delete_poll(&self, id: &str, token: Option<&str>) -> HttpRequest {
        self.bare(HttpMethod::Delete, &format!("/poll/{id}"), token)
    }

    pub fn build_submit_vote<B>(&self, poll_id: &str, payload: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_request(HttpMethod::Post, &format!("/poll/{poll_id}/vote"), Some(payload))
    }

    pub fn build_update_votes<B>(
        &self,
        poll_id: &str,
        participant_id: &str,
        payload: &B,
    ) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_request(
            HttpMethod::Put,
            &format!("/poll/{poll_id}/participant/{participant_id}"),
            Some(payload),
        )
    }

    pub fn build_signup_admin<B>(&self, payload: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_request(HttpMethod::Post, "/admin/signup", Some(payload))
    }

    pub fn build_login_admin<B>(&self, payload: &B) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.build_request(HttpMethod::Post, "/admin/login", Some(payload))
    }

    pub fn build_logout_admin(&self, token: Option<&str>) -> HttpRequest {
        self.bare(HttpMethod::Post, "/admin/logout", token)
    }

    /// Decode any 2xx response body as `T`; `serde_json::Value` returns it
    /// unmodified.
    pub fn parse_json<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        check_status(&response)?;
        let body = response.body.unwrap_or_default();
        serde_json::from_str(&body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn parse_get_poll(&self, response: HttpResponse) -> Result<Poll, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_create_poll(&self, response: HttpResponse) -> Result<PollCreated, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_list_events(&self, response: HttpResponse) -> Result<Vec<EventSummary>, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_delete_poll(&self, response: HttpResponse) -> Result<PollDeleted, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_submit_vote(&self, response: HttpResponse) -> Result<ParticipantSaved, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_update_votes(&self, response: HttpResponse) -> Result<ParticipantSaved, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_signup_admin(&self, response: HttpResponse) -> Result<AdminAuth, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_login_admin(&self, response: HttpResponse) -> Result<AdminAuth, ApiError> {
        self.parse_json(response)
    }

    pub fn parse_logout_admin(&self, response: HttpResponse) -> Result<LogoutResult, ApiError> {
        self.parse_json(response)
    }
}

fn attach_token(req: &mut HttpRequest, token: Option<&str>) {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        req.headers.push((ADMIN_TOKEN_HEADER.to_string(), token.to_string()));
    }
}

/// Map a non-2xx response to `ApiError::Status`. An unreadable body is
/// replaced by the status's canonical reason phrase.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let body = match &response.body {
        Some(text) => text.clone(),
        None => reason_phrase(response.status).to_string(),
    };
    Err(ApiError::Status {
        status: response.status,
        body,
    })
}

fn reason_phrase(status: u16) -> &'static str {
    ::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}
