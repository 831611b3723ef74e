//! One-call API surface over a pluggable transport.
//!
//! # Design
//! `PollClient` stays I/O free; `PollApi` pairs it with a `Transport` so a
//! view can call `api.get_poll(id)` and get the decoded body. Every method
//! is generic over its result: ask for the DTOs in `crate::types`, or for
//! `serde_json::Value` to get the server's JSON unmodified. The transport
//! is whatever the host uses for the round trip. Its errors are surfaced
//! unchanged inside `ApiError::Transport`. There are no retries here.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::PollClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::{KeyValueStore, Session};

/// Executes one HTTP round trip.
///
/// Implementations must return non-2xx responses as `Ok`; only failures to
/// obtain a response at all are `Err`.
pub trait Transport {
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
        (**self).execute(request)
    }
}

#[derive(Debug, Clone)]
pub struct PollApi<T> {
    client: PollClient,
    transport: T,
}

impl<T: Transport> PollApi<T> {
    pub fn new(client: PollClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PollClient {
        &self.client
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport
            .execute(request)
            .map_err(|e| ApiError::Transport(Box::new(e)))
    }

    fn call<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ApiError> {
        self.client.parse_json(self.send(request)?)
    }

    /// Decode an auth response, keeping its `token` in `session`.
    fn store_token<R, S>(
        &self,
        session: &mut Session<S>,
        request: HttpRequest,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        S: KeyValueStore,
    {
        let value: Value = self.call(request)?;
        let token = value
            .get("token")
            .and_then(Value::as_str)
            .ok_or_else(|| ApiError::Deserialization("missing string field `token`".to_string()))?;
        session.set_admin_token(token)?;
        serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    pub fn get_poll<R: DeserializeOwned>(&self, id: &str) -> Result<R, ApiError> {
        self.call(self.client.build_get_poll(id))
    }

    pub fn create_poll<R, B, S>(&self, session: &Session<S>, payload: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
        S: KeyValueStore,
    {
        let token = session.admin_token()?;
        self.call(self.client.build_create_poll(payload, token.as_deref())?)
    }

    pub fn list_events<R, S>(&self, session: &Session<S>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        S: KeyValueStore,
    {
        let token = session.admin_token()?;
        self.call(self.client.build_list_events(token.as_deref()))
    }

    pub fn delete_poll<R, S>(&self, session: &Session<S>, id: &str) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        S: KeyValueStore,
    {
        let token = session.admin_token()?;
        self.call(self.client.build_delete_poll(id, token.as_deref()))
    }

    pub fn submit_vote<R, B>(&self, poll_id: &str, payload: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(self.client.build_submit_vote(poll_id, payload)?)
    }

    pub fn update_votes<R, B>(
        &self,
        poll_id: &str,
        participant_id: &str,
        payload: &B,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(self.client.build_update_votes(poll_id, participant_id, payload)?)
    }

    /// Create an admin account and store the issued token in `session`.
    pub fn signup_admin<R, B, S>(
        &self,
        session: &mut Session<S>,
        payload: &B,
    ) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
        S: KeyValueStore,
    {
        let request = self.client.build_signup_admin(payload)?;
        self.store_token(session, request)
    }

    /// Log in and store the issued token in `session`.
    pub fn login_admin<R, B, S>(&self, session: &mut Session<S>, payload: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
        S: KeyValueStore,
    {
        let request = self.client.build_login_admin(payload)?;
        self.store_token(session, request)
    }

    /// Revoke the current token server-side, then forget it locally. The
    /// token is kept if the server rejects the logout.
    pub fn logout_admin<R, S>(&self, session: &mut Session<S>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        S: KeyValueStore,
    {
        let token = session.admin_token()?;
        let result = self.call(self.client.build_logout_admin(token.as_deref()))?;
        session.clear_admin_token()?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, ADMIN_TOKEN_HEADER};
    use crate::session::MemoryStore;
    use crate::types::{
        AdminAuth, AdminCredentials, EventSummary, LogoutResult, ParticipantSaved, Poll,
        PollCreated,
    };
    use serde_json::json;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses and records every request it sees.
    #[derive(Default)]
    struct Scripted {
        responses: RefCell<VecDeque<Result<HttpResponse, std::io::Error>>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Ok(HttpResponse::new(status, body)));
            self
        }

        fn fail(self, kind: std::io::ErrorKind, msg: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(std::io::Error::new(kind, msg.to_string())));
            self
        }

        fn last(&self) -> HttpRequest {
            self.seen.borrow().last().cloned().unwrap()
        }
    }

    impl Transport for Scripted {
        type Error = std::io::Error;

        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Self::Error> {
            self.seen.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("no scripted response left")
        }
    }

    fn creds() -> AdminCredentials {
        AdminCredentials {
            name: "root".to_string(),
            password: "pw".to_string(),
        }
    }

    #[test]
    fn create_poll_reads_token_per_call() {
        let transport = Scripted::default()
            .reply(201, r#"{"id":"p_1"}"#)
            .reply(201, r#"{"id":"p_2"}"#);
        let api = PollApi::new(PollClient::default(), &transport);
        let mut session = Session::new(MemoryStore::new());

        session.set_admin_token("abc123").unwrap();
        let created: PollCreated = api
            .create_poll(&session, &json!({"title": "Team Sync"}))
            .unwrap();
        assert_eq!(created.id, "p_1");
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "/api/poll");
        assert_eq!(req.body.as_deref(), Some(r#"{"title":"Team Sync"}"#));
        assert_eq!(req.header(ADMIN_TOKEN_HEADER), Some("abc123"));

        session.clear_admin_token().unwrap();
        let _: PollCreated = api.create_poll(&session, &json!({"title": "Again"})).unwrap();
        assert_eq!(transport.last().header(ADMIN_TOKEN_HEADER), None);
    }

    #[test]
    fn login_stores_token_and_logout_clears_it() {
        let transport = Scripted::default()
            .reply(200, r#"{"token":"tok-1","admin_id":"a1","name":"root"}"#)
            .reply(200, "[]")
            .reply(200, r#"{"ok":true}"#);
        let api = PollApi::new(PollClient::default(), &transport);
        let mut session = Session::new(MemoryStore::new());

        let auth: AdminAuth = api.login_admin(&mut session, &creds()).unwrap();
        assert_eq!(auth.admin_id, "a1");
        assert_eq!(session.admin_token().unwrap().as_deref(), Some("tok-1"));

        let events: Vec<EventSummary> = api.list_events(&session).unwrap();
        assert!(events.is_empty());
        assert_eq!(transport.last().header(ADMIN_TOKEN_HEADER), Some("tok-1"));

        let logout: LogoutResult = api.logout_admin(&mut session).unwrap();
        assert!(logout.ok);
        assert_eq!(transport.last().header(ADMIN_TOKEN_HEADER), Some("tok-1"));
        assert_eq!(session.admin_token().unwrap(), None);
    }

    #[test]
    fn rejected_logout_keeps_token() {
        let transport = Scripted::default().reply(401, "");
        let api = PollApi::new(PollClient::default(), &transport);
        let mut session = Session::new(MemoryStore::new());
        session.set_admin_token("stale").unwrap();

        let err = api.logout_admin::<LogoutResult, _>(&mut session).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(session.admin_token().unwrap().as_deref(), Some("stale"));
    }

    #[test]
    fn failed_login_leaves_session_untouched() {
        let transport = Scripted::default().reply(401, "bad credentials");
        let api = PollApi::new(PollClient::default(), &transport);
        let mut session = Session::new(MemoryStore::new());

        let err = api.login_admin::<AdminAuth, _, _>(&mut session, &creds()).unwrap_err();
        assert_eq!(err.to_string(), "401: bad credentials");
        assert_eq!(session.admin_token().unwrap(), None);
    }

    #[test]
    fn transport_error_propagates_unchanged() {
        let transport =
            Scripted::default().fail(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let api = PollApi::new(PollClient::default(), &transport);

        let err = api.get_poll::<Poll>("p_1").unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn get_poll_not_found_message() {
        let transport = Scripted::default().reply(404, "poll not found");
        let api = PollApi::new(PollClient::default(), &transport);
        let err = api.get_poll::<Poll>("missing").unwrap_err();
        assert_eq!(err.to_string(), "404: poll not found");
        assert_eq!(transport.last().path, "/api/poll/missing");
    }

    #[test]
    fn votes_are_anonymous() {
        let transport = Scripted::default()
            .reply(201, r#"{"participant_id":"u_1"}"#)
            .reply(200, r#"{"participant_id":"u_1"}"#);
        let api = PollApi::new(PollClient::default(), &transport);

        let saved: ParticipantSaved = api
            .submit_vote("p_1", &json!({"participant_name": "Ana", "votes": []}))
            .unwrap();
        assert_eq!(saved.participant_id, "u_1");
        assert_eq!(transport.last().header(ADMIN_TOKEN_HEADER), None);

        let _: ParticipantSaved = api.update_votes("p_1", "u_1", &json!({"votes": []})).unwrap();
        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "/api/poll/p_1/participant/u_1");
    }

    #[test]
    fn unknown_shapes_come_back_as_sent() {
        let body = r#"{"id":"xyz","title":"Lunch","slots":[],"votes":[],"extra":{"k":1}}"#;
        let transport = Scripted::default().reply(200, body);
        let api = PollApi::new(PollClient::default(), &transport);

        let poll: serde_json::Value = api.get_poll("xyz").unwrap();
        assert_eq!(poll, serde_json::from_str::<serde_json::Value>(body).unwrap());
        assert_eq!(transport.last().path, "/api/poll/xyz");
    }

    #[test]
    fn typed_result_rejects_unknown_shape() {
        let transport =
            Scripted::default().reply(200, r#"{"id":"xyz","title":"Lunch","slots":[]}"#);
        let api = PollApi::new(PollClient::default(), &transport);

        let err = api.get_poll::<Poll>("xyz").unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn login_as_value_still_stores_token() {
        let body = r#"{"token":"tok-9","admin_id":"a9","name":"root","role":"owner"}"#;
        let transport = Scripted::default().reply(200, body);
        let api = PollApi::new(PollClient::default(), &transport);
        let mut session = Session::new(MemoryStore::new());

        let auth: serde_json::Value = api.login_admin(&mut session, &creds()).unwrap();
        assert_eq!(auth["role"], "owner");
        assert_eq!(session.admin_token().unwrap().as_deref(), Some("tok-9"));
    }

    #[test]
    fn auth_response_without_token_is_rejected() {
        let transport = Scripted::default().reply(200, r#"{"name":"root"}"#);
        let api = PollApi::new(PollClient::default(), &transport);
        let mut session = Session::new(MemoryStore::new());

        let err = api
            .signup_admin::<serde_json::Value, _, _>(&mut session, &creds())
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
        assert_eq!(session.admin_token().unwrap(), None);
    }
}
