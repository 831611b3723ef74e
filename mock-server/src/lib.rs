use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

// --- wire types ---

#[derive(Debug, Deserialize)]
pub struct CreatePoll {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlotInput>,
}

#[derive(Debug, Deserialize)]
pub struct TimeSlotInput {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitVote {
    pub participant_name: String,
    #[serde(default)]
    pub votes: Vec<VoteInput>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateVotes {
    pub votes: Vec<VoteInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteInput {
    pub time_slot_id: String,
    pub available: bool,
}

#[derive(Deserialize)]
pub struct AdminCredentials {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PollView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
    pub time_slots: Vec<TimeSlotView>,
    pub participants: Vec<ParticipantView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TimeSlotView {
    pub id: String,
    pub starts_at: String,
    pub ends_at: String,
    pub available_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: String,
    pub name: String,
    pub votes: Vec<VoteInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IdResponse {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub participant_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminAuth {
    pub token: String,
    pub admin_id: String,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

// --- in-memory state ---

struct Admin {
    id: String,
    name: String,
    // Plaintext: this server only backs tests and local development.
    password: String,
}

struct Slot {
    id: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

struct ParticipantRecord {
    id: String,
    name: String,
    votes: Vec<VoteInput>,
}

struct Event {
    id: String,
    seq: u64,
    admin_id: String,
    title: String,
    description: Option<String>,
    created_at: String,
    slots: Vec<Slot>,
    participants: Vec<ParticipantRecord>,
}

impl Event {
    fn has_slot(&self, id: &str) -> bool {
        self.slots.iter().any(|s| s.id == id)
    }

    fn view(&self) -> PollView {
        let mut slots: Vec<&Slot> = self.slots.iter().collect();
        slots.sort_by_key(|s| s.starts_at);
        let time_slots = slots
            .into_iter()
            .map(|s| TimeSlotView {
                id: s.id.clone(),
                starts_at: s.starts_at.to_rfc3339(),
                ends_at: s.ends_at.to_rfc3339(),
                available_count: self
                    .participants
                    .iter()
                    .flat_map(|p| &p.votes)
                    .filter(|v| v.time_slot_id == s.id && v.available)
                    .count() as i64,
            })
            .collect();
        let participants = self
            .participants
            .iter()
            .map(|p| ParticipantView {
                id: p.id.clone(),
                name: p.name.clone(),
                votes: p.votes.clone(),
            })
            .collect();
        PollView {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            created_at: self.created_at.clone(),
            time_slots,
            participants,
        }
    }
}

#[derive(Default)]
pub struct Store {
    admins: HashMap<String, Admin>,
    sessions: HashMap<String, String>,
    events: HashMap<String, Event>,
    next_seq: u64,
}

pub type Db = Arc<RwLock<Store>>;

type Failure = (StatusCode, &'static str);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/poll", post(create_poll))
        .route("/api/poll/{id}", get(get_poll).delete(delete_poll))
        .route("/api/poll/{id}/vote", post(submit_vote))
        .route("/api/poll/{id}/participant/{participant_id}", put(update_votes))
        .route("/api/events", get(list_events))
        .route("/api/admin/signup", post(signup_admin))
        .route("/api/admin/login", post(login_admin))
        .route("/api/admin/logout", post(logout_admin))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn token_of(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Admin id behind the request's token.
fn require_admin(store: &Store, headers: &HeaderMap) -> Result<String, Failure> {
    token_of(headers)
        .and_then(|token| store.sessions.get(token))
        .cloned()
        .ok_or((StatusCode::UNAUTHORIZED, "admin token required"))
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

async fn create_poll(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreatePoll>,
) -> Result<(StatusCode, Json<IdResponse>), Failure> {
    let mut store = db.write().await;
    let admin_id = require_admin(&store, &headers)?;

    let title = input.title.trim();
    if title.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "title must not be empty"));
    }
    if input.time_slots.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "at least one time slot is required"));
    }

    let id = Uuid::new_v4().to_string();
    store.next_seq += 1;
    let event = Event {
        id: id.clone(),
        seq: store.next_seq,
        admin_id,
        title: title.to_string(),
        description: input.description,
        created_at: now(),
        slots: input
            .time_slots
            .into_iter()
            .map(|s| Slot {
                id: Uuid::new_v4().to_string(),
                starts_at: s.starts_at,
                ends_at: s.ends_at,
            })
            .collect(),
        participants: Vec::new(),
    };
    tracing::info!(poll_id = %id, slots = event.slots.len(), "poll created");
    store.events.insert(id.clone(), event);
    Ok((StatusCode::CREATED, Json(IdResponse { id })))
}

async fn get_poll(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<PollView>, Failure> {
    let store = db.read().await;
    store
        .events
        .get(&id)
        .map(|e| Json(e.view()))
        .ok_or((StatusCode::NOT_FOUND, "poll not found"))
}

async fn delete_poll(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<IdResponse>, Failure> {
    let mut store = db.write().await;
    let admin_id = require_admin(&store, &headers)?;

    let owner = store
        .events
        .get(&id)
        .map(|e| e.admin_id.clone())
        .ok_or((StatusCode::NOT_FOUND, "poll not found"))?;
    if owner != admin_id {
        return Err((StatusCode::FORBIDDEN, "poll belongs to another admin"));
    }
    store.events.remove(&id);
    tracing::info!(poll_id = %id, "poll deleted");
    Ok(Json(IdResponse { id }))
}

async fn list_events(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<EventSummary>>, Failure> {
    let store = db.read().await;
    let admin_id = require_admin(&store, &headers)?;

    let mut events: Vec<&Event> = store
        .events
        .values()
        .filter(|e| e.admin_id == admin_id)
        .collect();
    events.sort_by(|a, b| b.seq.cmp(&a.seq));
    Ok(Json(
        events
            .into_iter()
            .map(|e| EventSummary {
                id: e.id.clone(),
                title: e.title.clone(),
                description: e.description.clone(),
                created_at: e.created_at.clone(),
            })
            .collect(),
    ))
}

async fn submit_vote(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<SubmitVote>,
) -> Result<(StatusCode, Json<ParticipantResponse>), Failure> {
    let name = input.participant_name.trim();
    if name.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "participant name must not be empty"));
    }

    let mut store = db.write().await;
    let event = store
        .events
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, "poll not found"))?;
    if !input.votes.iter().all(|v| event.has_slot(&v.time_slot_id)) {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "unknown time slot"));
    }

    let participant_id = Uuid::new_v4().to_string();
    event.participants.push(ParticipantRecord {
        id: participant_id.clone(),
        name: name.to_string(),
        votes: input.votes,
    });
    tracing::debug!(poll_id = %id, participant_id = %participant_id, "votes submitted");
    Ok((StatusCode::CREATED, Json(ParticipantResponse { participant_id })))
}

async fn update_votes(
    State(db): State<Db>,
    Path((id, participant_id)): Path<(String, String)>,
    Json(input): Json<UpdateVotes>,
) -> Result<Json<ParticipantResponse>, Failure> {
    if input.votes.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "votes must not be empty"));
    }

    let mut store = db.write().await;
    let event = store
        .events
        .get_mut(&id)
        .ok_or((StatusCode::NOT_FOUND, "participant not found"))?;
    let slots_known = input.votes.iter().all(|v| event.has_slot(&v.time_slot_id));
    let participant = event
        .participants
        .iter_mut()
        .find(|p| p.id == participant_id)
        .ok_or((StatusCode::NOT_FOUND, "participant not found"))?;
    if !slots_known {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "unknown time slot"));
    }
    participant.votes = input.votes;
    tracing::debug!(poll_id = %id, participant_id = %participant_id, "votes updated");
    Ok(Json(ParticipantResponse { participant_id }))
}

fn open_session(store: &mut Store, admin_id: &str, name: &str) -> AdminAuth {
    let token = Uuid::new_v4().to_string();
    store.sessions.insert(token.clone(), admin_id.to_string());
    AdminAuth {
        token,
        admin_id: admin_id.to_string(),
        name: name.to_string(),
    }
}

async fn signup_admin(
    State(db): State<Db>,
    Json(input): Json<AdminCredentials>,
) -> Result<Json<AdminAuth>, Failure> {
    let name = input.name.trim();
    if name.is_empty() || input.password.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "name and password are required"));
    }

    let mut store = db.write().await;
    if store.admins.values().any(|a| a.name == name) {
        return Err((StatusCode::CONFLICT, "admin name already taken"));
    }
    let admin = Admin {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        password: input.password,
    };
    let auth = open_session(&mut store, &admin.id, &admin.name);
    tracing::info!(admin_id = %admin.id, "admin signed up");
    store.admins.insert(admin.id.clone(), admin);
    Ok(Json(auth))
}

async fn login_admin(
    State(db): State<Db>,
    Json(input): Json<AdminCredentials>,
) -> Result<Json<AdminAuth>, Failure> {
    let name = input.name.trim();
    if name.is_empty() || input.password.is_empty() {
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "name and password are required"));
    }

    let mut store = db.write().await;
    let (id, name) = store
        .admins
        .values()
        .find(|a| a.name == name && a.password == input.password)
        .map(|a| (a.id.clone(), a.name.clone()))
        .ok_or((StatusCode::UNAUTHORIZED, "invalid credentials"))?;
    Ok(Json(open_session(&mut store, &id, &name)))
}

async fn logout_admin(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, Failure> {
    let mut store = db.write().await;
    require_admin(&store, &headers)?;
    if let Some(token) = token_of(&headers) {
        store.sessions.remove(token);
    }
    Ok(Json(LogoutResponse { ok: true }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_poll_defaults_to_no_slots() {
        let input: CreatePoll = serde_json::from_str(r#"{"title":"Team Sync"}"#).unwrap();
        assert_eq!(input.title, "Team Sync");
        assert!(input.description.is_none());
        assert!(input.time_slots.is_empty());
    }

    #[test]
    fn create_poll_rejects_missing_title() {
        let result: Result<CreatePoll, _> = serde_json::from_str(r#"{"time_slots":[]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn slot_timestamps_parse_rfc3339() {
        let slot: TimeSlotInput = serde_json::from_str(
            r#"{"starts_at":"2026-03-02T09:00:00Z","ends_at":"2026-03-02T10:00:00+00:00"}"#,
        )
        .unwrap();
        assert!(slot.starts_at < slot.ends_at);
    }

    #[test]
    fn view_counts_available_votes_and_sorts_slots() {
        let early: DateTime<Utc> = "2026-03-02T09:00:00Z".parse().unwrap();
        let late: DateTime<Utc> = "2026-03-02T11:00:00Z".parse().unwrap();
        let event = Event {
            id: "p".to_string(),
            seq: 1,
            admin_id: "a".to_string(),
            title: "T".to_string(),
            description: None,
            created_at: now(),
            slots: vec![
                Slot { id: "late".to_string(), starts_at: late, ends_at: late },
                Slot { id: "early".to_string(), starts_at: early, ends_at: early },
            ],
            participants: vec![
                ParticipantRecord {
                    id: "u1".to_string(),
                    name: "Ana".to_string(),
                    votes: vec![VoteInput { time_slot_id: "early".to_string(), available: true }],
                },
                ParticipantRecord {
                    id: "u2".to_string(),
                    name: "Bo".to_string(),
                    votes: vec![
                        VoteInput { time_slot_id: "early".to_string(), available: true },
                        VoteInput { time_slot_id: "late".to_string(), available: false },
                    ],
                },
            ],
        };
        let view = event.view();
        assert_eq!(view.time_slots[0].id, "early");
        assert_eq!(view.time_slots[0].available_count, 2);
        assert_eq!(view.time_slots[1].available_count, 0);
        assert_eq!(view.participants.len(), 2);
    }
}
