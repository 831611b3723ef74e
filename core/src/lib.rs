//! Client core for the poll scheduling service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values for the
//! poll REST API without touching the network (host-does-IO pattern), and
//! provides the application shell the front end boots with: path routing,
//! locale handling and the persisted admin session.
//!
//! # Design
//! - `PollClient` is stateless; it holds only the API base path.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit. `PollApi` joins them over a `Transport`.
//! - Admin-scoped builders receive the token explicitly. `Session` owns
//!   the storage it comes from; there is no global state.
//! - DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod i18n;
pub mod router;
pub mod session;
pub mod shell;
pub mod types;

pub use api::{PollApi, Transport};
pub use client::PollClient;
pub use config::AppConfig;
pub use error::{ApiError, ConfigError, ShellError, StorageError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ADMIN_TOKEN_HEADER};
pub use i18n::{I18n, Locale};
pub use router::{Navigator, RouteMatch, RouteTable, View};
pub use session::{JsonFileStore, KeyValueStore, MemoryStore, Session};
pub use shell::{App, Bootstrap, Document, MemoryDocument};
pub use types::{
    AdminAuth, AdminCredentials, CreatePoll, EventSummary, LogoutResult, Participant,
    ParticipantSaved, Poll, PollCreated, PollDeleted, SubmitVote, TimeSlot, TimeSlotInput,
    UpdateVotes, Vote, VoteInput,
};
