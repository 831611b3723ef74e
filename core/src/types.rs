//! Domain DTOs for the poll API.
//!
//! # Design
//! These types mirror the poll server's JSON schema but are defined
//! independently of the mock-server crate; integration tests catch schema
//! drift. Response timestamps stay as the server's RFC 3339 strings since
//! the client only displays them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A poll with its candidate slots and everyone who voted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Poll {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: String,
    pub starts_at: String,
    pub ends_at: String,
    /// Number of participants who marked this slot as available.
    #[serde(default)]
    pub available_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub votes: Vec<Vote>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub time_slot_id: String,
    pub available: bool,
}

/// One row of the admin's event listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: String,
}

/// Request payload for creating a poll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatePoll {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub time_slots: Vec<TimeSlotInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeSlotInput {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Request payload for a first-time vote; creates the participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmitVote {
    pub participant_name: String,
    pub votes: Vec<VoteInput>,
}

/// Request payload replacing an existing participant's votes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateVotes {
    pub votes: Vec<VoteInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteInput {
    pub time_slot_id: String,
    pub available: bool,
}

/// Admin signup and login payload.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminCredentials {
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollCreated {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollDeleted {
    pub id: String,
}

/// Returned by both vote submission and vote update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParticipantSaved {
    pub participant_id: String,
}

/// Session issued by admin signup or login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminAuth {
    pub token: String,
    pub admin_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoutResult {
    pub ok: bool,
}
