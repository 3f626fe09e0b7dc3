// libs/meeting-cell/src/models.rs
use std::fmt;

use serde::{Deserialize, Serialize};

const MAX_MEETING_ID_LEN: usize = 64;

/// Opaque token naming one video session. Safe to use as a URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MeetingId(String);

impl MeetingId {
    /// Accepts a trimmed, non-empty token of `[A-Za-z0-9_-]`.
    pub fn parse(raw: &str) -> Result<Self, MeetingError> {
        let trimmed = raw.trim();

        if trimmed.is_empty()
            || trimmed.len() > MAX_MEETING_ID_LEN
            || !trimmed
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(MeetingError::InvalidMeeting);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub(crate) fn from_generated(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MeetingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for MeetingId {
    type Error = MeetingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MeetingId> for String {
    fn from(id: MeetingId) -> Self {
        id.0
    }
}

// ==============================================================================
// ENTRY FLOW STATES
// ==============================================================================

/// Waiting room shown before the call. Only reachable with a valid meeting id.
#[derive(Debug, Clone, Serialize)]
pub struct Lobby {
    pub meeting_id: MeetingId,
    pub default_display_name: Option<String>,
    #[serde(skip)]
    pub user_id: Option<String>,
}

/// The participant has left the lobby and is handed to the call surface.
#[derive(Debug, Clone, Serialize)]
pub struct InCall {
    pub meeting_id: MeetingId,
    pub display_name: String,
    /// Account of the signed-in participant, if any.
    #[serde(skip)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantRole {
    Host,
    Guest,
}

/// What the external call capability receives when the call surface starts.
#[derive(Debug, Clone, Serialize)]
pub struct CallParticipant {
    pub meeting_id: MeetingId,
    pub display_name: String,
    pub role: ParticipantRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinMeetingRequest {
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeetingError {
    #[error("Invalid meeting")]
    InvalidMeeting,

    #[error("Please enter your name")]
    MissingDisplayName,
}
