// libs/meeting-cell/src/services/entry.rs
use tracing::{debug, warn};

use shared_models::auth::User;

use crate::models::{InCall, Lobby, MeetingError, MeetingId};

impl Lobby {
    /// Entry point of the meeting flow. A missing or malformed identifier is
    /// fatal: the caller must redirect away and never show the lobby.
    pub fn enter(raw_meeting_id: Option<&str>, user: Option<&User>) -> Result<Self, MeetingError> {
        let meeting_id = raw_meeting_id
            .ok_or(MeetingError::InvalidMeeting)
            .and_then(MeetingId::parse)
            .inspect_err(|_| warn!("Rejected meeting entry with id {:?}", raw_meeting_id))?;

        let default_display_name = user
            .and_then(User::email_local_part)
            .map(str::to_string);

        debug!("Entering lobby for meeting {}", meeting_id);

        Ok(Self {
            meeting_id,
            default_display_name,
            user_id: user.map(|u| u.id.clone()),
        })
    }

    /// Leaves the lobby. An omitted name takes the lobby default; a blank one
    /// keeps the participant in the lobby.
    pub fn join(&self, display_name: Option<&str>) -> Result<InCall, MeetingError> {
        let display_name = match display_name {
            Some(entered) => Some(entered.trim()),
            None => self.default_display_name.as_deref(),
        }
        .filter(|name| !name.is_empty())
        .ok_or(MeetingError::MissingDisplayName)?;

        debug!("Participant {} joining meeting {}", display_name, self.meeting_id);

        Ok(InCall {
            meeting_id: self.meeting_id.clone(),
            display_name: display_name.to_string(),
            user_id: self.user_id.clone(),
        })
    }
}
