// libs/meeting-cell/src/services/call.rs
use tracing::info;

use crate::models::{CallParticipant, InCall, ParticipantRole};
use crate::services::host_registry::HostRegistry;

/// Prepares the participant handed to the external call capability.
pub struct CallSurface;

impl CallSurface {
    /// The participant is host when they are the account that booked the
    /// meeting. Entries recorded without an owner match on display name. The
    /// registry is only read here.
    pub fn initialize(in_call: &InCall, hosts: &dyn HostRegistry) -> CallParticipant {
        let is_host = hosts
            .get_host_entry(&in_call.meeting_id)
            .is_some_and(|entry| match entry.user_id {
                Some(owner) => in_call.user_id.as_deref() == Some(owner.as_str()),
                None => entry.host_name == in_call.display_name,
            });

        let role = if is_host { ParticipantRole::Host } else { ParticipantRole::Guest };

        info!("Call surface initialised for meeting {} as {:?}", in_call.meeting_id, role);

        CallParticipant {
            meeting_id: in_call.meeting_id.clone(),
            display_name: in_call.display_name.clone(),
            role,
        }
    }
}
