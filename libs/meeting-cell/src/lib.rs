// libs/meeting-cell/src/lib.rs
//! # Meeting Cell
//!
//! Issues meeting identifiers and join links for booked appointments and
//! walks participants from a link into the call surface.
//!
//! ```text
//! +-----------------------------------------------------+
//! |                   Meeting Cell                      |
//! +-----------------------------------------------------+
//! |  handlers.rs      |  HTTP endpoint handlers         |
//! |  router.rs        |  Route definitions              |
//! |  models.rs        |  Meeting ids, flow states, errors|
//! |  services/        |                                 |
//! |    meeting_id.rs  |  Identifier + join link         |
//! |    host_registry.rs| Meeting id -> host entry       |
//! |    entry.rs       |  Lobby -> in-call flow          |
//! |    call.rs        |  Call surface participant setup |
//! +-----------------------------------------------------+
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /meeting/{meeting_id}` - Lobby for the meeting
//! - `POST /meeting/{meeting_id}/join` - Leave the lobby and enter the call
//! - `GET /meeting` - Invalid meeting, redirects home
//!
//! Video transport itself belongs to the external call capability; this cell
//! only hands it a participant descriptor.
//!
//! The [`HostRegistry`] is shared with the appointment cell, which records the
//! booking's creator as host. Build one at the composition root and pass it to
//! both routers:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use meeting_cell::{meeting_routes, InMemoryHostRegistry, HostRegistry, MeetingState};
//! use shared_config::AppConfig;
//!
//! let config = Arc::new(AppConfig::from_env());
//! let hosts: Arc<dyn HostRegistry> = Arc::new(InMemoryHostRegistry::new());
//! let routes = meeting_routes(MeetingState::new(config, hosts));
//! ```

pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    CallParticipant, InCall, JoinMeetingRequest, Lobby, MeetingError, MeetingId, ParticipantRole,
};

pub use services::{
    CallSurface,
    HostEntry,
    HostRegistry,
    InMemoryHostRegistry,
    MeetingIdGenerator,
};

pub use router::{meeting_routes, MeetingState};
