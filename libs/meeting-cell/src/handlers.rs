// libs/meeting-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;

use shared_models::auth::MaybeSession;
use shared_models::notification::Notification;

use crate::models::{JoinMeetingRequest, Lobby, MeetingError};
use crate::router::MeetingState;
use crate::services::CallSurface;

fn invalid_meeting_response() -> Response {
    let notification = Notification::error(
        "Invalid meeting",
        "This meeting link is not valid. Please check the link and try again.",
    );

    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, "/")],
        Json(json!({
            "redirect": "/",
            "notification": notification,
        })),
    )
        .into_response()
}

/// `GET /meeting` with no identifier: routing error, straight back home.
pub async fn invalid_meeting() -> Response {
    info!("Meeting requested without an identifier");
    invalid_meeting_response()
}

pub async fn meeting_lobby(
    Path(meeting_id): Path<String>,
    Extension(session): Extension<MaybeSession>,
) -> Response {
    let user = session.0.as_ref().map(|s| &s.user);

    match Lobby::enter(Some(&meeting_id), user) {
        Ok(lobby) => Json(json!({
            "state": "lobby",
            "meeting_id": lobby.meeting_id,
            "default_display_name": lobby.default_display_name,
        }))
        .into_response(),
        Err(_) => invalid_meeting_response(),
    }
}

pub async fn join_meeting(
    State(state): State<MeetingState>,
    Path(meeting_id): Path<String>,
    Extension(session): Extension<MaybeSession>,
    Json(request): Json<JoinMeetingRequest>,
) -> Response {
    let user = session.0.as_ref().map(|s| &s.user);

    let lobby = match Lobby::enter(Some(&meeting_id), user) {
        Ok(lobby) => lobby,
        Err(_) => return invalid_meeting_response(),
    };

    match lobby.join(request.display_name.as_deref()) {
        Ok(in_call) => {
            let participant = CallSurface::initialize(&in_call, state.hosts.as_ref());

            Json(json!({
                "state": "in_call",
                "participant": participant,
            }))
            .into_response()
        }
        Err(err @ MeetingError::MissingDisplayName) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "state": "lobby",
                "meeting_id": lobby.meeting_id,
                "default_display_name": lobby.default_display_name,
                "notification": Notification::warning("Name required", err.to_string()),
            })),
        )
            .into_response(),
        Err(MeetingError::InvalidMeeting) => invalid_meeting_response(),
    }
}
