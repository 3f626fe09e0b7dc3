// libs/meeting-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::optional_auth_middleware;

use crate::handlers::*;
use crate::services::HostRegistry;

#[derive(Clone)]
pub struct MeetingState {
    pub config: Arc<AppConfig>,
    pub hosts: Arc<dyn HostRegistry>,
}

impl MeetingState {
    pub fn new(config: Arc<AppConfig>, hosts: Arc<dyn HostRegistry>) -> Self {
        Self { config, hosts }
    }
}

/// Meeting routes carry their full `/meeting` prefix so the bare and
/// trailing-slash forms can be caught explicitly; merge, don't nest.
pub fn meeting_routes(state: MeetingState) -> Router {
    Router::new()
        .route("/meeting", get(invalid_meeting))
        .route("/meeting/", get(invalid_meeting))
        .route("/meeting/{meeting_id}", get(meeting_lobby))
        .route("/meeting/{meeting_id}/join", post(join_meeting))
        // Signed-in users get a default display name; nobody is turned away.
        .layer(middleware::from_fn_with_state(state.config.clone(), optional_auth_middleware))
        .with_state(state)
}
