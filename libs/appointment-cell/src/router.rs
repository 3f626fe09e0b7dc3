// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use meeting_cell::{HostRegistry, MeetingIdGenerator};
use shared_config::AppConfig;
use shared_utils::extractor::{auth_middleware, optional_auth_middleware};

use crate::handlers;
use crate::services::{AppointmentStore, AvailabilityPolicy, BookingFormController, SupabaseAppointmentStore};

#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn AppointmentStore>,
    pub hosts: Arc<dyn HostRegistry>,
}

impl BookingState {
    pub fn new(config: Arc<AppConfig>, store: Arc<dyn AppointmentStore>, hosts: Arc<dyn HostRegistry>) -> Self {
        Self { config, store, hosts }
    }

    pub fn with_supabase(config: Arc<AppConfig>, hosts: Arc<dyn HostRegistry>) -> Self {
        let store: Arc<dyn AppointmentStore> = Arc::new(SupabaseAppointmentStore::new(&config));
        Self::new(config, store, hosts)
    }

    /// A fresh controller per request; the form lives in the request body.
    pub fn controller(&self) -> BookingFormController {
        BookingFormController::new(
            Arc::clone(&self.store),
            Arc::clone(&self.hosts),
            MeetingIdGenerator::from_config(&self.config),
            AvailabilityPolicy::from_config(&self.config),
        )
    }
}

pub fn booking_routes(state: BookingState) -> Router {
    // Anonymous callers reach the form and get "registration required" on submit
    let form_routes = Router::new()
        .route("/", get(handlers::booking_form).post(handlers::submit_booking))
        .layer(middleware::from_fn_with_state(state.config.clone(), optional_auth_middleware));

    let protected_routes = Router::new()
        .route("/appointments", get(handlers::my_appointments))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(form_routes)
        .merge(protected_routes)
        .with_state(state)
}
