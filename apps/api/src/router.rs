use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::{booking_routes, AppointmentStore, BookingState};
use auth_cell::auth_routes;
use meeting_cell::{meeting_routes, HostRegistry, MeetingState};
use shared_config::AppConfig;

pub fn create_router(
    config: Arc<AppConfig>,
    store: Arc<dyn AppointmentStore>,
    hosts: Arc<dyn HostRegistry>,
) -> Router {
    Router::new()
        .route("/", get(|| async { "Physio Clinic API is running!" }))
        .nest("/auth", auth_routes(config.clone()))
        .nest("/booking", booking_routes(BookingState::new(config.clone(), store, hosts.clone())))
        // Carries its own /meeting prefix
        .merge(meeting_routes(MeetingState::new(config, hosts)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use appointment_cell::InMemoryAppointmentStore;
    use meeting_cell::InMemoryHostRegistry;

    use super::*;

    fn app() -> Router {
        let config = Arc::new(AppConfig {
            supabase_url: String::new(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: "secret".to_string(),
            app_base_url: "http://localhost:3000".to_string(),
            port: 3000,
            booking_fail_closed: false,
        });
        create_router(config, Arc::new(InMemoryAppointmentStore::new()), Arc::new(InMemoryHostRegistry::new()))
    }

    async fn status_of(uri: &str) -> StatusCode {
        app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_cells_are_mounted() {
        assert_eq!(status_of("/").await, StatusCode::OK);
        assert_eq!(status_of("/booking").await, StatusCode::OK);
        assert_eq!(status_of("/booking/appointments").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_of("/meeting").await, StatusCode::SEE_OTHER);
        assert_eq!(status_of("/meeting/abcd-efgh-ijkl").await, StatusCode::OK);
        assert_eq!(status_of("/auth/user").await, StatusCode::UNAUTHORIZED);
    }
}
