use std::sync::Arc;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use tower::ServiceExt;
use serde_json::{json, Value};

use meeting_cell::{meeting_routes, HostRegistry, InMemoryHostRegistry, MeetingId, MeetingState};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

fn create_test_app(hosts: Arc<dyn HostRegistry>) -> Router {
    meeting_routes(MeetingState::new(TestConfig::default().to_arc(), hosts))
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn join_request(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_missing_meeting_id_redirects_with_notice() {
    for uri in ["/meeting", "/meeting/", "/meeting/%20"] {
        let app = create_test_app(Arc::new(InMemoryHostRegistry::new()));

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "uri {}", uri);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let json = body_json(response).await;
        assert_eq!(json["notification"]["title"], "Invalid meeting");
        assert!(json.get("state").is_none(), "lobby must not render for {}", uri);
    }
}

#[tokio::test]
async fn test_lobby_defaults_name_from_signed_in_email() {
    let config = TestConfig::default();
    let user = TestUser::patient("jane.doe@example.com");
    let token = JwtTestUtils::create_test_token(&user, &config.jwt_secret, Some(1));
    let app = create_test_app(Arc::new(InMemoryHostRegistry::new()));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/meeting/abcd-efgh-ijkl")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["state"], "lobby");
    assert_eq!(json["meeting_id"], "abcd-efgh-ijkl");
    assert_eq!(json["default_display_name"], "jane.doe");
}

#[tokio::test]
async fn test_lobby_is_open_to_anonymous_guests() {
    let app = create_test_app(Arc::new(InMemoryHostRegistry::new()));

    let response = app
        .oneshot(Request::builder().uri("/meeting/abcd-efgh-ijkl").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["default_display_name"], Value::Null);
}

#[tokio::test]
async fn test_join_as_recorded_host() {
    let hosts = Arc::new(InMemoryHostRegistry::new());
    hosts.set_host(&MeetingId::parse("abcd-efgh-ijkl").unwrap(), "Jane Doe");
    let app = create_test_app(hosts);

    let response = app
        .oneshot(join_request(
            "/meeting/abcd-efgh-ijkl/join",
            json!({ "display_name": "Jane Doe" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["state"], "in_call");
    assert_eq!(json["participant"]["display_name"], "Jane Doe");
    assert_eq!(json["participant"]["role"], "host");
}

#[tokio::test]
async fn test_join_as_guest_does_not_overwrite_host() {
    let hosts = Arc::new(InMemoryHostRegistry::new());
    let meeting_id = MeetingId::parse("abcd-efgh-ijkl").unwrap();
    hosts.set_host(&meeting_id, "Jane Doe");
    let app = create_test_app(hosts.clone());

    let response = app
        .oneshot(join_request(
            "/meeting/abcd-efgh-ijkl/join",
            json!({ "display_name": "Dr. Smith" }),
            None,
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["participant"]["role"], "guest");
    assert_eq!(hosts.get_host(&meeting_id), Some("Jane Doe".to_string()));
}

#[tokio::test]
async fn test_join_without_name_stays_in_lobby() {
    let app = create_test_app(Arc::new(InMemoryHostRegistry::new()));

    let response = app
        .oneshot(join_request("/meeting/abcd-efgh-ijkl/join", json!({ "display_name": "  " }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["state"], "lobby");
    assert_eq!(json["notification"]["message"], "Please enter your name");
}
