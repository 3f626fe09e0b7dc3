use anyhow::Result;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Postgres error code for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Non-success response from Supabase. Carried inside the `anyhow::Error`
/// returned by [`SupabaseClient`] so callers can downcast and inspect `code`.
#[derive(Debug, Clone, Error)]
#[error("API error ({status}): {message}")]
pub struct SupabaseApiError {
    pub status: StatusCode,
    pub code: Option<String>,
    pub message: String,
}

impl SupabaseApiError {
    fn from_body(status: StatusCode, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();

        // PostgREST uses `code`/`message`, GoTrue uses `error_code`/`msg` or
        // `error`/`error_description`.
        let code = parsed.as_ref().and_then(|v| {
            v.get("code")
                .and_then(Value::as_str)
                .or_else(|| v.get("error_code").and_then(Value::as_str))
                .map(str::to_string)
        });

        let message = parsed
            .as_ref()
            .and_then(|v| {
                ["message", "msg", "error_description", "error"]
                    .iter()
                    .find_map(|key| v.get(*key).and_then(Value::as_str))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.to_string());

        Self { status, code, message }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.code.as_deref() == Some(UNIQUE_VIOLATION)
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(self.status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
    }
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Unauthenticated calls still need a bearer for PostgREST; the anon
        // key doubles as one.
        let bearer = auth_token.unwrap_or(&self.anon_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))?,
        );

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, HeaderMap::new()).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: HeaderMap)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        headers.extend(extra_headers);

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(anyhow::Error::new(SupabaseApiError::from_body(status, &error_text)));
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// `GET /rest/v1/{table}` with PostgREST filters such as
    /// `("status", "eq.scheduled")`. Filter values are URL encoded.
    pub async fn select<T>(&self, table: &str, filters: &[(&str, String)],
                           auth_token: Option<&str>) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let query = filters
            .iter()
            .map(|(column, filter)| format!("{}={}", column, urlencoding::encode(filter)))
            .collect::<Vec<_>>()
            .join("&");

        let path = if query.is_empty() {
            format!("/rest/v1/{}", table)
        } else {
            format!("/rest/v1/{}?{}", table, query)
        };

        self.request(Method::GET, &path, auth_token, None).await
    }

    /// `POST /rest/v1/{table}` returning the inserted rows.
    pub async fn insert<T>(&self, table: &str, row: Value,
                           auth_token: Option<&str>) -> Result<Vec<T>>
    where T: DeserializeOwned {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        let path = format!("/rest/v1/{}", table);
        self.request_with_headers(Method::POST, &path, auth_token, Some(row), headers).await
    }

    pub async fn sign_up(&self, email: &str, password: &str, data: Value) -> Result<Value> {
        self.request(
            Method::POST,
            "/auth/v1/signup",
            None,
            Some(json!({
                "email": email,
                "password": password,
                "data": data,
            })),
        ).await
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Value> {
        self.request(
            Method::POST,
            "/auth/v1/token?grant_type=password",
            None,
            Some(json!({
                "email": email,
                "password": password,
            })),
        ).await
    }

    pub async fn recover_password(&self, email: &str) -> Result<Value> {
        self.request(
            Method::POST,
            "/auth/v1/recover",
            None,
            Some(json!({ "email": email })),
        ).await
    }

    pub async fn get_user(&self, auth_token: &str) -> Result<Value> {
        self.request(Method::GET, "/auth/v1/user", Some(auth_token), None).await
    }

    pub async fn update_user(&self, auth_token: &str, changes: Value) -> Result<Value> {
        self.request(Method::PUT, "/auth/v1/user", Some(auth_token), Some(changes)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&AppConfig {
            supabase_url: server.uri(),
            supabase_anon_key: "anon-key".to_string(),
            supabase_jwt_secret: "secret".to_string(),
            app_base_url: "http://localhost:3000".to_string(),
            port: 3000,
            booking_fail_closed: false,
        })
    }

    #[test]
    fn test_api_error_parses_postgrest_body() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        let err = SupabaseApiError::from_body(StatusCode::CONFLICT, body);

        assert_eq!(err.code.as_deref(), Some("23505"));
        assert_eq!(err.message, "duplicate key value violates unique constraint");
        assert!(err.is_unique_violation());
    }

    #[test]
    fn test_api_error_falls_back_to_raw_text() {
        let err = SupabaseApiError::from_body(StatusCode::BAD_GATEWAY, "upstream down");

        assert_eq!(err.code, None);
        assert_eq!(err.message, "upstream down");
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_other_conflicts_are_not_unique_violations() {
        let body = r#"{"code":"23503","message":"insert or update violates foreign key constraint"}"#;
        let err = SupabaseApiError::from_body(StatusCode::CONFLICT, body);

        assert_eq!(err.code.as_deref(), Some("23503"));
        assert!(!err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_select_encodes_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .and(query_param("time_slot", "eq.10:00 AM"))
            .and(query_param("status", "eq.scheduled"))
            .and(header("apikey", "anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 1 }])))
            .expect(1)
            .mount(&server)
            .await;

        let rows: Vec<Value> = client_for(&server)
            .select(
                "appointments",
                &[("time_slot", "eq.10:00 AM".to_string()), ("status", "eq.scheduled".to_string())],
                Some("token"),
            )
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_surfaces_unique_violation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/appointments"))
            .and(header("Prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .insert::<Value>("appointments", json!({ "name": "Jane" }), Some("token"))
            .await
            .unwrap_err();

        let api_error = err.downcast_ref::<SupabaseApiError>().unwrap();
        assert!(api_error.is_unique_violation());
    }
}
