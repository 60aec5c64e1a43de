//! Shared harness for the HTTP integration tests.
//!
//! Every test gets a fresh in-memory store, its own uploads directory and the default
//! settings, and drives the real router through `tower::ServiceExt::oneshot`.

use std::{future::Future, path::PathBuf, pin::Pin};

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use dentaldesk::{
    api::create_router,
    config::{Config, StorageBackend},
    state::AppState,
};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub type TestFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

pub const MULTIPART_BOUNDARY: &str = "dentaldesk-test-boundary";

pub struct TestApp {
    pub state: AppState,
    pub uploads_dir: PathBuf,
    router: Router,
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, path, body, &[])
            .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut builder = Request::builder().method(method).uri(path);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty))?;
        self.send(request).await
    }

    /// POST a multipart form built by [`multipart_body`].
    pub async fn upload(
        &self,
        path: &str,
        parts: &[MultipartPart<'_>],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))?;
        self.send(request).await
    }

    async fn send(
        &self,
        request: Request<Body>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, body))
    }

    /// POST a JSON body and return the parsed response, failing on anything but `expected`.
    pub async fn post_json(
        &self,
        path: &str,
        value: &Value,
        expected: StatusCode,
    ) -> anyhow::Result<Value> {
        let (status, _headers, body) = self
            .request(Method::POST, path, Some(to_json_body(value)?))
            .await?;
        assert_status(status, expected, &format!("POST {path}: {}", body_text(&body)));
        parse_json(&body)
    }

    pub async fn get_json(&self, path: &str) -> anyhow::Result<Value> {
        let (status, _headers, body) = self.request(Method::GET, path, None).await?;
        assert_status(status, StatusCode::OK, &format!("GET {path}: {}", body_text(&body)));
        parse_json(&body)
    }

    pub async fn create_patient(&self, name: &str) -> anyhow::Result<Value> {
        self.post_json("/api/patients", &minimal_patient(name), StatusCode::CREATED)
            .await
    }

    pub async fn create_visit(&self, patient_id: &str) -> anyhow::Result<Value> {
        self.post_json(
            "/api/visits",
            &minimal_visit(patient_id, "2024-03-01"),
            StatusCode::CREATED,
        )
        .await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.uploads_dir);
    }
}

/// Settings every test starts from: memory store, a private uploads directory and a
/// non-development environment.
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.storage.backend = StorageBackend::Memory;
    config.storage.run_migrations = false;
    config.environment = "test".to_string();
    config.uploads.directory = std::env::temp_dir()
        .join(format!("dentaldesk-test-{}", Uuid::new_v4()))
        .to_string_lossy()
        .into_owned();
    config
}

pub async fn with_test_app<F>(test: F) -> anyhow::Result<()>
where
    F: FnOnce(TestApp) -> TestFuture,
{
    with_test_app_with_config(|_| {}, test).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, test: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: FnOnce(TestApp) -> TestFuture,
{
    let mut config = test_config();
    configure(&mut config);

    let uploads_dir = PathBuf::from(&config.uploads.directory);
    let state = AppState::in_memory(config);
    state.settings_service.seed_defaults().await?;

    let app = TestApp {
        router: create_router(state.clone()),
        state,
        uploads_dir,
    };
    test(app).await
}

pub fn to_json_body<T: Serialize>(value: &T) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn parse_json(body: &[u8]) -> anyhow::Result<Value> {
    Ok(serde_json::from_slice(body)?)
}

pub fn body_text(body: &[u8]) -> String {
    String::from_utf8_lossy(body).into_owned()
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

/// `name=value` of the session cookie set by a response, ready for a `cookie` header.
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("dentaldesk.sid="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

pub fn minimal_patient(name: &str) -> Value {
    json!({
        "name": name,
        "age": 34,
        "sex": "Female",
        "address": "12 Harbour Road",
        "phoneNumber": "555-0101"
    })
}

pub fn minimal_visit(patient_id: &str, date: &str) -> Value {
    json!({
        "patientId": patient_id,
        "date": date,
        "chiefComplaint": "Toothache"
    })
}

pub fn minimal_invoice(patient_id: &str, total: f64) -> Value {
    json!({
        "patientId": patient_id,
        "date": "2024-03-01",
        "totalAmount": total,
        "status": "pending"
    })
}

pub struct MultipartPart<'a> {
    pub name: &'a str,
    /// `(file name, content type)` for file fields; `None` for plain text fields.
    pub file: Option<(&'a str, &'a str)>,
    pub data: &'a [u8],
}

impl<'a> MultipartPart<'a> {
    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file: None,
            data: value.as_bytes(),
        }
    }

    pub fn file(name: &'a str, file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            file: Some((file_name, content_type)),
            data,
        }
    }
}

pub fn multipart_body(parts: &[MultipartPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        match part.file {
            Some((file_name, content_type)) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        part.name, file_name, content_type
                    )
                    .as_bytes(),
                );
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
