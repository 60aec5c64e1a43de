#![allow(unused)]
//! Accounts and cookie sessions.

#[allow(unused)]
mod support;

use axum::http::{Method, StatusCode};
use serde_json::json;
use support::*;

fn credentials(username: &str, password: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({ "username": username, "password": password }))
        .unwrap_or_default()
}

#[tokio::test]
async fn register_login_and_logout_cycle() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, headers, body) = app
                .request(
                    Method::POST,
                    "/api/register",
                    Some(to_json_body(&json!({
                        "username": "reception",
                        "password": "s3cret-pass",
                        "fullName": "Front Desk"
                    }))?),
                )
                .await?;
            assert_status(status, StatusCode::CREATED, "register");
            let user = parse_json(&body)?;
            assert_eq!(user["username"], "reception");
            assert_eq!(user["fullName"], "Front Desk");
            assert!(user.get("password").is_none(), "password must never be returned");
            assert!(session_cookie(&headers).is_some());

            let (status, headers, _body) = app
                .request(
                    Method::POST,
                    "/api/login",
                    Some(credentials("reception", "s3cret-pass")),
                )
                .await?;
            assert_status(status, StatusCode::OK, "login");
            let cookie = session_cookie(&headers).expect("session cookie");

            let set_cookie = headers
                .get("set-cookie")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            assert!(set_cookie.contains("HttpOnly"));
            assert!(!set_cookie.contains("Secure"), "plain HTTP must not get Secure cookies");

            let (status, _headers, body) = app
                .request_with_extra_headers(Method::GET, "/api/user", None, &[("cookie", &cookie)])
                .await?;
            assert_status(status, StatusCode::OK, "current user");
            assert_eq!(parse_json(&body)?["username"], "reception");

            let (status, _headers, _body) = app
                .request_with_extra_headers(Method::POST, "/api/logout", None, &[("cookie", &cookie)])
                .await?;
            assert_status(status, StatusCode::OK, "logout");

            let (status, _headers, body) = app
                .request_with_extra_headers(Method::GET, "/api/user", None, &[("cookie", &cookie)])
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "user after logout");
            assert_eq!(parse_json(&body)?["message"], "Not authenticated");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn wrong_password_is_unauthorized() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            app.post_json(
                "/api/register",
                &json!({ "username": "dr.rao", "password": "correct horse" }),
                StatusCode::CREATED,
            )
            .await?;

            let (status, headers, _body) = app
                .request(Method::POST, "/api/login", Some(credentials("dr.rao", "battery")))
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "wrong password");
            assert!(session_cookie(&headers).is_none());

            let (status, _headers, _body) = app
                .request(Method::POST, "/api/login", Some(credentials("nobody", "battery")))
                .await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "unknown user");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn duplicate_username_is_refused() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let body = json!({ "username": "admin", "password": "first-pass" });
            app.post_json("/api/register", &body, StatusCode::CREATED)
                .await?;

            let (status, _headers, body) = app
                .request(Method::POST, "/api/register", Some(to_json_body(&body)?))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "duplicate username");
            assert_eq!(parse_json(&body)?["message"], "Username already exists");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn anonymous_requests_pass_when_login_is_optional() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, _body) = app.request(Method::GET, "/api/patients", None).await?;
            assert_status(status, StatusCode::OK, "open clinic api");

            let (status, _headers, _body) = app.request(Method::GET, "/api/user", None).await?;
            assert_status(status, StatusCode::UNAUTHORIZED, "no session");
            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn required_login_gates_the_clinic_api() -> anyhow::Result<()> {
    with_test_app_with_config(
        |config| config.auth.require_login = true,
        |app| {
            Box::pin(async move {
                let (status, _headers, _body) =
                    app.request(Method::GET, "/api/patients", None).await?;
                assert_status(status, StatusCode::UNAUTHORIZED, "gated without session");

                let (status, _headers, _body) = app.request(Method::GET, "/health", None).await?;
                assert_status(status, StatusCode::OK, "health stays public");

                let (status, headers, _body) = app
                    .request(
                        Method::POST,
                        "/api/register",
                        Some(credentials("nurse", "pa55word")),
                    )
                    .await?;
                assert_status(status, StatusCode::CREATED, "register is public");
                let cookie = session_cookie(&headers).expect("session cookie");

                let (status, _headers, _body) = app
                    .request_with_extra_headers(
                        Method::GET,
                        "/api/patients",
                        None,
                        &[("cookie", &cookie)],
                    )
                    .await?;
                assert_status(status, StatusCode::OK, "gated with session");
                Ok(())
            })
        },
    )
    .await
}

#[tokio::test]
async fn https_requests_get_secure_cookies() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, headers, _body) = app
                .request_with_extra_headers(
                    Method::POST,
                    "/api/register",
                    Some(credentials("secure-user", "pa55word")),
                    &[("x-forwarded-proto", "https")],
                )
                .await?;
            assert_status(status, StatusCode::CREATED, "register over https");
            let set_cookie = headers
                .get("set-cookie")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            assert!(set_cookie.contains("Secure"));
            Ok(())
        })
    })
    .await
}
