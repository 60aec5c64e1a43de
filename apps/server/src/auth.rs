//! Staff login: salted scrypt passwords and cookie sessions.
//!
//! Sessions are rows in the clinic store. The cookie carries an HS256 token whose
//! subject is the session id, so a session can be revoked by deleting its row even
//! while the token itself is still within its lifetime.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use dentaldesk_models::{NewUser, Session, User};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    db::{ClinicStore, NewUserRow, UserStore},
    state::AppState,
    Error, Result,
};

pub const SESSION_COOKIE: &str = "dentaldesk.sid";

const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const SCRYPT_KEY_LEN: usize = 64;
const SALT_BYTES: usize = 16;

/// Paths reachable without a session even when login is required.
const PUBLIC_PATHS: &[&str] = &["/login", "/register", "/logout", "/user"];

#[derive(Debug, Clone)]
pub enum AuthError {
    MissingSession,
    InvalidSession(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::InvalidSession(reason) = &self {
            tracing::debug!(reason = %reason, "Rejected session");
        }
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Not authenticated" })),
        )
            .into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: usize,
    exp: usize,
}

/// Hash `password` as `hex(scrypt(password, salt)).salt` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let key = derive_key(password, &salt)?;
    Ok(format!("{}.{}", hex::encode(key), salt))
}

/// Check `password` against a stored `hash.salt` string in constant time.
///
/// Malformed stored values never match.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((hash_hex, salt)) = stored.split_once('.') else {
        return false;
    };
    let Ok(expected) = hex::decode(hash_hex) else {
        return false;
    };
    match derive_key(password, salt) {
        Ok(actual) => constant_time_eq(&expected, &actual),
        Err(_) => false,
    }
}

fn derive_key(password: &str, salt: &str) -> Result<Vec<u8>> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, SCRYPT_KEY_LEN)
        .map_err(|e| Error::Internal(format!("Invalid scrypt parameters: {e}")))?;
    let mut key = vec![0u8; SCRYPT_KEY_LEN];
    scrypt::scrypt(password.as_bytes(), salt.as_bytes(), &params, &mut key)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {e}")))?;
    Ok(key)
}

pub struct SessionManager {
    store: Arc<dyn ClinicStore>,
    secret: Vec<u8>,
    ttl_seconds: u64,
    require_login: bool,
}

impl SessionManager {
    pub fn new(store: Arc<dyn ClinicStore>, config: &AuthConfig) -> Self {
        let secret = match &config.session_secret {
            Some(s) if !s.is_empty() => s.as_bytes().to_vec(),
            _ => {
                tracing::warn!(
                    "`auth.session_secret` is not set; using ephemeral secret (sessions reset on restart)"
                );
                format!("{}{}", Uuid::new_v4(), Uuid::new_v4()).into_bytes()
            }
        };

        Self {
            store,
            secret,
            ttl_seconds: config.session_ttl_seconds,
            require_login: config.require_login,
        }
    }

    pub fn requires_login(&self) -> bool {
        self.require_login
    }

    pub async fn register(&self, new_user: NewUser) -> Result<User> {
        if self
            .store
            .get_user_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(Error::Conflict("Username already exists".to_string()));
        }

        let password = new_user.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| Error::Internal(format!("Password hashing task failed: {e}")))??;

        let user = self
            .store
            .create_user(NewUserRow {
                username: new_user.username.clone(),
                password_hash,
                full_name: new_user.full_name_or_username(),
                role: new_user.role_or_default(),
            })
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// The user for `username` when `password` matches, otherwise 401.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let invalid = || Error::Unauthorized("Invalid username or password".to_string());
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(invalid)?;

        let password = password.to_string();
        let stored = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| Error::Internal(format!("Password check task failed: {e}")))?;
        if !matches {
            tracing::info!(username = %username, "Failed login");
            return Err(invalid());
        }
        Ok(user)
    }

    /// Persist a new session for `user` and return the `Set-Cookie` value for it.
    pub async fn start_session(&self, user: &User, is_https: bool) -> Result<HeaderValue> {
        let now = Utc::now();
        let ttl = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::days(365));
        let session = Session {
            id: Uuid::new_v4().to_string(),
            user_id: user.id,
            expires_at: now.checked_add_signed(ttl).unwrap_or(now),
        };

        let claims = SessionClaims {
            sub: session.id.clone(),
            iat: now.timestamp().max(0) as usize,
            exp: session.expires_at.timestamp().max(0) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.secret),
        )
        .map_err(|e| Error::Internal(format!("Failed to sign session: {e}")))?;

        self.store.create_session(session).await?;

        let cookie = build_set_cookie(SESSION_COOKIE, &token, self.ttl_seconds, is_https);
        HeaderValue::from_str(&cookie)
            .map_err(|e| Error::Internal(format!("Invalid session cookie: {e}")))
    }

    /// Delete the caller's session row, if any. Always succeeds for a missing session.
    pub async fn end_session(&self, headers: &HeaderMap) -> Result<()> {
        if let Ok(session_id) = self.session_id(headers) {
            self.store.delete_session(&session_id).await?;
        }
        Ok(())
    }

    pub fn clear_session_cookie(&self, is_https: bool) -> HeaderValue {
        let cookie = build_clear_cookie(SESSION_COOKIE, is_https);
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }

    /// The user behind the request's session.
    pub async fn current_user(&self, headers: &HeaderMap) -> std::result::Result<User, AuthError> {
        let session_id = self.session_id(headers)?;
        let session = self
            .store
            .get_session(&session_id)
            .await
            .map_err(|e| AuthError::InvalidSession(e.to_string()))?
            .ok_or_else(|| AuthError::InvalidSession("session revoked".to_string()))?;
        if session.is_expired(Utc::now()) {
            return Err(AuthError::InvalidSession("session expired".to_string()));
        }
        self.store
            .get_user(session.user_id)
            .await
            .map_err(|e| AuthError::InvalidSession(e.to_string()))?
            .ok_or_else(|| AuthError::InvalidSession("user no longer exists".to_string()))
    }

    fn session_id(&self, headers: &HeaderMap) -> std::result::Result<String, AuthError> {
        // Allow Authorization: Bearer <token> for non-browser clients.
        if let Some(authz) = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        {
            if let Some(token) = authz
                .strip_prefix("Bearer ")
                .or_else(|| authz.strip_prefix("bearer "))
            {
                return self.decode_token(token);
            }
        }

        let token =
            extract_cookie_value(headers, SESSION_COOKIE).ok_or(AuthError::MissingSession)?;
        self.decode_token(&token)
    }

    fn decode_token(&self, token: &str) -> std::result::Result<String, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data =
            decode::<SessionClaims>(token, &DecodingKey::from_secret(&self.secret), &validation)
                .map_err(|e| AuthError::InvalidSession(e.to_string()))?;
        Ok(data.claims.sub)
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        self.store.purge_expired_sessions(Utc::now()).await
    }
}

/// Session gate for `/api/*`.
///
/// Enforced only when `auth.require_login` is set; otherwise every route is open.
pub async fn session_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if !state.sessions.requires_login() || req.method() == Method::OPTIONS {
        return next.run(req).await;
    }

    // Seen with or without the `/api` prefix depending on nesting.
    let path = req.uri().path();
    let path = path.strip_prefix("/api").unwrap_or(path);
    if PUBLIC_PATHS.contains(&path) {
        return next.run(req).await;
    }

    match state.sessions.current_user(req.headers()).await {
        Ok(_) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

/// Whether the client reached us over HTTPS, directly or through a proxy.
pub fn is_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|p| p.eq_ignore_ascii_case("https"))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for i in 0..a.len() {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

fn extract_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let Some((k, v)) = part.trim().split_once('=') else {
            continue;
        };
        if k.trim() == name {
            return Some(v.trim().to_string());
        }
    }
    None
}

fn build_set_cookie(name: &str, value: &str, max_age_seconds: u64, is_https: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, value, max_age_seconds
    );
    if is_https {
        cookie.push_str("; Secure");
    }
    cookie
}

fn build_clear_cookie(name: &str, is_https: bool) -> String {
    let mut cookie = format!("{name}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0");
    if is_https {
        cookie.push_str("; Secure");
    }
    cookie
}
