use axum::{ extract::{ Json, State }, http::StatusCode, response::IntoResponse, };
use serde::{Deserialize, Serialize};
use crate::routes::middleware_auth::{issue_token, JwtUser};
use crate::state::AppState;
use uuid::Uuid;
use argon2::{Argon2, PasswordHasher, PasswordVerifier };
use rand::rngs::OsRng;
use argon2::password_hash::{SaltString, PasswordHash};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub id: Uuid,
    pub username: String,
}

fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[\w.@+-]{1,150}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// Checks a registration payload and returns the username to store.
pub fn validate_registration(payload: &RegistrationRequest) -> Result<&str, &'static str> {
    let username = payload.username.trim();
    if !is_valid_username(username) {
        return Err("Enter a valid username. It may contain letters, numbers, and @/./+/-/_ characters.");
    }
    if payload.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("This password is too short. It must contain at least 8 characters.");
    }
    if payload.password != payload.password_confirm {
        return Err("The two password fields didn't match.");
    }
    Ok(username)
}

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegistrationRequest>
) -> impl IntoResponse {
    let username = match validate_registration(&payload) {
        Ok(u) => u.to_string(),
        Err(msg) => return (StatusCode::BAD_REQUEST, msg).into_response(),
    };

    let password_hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "password hashing failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "could not create user").into_response();
        }
    };

    let user = match state.users.create(&username, &password_hash).await {
        Ok(Some(user)) => user,
        Ok(None) => return (StatusCode::CONFLICT, "A user with that username already exists.").into_response(),
        Err(e) => {
            error!(error = %e, "user insert failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "could not create user").into_response();
        }
    };

    info!(user_id = %user.id, "user registered");

    // Registration logs the new user in.
    match issue_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours) {
        Ok(token) => (StatusCode::CREATED, Json(RegisterResponse { id: user.id, username: user.username, token })).into_response(),
        Err(e) => {
            error!(error = %e, "jwt encode error");
            (StatusCode::INTERNAL_SERVER_ERROR, "token error").into_response()
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = match state.users.find_by_username(payload.username.trim()).await {
        Ok(Some(user)) => user,
        Ok(None) => return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response(),
        Err(e) => {
            error!(error = %e, "user lookup failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, "db error").into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %user.id, "login with wrong password");
            return (StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, "stored password hash unreadable");
            return (StatusCode::INTERNAL_SERVER_ERROR, "db error").into_response();
        }
    }

    match issue_token(user.id, &state.config.jwt_secret, state.config.jwt_ttl_hours) {
        Ok(token) => (StatusCode::OK, Json(LoginResponse { token })).into_response(),
        Err(e) => {
            error!(error = %e, "jwt encode error");
            (StatusCode::INTERNAL_SERVER_ERROR, "token error").into_response()
        }
    }
}

pub async fn me(
    State(state): State<AppState>,
    JwtUser(user_id): JwtUser,
) -> impl IntoResponse {
    match state.users.find_by_id(user_id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(MeResponse { id: user.id, username: user.username })).into_response(),
        Ok(None) => (StatusCode::UNAUTHORIZED, "no user").into_response(),
        Err(e) => {
            error!(error = %e, "user lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "db error").into_response()
        }
    }
}
