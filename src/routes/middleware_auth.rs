use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::state::AppState;

/// Caller that must be authenticated; rejects anonymous requests with 401.
pub struct JwtUser(pub Uuid);

impl<S> FromRequestParts<S> for JwtUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Uuid>()
            .copied()
            .map(JwtUser)
            .ok_or((StatusCode::UNAUTHORIZED, "missing user"))
    }
}

/// Caller identity as attached by `identify`; `None` for anonymous requests.
pub struct MaybeUser(pub Option<Uuid>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Uuid>().copied()))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

pub fn issue_token(user_id: Uuid, secret: &str, ttl_hours: i64) -> anyhow::Result<String> {
    let now = Utc::now();
    let exp = Duration::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| anyhow::anyhow!("token lifetime of {ttl_hours} hours is out of range"))?;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))?;
    Ok(token)
}

pub fn verify_token(token: &str, secret: &str) -> anyhow::Result<Uuid> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(Uuid::parse_str(&data.claims.sub)?)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Attaches the caller's user id to the request when it carries a valid
/// bearer token. Requests without one pass through anonymously; handlers
/// decide what anonymous callers may do.
pub async fn identify(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let user_id = match bearer_token(req.headers()) {
        Some(token) => match verify_token(token, &state.config.jwt_secret) {
            Ok(user_id) => Some(user_id),
            Err(e) => {
                debug!(error = %e, "ignoring invalid bearer token");
                None
            }
        },
        None => None,
    };

    if let Some(user_id) = user_id {
        req.extensions_mut().insert(user_id);
    }

    next.run(req).await
}
