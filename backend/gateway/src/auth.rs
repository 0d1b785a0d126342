//! Gateway Identity
//!
//! The host shell authenticates users and forwards who they are in headers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    http::StatusCode,
};
use tracing::warn;

use appify_core::UserIdentity;

pub const USER_ID_HEADER: &str = "x-appify-user-id";
pub const USERNAME_HEADER: &str = "x-appify-username";

const FALLBACK_NAME: &str = "there";

/// The caller's identity, taken from the forwarded headers.
pub struct RequireUser(pub UserIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(raw_id) = header(parts, USER_ID_HEADER) else {
            warn!("[Gateway] Missing {USER_ID_HEADER} header");
            return Err((StatusCode::UNAUTHORIZED, "Missing user identity"));
        };
        let Ok(id) = raw_id.parse::<i64>() else {
            warn!(user_id = raw_id, "[Gateway] Invalid user id header");
            return Err((StatusCode::UNAUTHORIZED, "Invalid user identity"));
        };
        let name = header(parts, USERNAME_HEADER).unwrap_or(FALLBACK_NAME);

        Ok(RequireUser(UserIdentity::new(id, name)))
    }
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|val| val.to_str().ok())
        .map(str::trim)
        .filter(|val| !val.is_empty())
}
