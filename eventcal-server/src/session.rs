//! Resolve the acting user of a request.
//!
//! Authentication happens in front of this service; the authenticated user
//! id arrives in the `X-User-Id` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use eventcal_core::{User, UserId};

use crate::routes::AppError;
use crate::state::AppState;

pub const USER_HEADER: &str = "x-user-id";

/// The logged-in user, if the header names a known user.
pub struct SessionUser(pub Option<User>);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<UserId>().ok());

        let Some(id) = id else {
            return Ok(SessionUser(None));
        };

        let user = state.registry()?.find_user(id)?;
        Ok(SessionUser(user))
    }
}
