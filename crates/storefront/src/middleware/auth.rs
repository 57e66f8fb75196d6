//! Session extractors.
//!
//! The signed-in session lives in local storage, so these read it from
//! [`AppState`] rather than from a cookie.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::session::Session;
use crate::state::AppState;

/// Extractor that requires a signed-in customer.
///
/// Rejects with `401 {"error": "..."}` when nobody is signed in.
///
/// # Example
///
/// ```rust,ignore
/// async fn orders(RequireSession(session): RequireSession) -> impl IntoResponse {
///     session.phone.to_string()
/// }
/// ```
pub struct RequireSession(pub Session);

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .sessions()
            .load()?
            .map(Self)
            .ok_or_else(|| AppError::Unauthorized("Please sign in to continue".to_string()))
    }
}

/// Extractor that optionally gets the signed-in customer.
///
/// An unreadable store is logged and treated as signed out.
pub struct OptionalSession(pub Option<Session>);

impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = state.sessions().load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read session");
            None
        });
        Ok(Self(session))
    }
}
