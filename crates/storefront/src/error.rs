//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Errors render as
//! `{"error": "<message>"}` with a status code; server-side failures are
//! captured to Sentry first and their details are not sent to the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use eggbucket_core::{AddressError, CartError, ProfileError, StorageError};
use serde_json::json;
use thiserror::Error;

use crate::backend::BackendError;
use crate::services::auth::AuthError;
use crate::services::geocode::GeocodeError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend API call failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Phone sign-in failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Reverse geocoding failed.
    #[error("Geocode error: {0}")]
    Geocode(#[from] GeocodeError),

    /// Cart could not be updated.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Local storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Address failed validation.
    #[error("{0}")]
    Address(#[from] AddressError),

    /// Profile update failed validation.
    #[error("{0}")]
    Profile(#[from] ProfileError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// No signed-in session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// The request clashes with one already running.
    #[error("{0}")]
    Conflict(String),
}

impl AppError {
    /// Status code sent to the client.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Backend(err) => match err {
                BackendError::NotFound(_) => StatusCode::NOT_FOUND,
                BackendError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
                _ => StatusCode::BAD_GATEWAY,
            },
            Self::Auth(err) => match err {
                AuthError::InvalidPhone(_) | AuthError::MalformedCode => StatusCode::BAD_REQUEST,
                AuthError::NoPendingChallenge
                | AuthError::ChallengeExpired
                | AuthError::InvalidCode => StatusCode::UNAUTHORIZED,
                AuthError::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
                AuthError::Provider(_) | AuthError::Http(_) | AuthError::Parse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Geocode(err) => match err {
                GeocodeError::InvalidCoordinates(_) => StatusCode::BAD_REQUEST,
                GeocodeError::NoResult => StatusCode::NOT_FOUND,
                GeocodeError::Http(_) | GeocodeError::Api { .. } | GeocodeError::Parse(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Cart(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Address(_) | Self::Profile(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Message sent to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Cart(_) | Self::Storage(_) => "Internal server error".to_string(),
            Self::Backend(BackendError::NotFound(_)) => "Not found".to_string(),
            Self::Backend(BackendError::RateLimited(_)) => {
                "Too many requests, please try again shortly".to_string()
            }
            Self::Backend(_) | Self::Geocode(GeocodeError::Http(_) | GeocodeError::Api { .. }) => {
                "Could not reach the EggBucket service, please try again".to_string()
            }
            Self::Geocode(GeocodeError::Parse(_)) => {
                "Could not read the location service response".to_string()
            }
            Self::Auth(err) => match err {
                AuthError::Http(_) | AuthError::Parse(_) | AuthError::Provider(_) => {
                    "Could not verify your phone right now, please try again".to_string()
                }
                other => other.to_string(),
            },
            Self::Geocode(err) => err.to_string(),
            Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Address(err) => err.to_string(),
            Self::Profile(err) => err.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context to the signed-in phone number.
///
/// Call this after a successful sign-in to associate errors with customers.
pub fn set_sentry_user(customer_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(customer_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the customer.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for customer actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "E6")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
