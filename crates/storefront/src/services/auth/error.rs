//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during phone sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Phone number failed validation.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] eggbucket_core::PhoneError),

    /// Verify was called without a code having been sent.
    #[error("no verification code has been requested")]
    NoPendingChallenge,

    /// The sent code is too old to use.
    #[error("verification code has expired")]
    ChallengeExpired,

    /// The code does not match.
    #[error("invalid verification code")]
    InvalidCode,

    /// The code was blank or not numeric.
    #[error("verification code must be 6 digits")]
    MalformedCode,

    /// The provider is throttling this number or device.
    #[error("too many attempts, try again later")]
    TooManyAttempts,

    /// The provider rejected the request for another reason.
    #[error("auth provider error: {0}")]
    Provider(String),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl AuthError {
    /// Map a provider error code (e.g. `INVALID_CODE`) to an error.
    #[must_use]
    pub fn from_provider_code(code: &str) -> Self {
        // Codes may carry a suffix: "TOO_MANY_ATTEMPTS_TRY_LATER : ..."
        let head = code.split([' ', ':']).next().unwrap_or_default();
        match head {
            "INVALID_CODE" | "INVALID_VERIFICATION_CODE" => Self::InvalidCode,
            "SESSION_EXPIRED" | "CODE_EXPIRED" | "INVALID_SESSION_INFO" => Self::ChallengeExpired,
            "MISSING_CODE" => Self::MalformedCode,
            "TOO_MANY_ATTEMPTS_TRY_LATER" | "QUOTA_EXCEEDED" => Self::TooManyAttempts,
            "INVALID_PHONE_NUMBER" => Self::Provider("invalid phone number".to_string()),
            _ => Self::Provider(code.to_string()),
        }
    }
}
