//! Phone sign-in against an Identity Toolkit style REST API.
//!
//! Sign-in is a two-step challenge:
//!
//! 1. [`PhoneAuthClient::send_code`] asks the provider to text a code and
//!    returns a [`PendingChallenge`] holding the provider's session info.
//! 2. [`PhoneAuthClient::verify`] exchanges the challenge and the code the
//!    customer typed for an id token.
//!
//! The challenge lives in memory only. Restarting the process means asking
//! for a new code.

mod error;

pub use error::AuthError;

use std::time::{Duration, Instant};

use eggbucket_core::PhoneNumber;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::config::AuthConfig;
use crate::session::Session;

/// Length of the texted verification code.
pub const CODE_LENGTH: usize = 6;

/// A sent code waiting to be verified.
#[derive(Clone)]
pub struct PendingChallenge {
    session_info: SecretString,
    phone: PhoneNumber,
    issued_at: Instant,
}

impl std::fmt::Debug for PendingChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingChallenge")
            .field("session_info", &"[REDACTED]")
            .field("phone", &self.phone)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl PendingChallenge {
    #[must_use]
    pub fn new(session_info: impl Into<String>, phone: PhoneNumber, issued_at: Instant) -> Self {
        Self {
            session_info: SecretString::from(session_info.into()),
            phone,
            issued_at,
        }
    }

    /// Phone number the code was sent to.
    #[must_use]
    pub const fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    /// Whether the challenge is older than `ttl` at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.issued_at) > ttl
    }

    #[must_use]
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.is_expired_at(Instant::now(), ttl)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendCodeRequest<'a> {
    phone_number: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendCodeResponse {
    session_info: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    session_info: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    #[serde(default)]
    phone_number: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Deserialize)]
struct ProviderError {
    #[serde(default)]
    message: String,
}

/// Client for the phone auth provider.
#[derive(Clone)]
pub struct PhoneAuthClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl PhoneAuthClient {
    /// Create a new auth client.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, AuthError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!(
            "{}/accounts:{method}",
            self.base_url.as_str().trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.expose_secret())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let code = serde_json::from_str::<ProviderErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_default();
            tracing::warn!(
                status = %status,
                code = %code,
                method,
                "Auth provider rejected request"
            );
            if code.is_empty() {
                return Err(AuthError::Provider(format!("HTTP {status}")));
            }
            return Err(AuthError::from_provider_code(&code));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Text a verification code to `phone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider rejects the number or cannot be
    /// reached.
    #[instrument(skip(self), fields(phone = %phone))]
    pub async fn send_code(&self, phone: &PhoneNumber) -> Result<PendingChallenge, AuthError> {
        let e164 = phone.e164();
        let response: SendCodeResponse = self
            .call(
                "sendVerificationCode",
                &SendCodeRequest {
                    phone_number: &e164,
                },
            )
            .await?;

        tracing::info!("Verification code sent");
        Ok(PendingChallenge::new(
            response.session_info,
            phone.clone(),
            Instant::now(),
        ))
    }

    /// Exchange a challenge and code for a session.
    ///
    /// # Errors
    ///
    /// Returns `MalformedCode` before any network call if `code` is not six
    /// digits, and `InvalidCode`/`ChallengeExpired` as reported by the
    /// provider.
    #[instrument(skip(self, challenge, code), fields(phone = %challenge.phone))]
    pub async fn verify(
        &self,
        challenge: &PendingChallenge,
        code: &str,
    ) -> Result<Session, AuthError> {
        let code = code.trim();
        if code.len() != CODE_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::MalformedCode);
        }

        let response: SignInResponse = self
            .call(
                "signInWithPhoneNumber",
                &SignInRequest {
                    session_info: challenge.session_info.expose_secret(),
                    code,
                },
            )
            .await?;

        let phone = match response.phone_number.as_deref().map(PhoneNumber::parse) {
            Some(Ok(phone)) => phone,
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Provider returned unexpected phone, using requested");
                challenge.phone.clone()
            }
            None => challenge.phone.clone(),
        };

        tracing::info!("Phone verified");
        Ok(Session {
            token: SecretString::from(response.id_token),
            phone,
        })
    }
}
