//! Phone sign-in route handlers.

use axum::{Json, extract::State};
use eggbucket_core::{CustomerProfile, PhoneNumber};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::backend::types::CustomerPatch;
use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::middleware::OptionalSession;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// Send code request body.
#[derive(Debug, Deserialize)]
pub struct SendCodeRequest {
    pub phone: String,
}

/// Verify code request body.
#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

impl std::fmt::Debug for VerifyCodeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyCodeRequest")
            .field("code", &"[REDACTED]")
            .finish()
    }
}

/// Reply to a send code request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSent {
    pub phone: String,
    pub expires_in_secs: u64,
}

/// Who is signed in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<CustomerProfile>,
}

impl SessionView {
    const fn signed_out() -> Self {
        Self {
            signed_in: false,
            phone: None,
            profile: None,
        }
    }
}

/// Text a verification code. Replaces any earlier pending code.
#[instrument(skip(state))]
pub async fn send_code(
    State(state): State<AppState>,
    Json(request): Json<SendCodeRequest>,
) -> Result<Json<CodeSent>> {
    let phone = PhoneNumber::parse(&request.phone).map_err(AuthError::from)?;

    let challenge = state.auth().send_code(&phone).await?;
    state.set_pending_challenge(Some(challenge))?;
    add_breadcrumb("auth", "Verification code sent", None);

    Ok(Json(CodeSent {
        phone: phone.e164(),
        expires_in_secs: state.config().auth.challenge_ttl.as_secs(),
    }))
}

/// Check the code and sign in.
///
/// A wrong code keeps the challenge so the customer can retry; an expired
/// one is dropped.
#[instrument(skip(state))]
pub async fn verify_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> Result<Json<SessionView>> {
    let challenge = state
        .pending_challenge()?
        .ok_or(AuthError::NoPendingChallenge)?;

    if challenge.is_expired(state.config().auth.challenge_ttl) {
        state.set_pending_challenge(None)?;
        return Err(AuthError::ChallengeExpired.into());
    }

    let session = match state.auth().verify(&challenge, &request.code).await {
        Ok(session) => session,
        Err(AuthError::ChallengeExpired) => {
            state.set_pending_challenge(None)?;
            return Err(AuthError::ChallengeExpired.into());
        }
        Err(e) => return Err(e.into()),
    };

    state.sessions().save(&session)?;
    state.set_pending_challenge(None)?;
    set_sentry_user(&session.phone.customer_id());
    tracing::info!(phone = %session.phone, "Signed in");

    let backend = state.backend();
    if let Err(e) = backend
        .patch_customer(&session.phone, &CustomerPatch::phone(session.phone.e164()))
        .await
    {
        tracing::warn!(error = %e, "Could not record phone on customer document");
    }

    let profile = match backend.customer(&session.phone).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Could not load profile after sign-in");
            None
        }
    }
    .unwrap_or_else(|| CustomerProfile::with_phone(session.phone.e164()));

    Ok(Json(SessionView {
        signed_in: true,
        phone: Some(session.phone.e164()),
        profile: Some(profile),
    }))
}

/// Current sign-in state.
#[instrument(skip_all)]
pub async fn session(OptionalSession(session): OptionalSession) -> Json<SessionView> {
    Json(session.map_or_else(SessionView::signed_out, |s| SessionView {
        signed_in: true,
        phone: Some(s.phone.e164()),
        profile: None,
    }))
}

/// Sign out. The cart is kept.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Result<Json<SessionView>> {
    state.sessions().clear()?;
    state.set_pending_challenge(None)?;
    clear_sentry_user();
    tracing::info!("Signed out");

    Ok(Json(SessionView::signed_out()))
}
