//! HTTP request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use pulse_codec::{SignClaimBody, SignClaimResponse, WireCountAttestation};
use pulse_types::{Account, ClaimError};
use pulse_utils::format_duration;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::server::AppState;

// ── Sign claim ───────────────────────────────────────────────────────────

pub async fn sign_claim(
    State(state): State<AppState>,
    body: Result<Json<SignClaimBody>, JsonRejection>,
) -> Result<Json<SignClaimResponse>, ApiError> {
    let started = Instant::now();
    let result = issue(&state, body).await;
    state
        .metrics
        .sign_claim_latency_ms
        .observe(started.elapsed().as_secs_f64() * 1_000.0);

    match result {
        Ok(response) => {
            state.metrics.authorizations_issued.inc();
            Ok(Json(response))
        }
        Err(e) => {
            let error = ApiError(e);
            let reason = error.0.reason();
            state.metrics.record_rejection(reason);
            if error.status().is_server_error() {
                warn!(error = %error.0, reason, "sign-claim failed");
            } else {
                debug!(error = %error.0, reason, "sign-claim refused");
            }
            Err(error)
        }
    }
}

async fn issue(
    state: &AppState,
    body: Result<Json<SignClaimBody>, JsonRejection>,
) -> Result<SignClaimResponse, ClaimError> {
    let Json(body) = body.map_err(|e| ClaimError::InvalidAddress(e.body_text()))?;
    let account = body.account()?;
    let auth = state
        .authority
        .issue_authorization(&account, body.referrer())
        .await?;
    Ok(SignClaimResponse::from_authorization(&auth))
}

// ── Count attestation ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AttestCountBody {
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestCountResponse {
    pub attestation: WireCountAttestation,
    pub authority_sig: String,
}

pub async fn attest_count(
    State(state): State<AppState>,
    body: Result<Json<AttestCountBody>, JsonRejection>,
) -> Result<Json<AttestCountResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ClaimError::InvalidAddress(e.body_text()))?;
    let account = match body.address.trim().parse::<Account>() {
        Ok(account) if !account.is_zero() => account,
        _ => return Err(ClaimError::InvalidAddress(body.address).into()),
    };
    let signed = state
        .authority
        .attest_transaction_count(&account)
        .await
        .inspect_err(|e| state.metrics.record_rejection(e.reason()))?;
    Ok(Json(AttestCountResponse {
        attestation: WireCountAttestation {
            account: signed.attestation.account.to_string(),
            count: signed.attestation.count,
            nonce: signed.attestation.nonce.to_string(),
        },
        authority_sig: signed.authority_sig.to_string(),
    }))
}

// ── Health & metrics ─────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub authority: String,
    pub uptime: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        authority: state.authority.account().to_string(),
        uptime: format_duration(state.started.elapsed().as_secs()),
    })
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.encode(),
    )
}
