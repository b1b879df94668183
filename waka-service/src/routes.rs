// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::primitives::Address;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use waka_ethereum::{
    common::RegistryError,
    reconciler,
    signature::{lower_verse_message, upper_verse_message, verify_signature},
};

use crate::{models::*, AppState};

/// Type alias for route handler results.
type RouteResult<T> = Result<(StatusCode, Json<T>), (StatusCode, Json<ErrorResponse>)>;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "OK" })
}

/// `POST /api/waka/create-upper-verse`: validate, verify the author's
/// signature, mint the upper verse, and hand back the collaboration URL.
pub async fn create_upper_verse(
    State(state): State<AppState>,
    Json(request): Json<CreateUpperVerseRequest>,
) -> RouteResult<CreateUpperVerseResponse> {
    let submission = request.validate().map_err(validation_error)?;

    let message = upper_verse_message(&submission.upper_verse);
    if !verify_signature(&message, &submission.signature, &submission.signer_address) {
        return Err(bad_request("Invalid signature"));
    }

    let receipt = state
        .registry
        .create_upper_verse(&submission.upper_verse)
        .await
        .map_err(registry_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUpperVerseResponse {
            token_id: receipt.token_id,
            tx_hash: receipt.tx_hash.to_string(),
            upper_verse: submission.upper_verse,
            collaboration_url: format!("/waka/{}/complete", receipt.token_id),
        }),
    ))
}

/// `POST /api/waka/create-lower-verse`: validate, verify the author's
/// signature, require an existing incomplete verse, then complete it.
pub async fn create_lower_verse(
    State(state): State<AppState>,
    Json(request): Json<CreateLowerVerseRequest>,
) -> RouteResult<CreateLowerVerseResponse> {
    let submission = request.validate().map_err(validation_error)?;

    let message = lower_verse_message(submission.token_id, &submission.lower_verse);
    if !verify_signature(&message, &submission.signature, &submission.signer_address) {
        return Err(bad_request("Invalid signature"));
    }

    let verse = state
        .registry
        .get_verse(submission.token_id)
        .await
        .map_err(registry_error)?;
    if verse.is_complete {
        return Err(registry_error(RegistryError::AlreadyComplete(
            submission.token_id,
        )));
    }

    let receipt = state
        .registry
        .add_lower_verse(submission.token_id, &submission.lower_verse)
        .await
        .map_err(registry_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateLowerVerseResponse {
            token_id: receipt.token_id,
            tx_hash: receipt.tx_hash.to_string(),
            lower_verse: submission.lower_verse,
            status: "completed",
        }),
    ))
}

/// `GET /api/waka/{id}`: the full current projection of one waka.
pub async fn get_waka(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> RouteResult<WakaResponse> {
    let token_id: u64 = id
        .parse()
        .map_err(|_| bad_request("id must be a token id"))?;
    let verse = state
        .registry
        .get_verse(token_id)
        .await
        .map_err(registry_error)?;
    let payload = WakaPayload::from_verse(token_id, verse);
    if payload.is_complete {
        payload.validate_complete().map_err(validation_error)?;
    }
    Ok((StatusCode::OK, Json(WakaResponse { payload })))
}

/// `GET /api/waka/available/{address}`: the verses `address` may complete,
/// as a point-in-time snapshot of the registry's event log.
pub async fn available_verses(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> RouteResult<Vec<AvailableVerseView>> {
    let owner: Address = address
        .parse()
        .map_err(|_| bad_request("address must be a hex address"))?;
    let verses = reconciler::list_available(state.registry.as_ref(), owner)
        .await
        .map_err(registry_error)?;
    Ok((
        StatusCode::OK,
        Json(verses.into_iter().map(Into::into).collect()),
    ))
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
}

fn validation_error(error: ValidationError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::debug!(%error, "rejected malformed request");
    bad_request(&error.to_string())
}

/// Renders a registry failure as a 400 while keeping the failure category
/// visible in the message and the logs. Transport problems and malformed
/// successes are system faults and logged as errors; rejections are expected
/// traffic.
fn registry_error(error: RegistryError) -> (StatusCode, Json<ErrorResponse>) {
    match &error {
        RegistryError::Transport(_)
        | RegistryError::PendingTransaction(_)
        | RegistryError::TransactionFailed { .. }
        | RegistryError::EventMissing { .. } => {
            tracing::error!(%error, "registry call failed");
        }
        _ => tracing::warn!(%error, "registry rejected request"),
    }
    bad_request(&error.to_string())
}
