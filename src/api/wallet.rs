// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    blockchain::signing::message_hash,
    error::RelayerError,
    models::{SignedMessage, StoredEncryptedWallet},
    state::AppState,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreEncryptedWalletRequest {
    /// Creating code confirmed through `/email/confirmation`.
    pub code: String,
    pub wallet: StoredEncryptedWallet,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RestoreEncryptedWalletRequest {
    pub email: String,
    /// Restoring code confirmed through `/email/confirmation`.
    pub code: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageAdmission {
    pub message_hash: String,
}

#[utoipa::path(
    post,
    path = "/wallet/encrypted",
    request_body = StoreEncryptedWalletRequest,
    tag = "Wallet",
    responses(
        (status = 201, description = "Backup stored"),
        (status = 400, description = "Invalid or unconfirmed code")
    )
)]
pub async fn store_encrypted_wallet(
    State(state): State<AppState>,
    Json(request): Json<StoreEncryptedWalletRequest>,
) -> Result<StatusCode, RelayerError> {
    state
        .recovery
        .store_wallet(request.wallet, &request.code)
        .await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(
    post,
    path = "/wallet/encrypted/restore",
    request_body = RestoreEncryptedWalletRequest,
    tag = "Wallet",
    responses(
        (status = 200, description = "Stored backup", body = StoredEncryptedWallet),
        (status = 400, description = "Invalid or unconfirmed code")
    )
)]
pub async fn restore_encrypted_wallet(
    State(state): State<AppState>,
    Json(request): Json<RestoreEncryptedWalletRequest>,
) -> Result<Json<StoredEncryptedWallet>, RelayerError> {
    let wallet = state
        .recovery
        .restore_wallet(&request.email, &request.code)
        .await?;
    Ok(Json(wallet))
}

/// Run the admission checks on a signed message without relaying it.
#[utoipa::path(
    post,
    path = "/wallet/execution/validate",
    request_body = SignedMessage,
    tag = "Wallet",
    responses(
        (status = 200, description = "Message is admissible", body = MessageAdmission),
        (status = 422, description = "Message rejected")
    )
)]
pub async fn validate_message(
    State(state): State<AppState>,
    Json(message): Json<SignedMessage>,
) -> Result<Json<MessageAdmission>, RelayerError> {
    state.validators.validate(&message).await?;
    Ok(Json(MessageAdmission {
        message_hash: message_hash(&message).to_string(),
    }))
}
