// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::RelayerError, recovery::normalize_email, state::AppState};

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailConfirmationRequest {
    pub email: String,
    /// Name the wallet backup will be stored under.
    pub ens_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EmailRestoreRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EmailConfirmationCode {
    pub email: String,
    pub code: String,
}

/// Normalized email the request was accepted for.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmailResponse {
    pub response: String,
}

#[utoipa::path(
    post,
    path = "/email/request",
    request_body = EmailConfirmationRequest,
    tag = "Email",
    responses(
        (status = 201, description = "Code sent", body = EmailResponse),
        (status = 400, description = "Invalid email or ENS name")
    )
)]
pub async fn request_confirmation(
    State(state): State<AppState>,
    Json(request): Json<EmailConfirmationRequest>,
) -> Result<(StatusCode, Json<EmailResponse>), RelayerError> {
    let email = state
        .recovery
        .request_creating(&request.email, &request.ens_name)
        .await?;
    Ok((StatusCode::CREATED, Json(EmailResponse { response: email })))
}

#[utoipa::path(
    post,
    path = "/email/restore",
    request_body = EmailRestoreRequest,
    tag = "Email",
    responses(
        (status = 201, description = "Code sent", body = EmailResponse),
        (status = 404, description = "No backup stored for this email")
    )
)]
pub async fn request_restore(
    State(state): State<AppState>,
    Json(request): Json<EmailRestoreRequest>,
) -> Result<(StatusCode, Json<EmailResponse>), RelayerError> {
    let email = state.recovery.request_restore(&request.email).await?;
    Ok((StatusCode::CREATED, Json(EmailResponse { response: email })))
}

#[utoipa::path(
    post,
    path = "/email/confirmation",
    request_body = EmailConfirmationCode,
    tag = "Email",
    responses(
        (status = 201, description = "Email confirmed", body = EmailResponse),
        (status = 400, description = "Invalid code")
    )
)]
pub async fn confirm(
    State(state): State<AppState>,
    Json(request): Json<EmailConfirmationCode>,
) -> Result<(StatusCode, Json<EmailResponse>), RelayerError> {
    let email = normalize_email(&request.email)?;
    state.recovery.confirm(&email, &request.code).await?;
    Ok((StatusCode::CREATED, Json(EmailResponse { response: email })))
}
