// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{ConfirmationIntent, OperationType, SignedMessage, StoredEncryptedWallet},
    state::AppState,
};

pub mod email;
pub mod health;
pub mod wallet;

pub fn router(state: AppState) -> Router {
    let email_routes = Router::new()
        .route("/request", post(email::request_confirmation))
        .route("/restore", post(email::request_restore))
        .route("/confirmation", post(email::confirm));

    let wallet_routes = Router::new()
        .route("/encrypted", post(wallet::store_encrypted_wallet))
        .route("/encrypted/restore", post(wallet::restore_encrypted_wallet))
        .route("/execution/validate", post(wallet::validate_message));

    let api_routes = Router::new()
        .nest("/email", email_routes)
        .nest("/wallet", wallet_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        email::request_confirmation,
        email::request_restore,
        email::confirm,
        wallet::store_encrypted_wallet,
        wallet::restore_encrypted_wallet,
        wallet::validate_message,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            email::EmailConfirmationRequest,
            email::EmailRestoreRequest,
            email::EmailConfirmationCode,
            email::EmailResponse,
            wallet::StoreEncryptedWalletRequest,
            wallet::RestoreEncryptedWalletRequest,
            wallet::MessageAdmission,
            StoredEncryptedWallet,
            SignedMessage,
            OperationType,
            ConfirmationIntent,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Email", description = "Email confirmation codes"),
        (name = "Wallet", description = "Encrypted wallet backups and message admission"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
