// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relayer error taxonomy.
//!
//! - **Admission errors** (`InsufficientGas`, `InvalidSignature`,
//!   `InvalidNonce`, `UnsupportedOperation`, `ContractNotWhitelisted`) reject
//!   a signed message before it costs anything. Never retried.
//! - **Validation errors** (`InvalidAddressOrEnsName`, `InvalidCode`,
//!   `InvalidEmail`, `NotFound`) are user-correctable.
//! - **Collaborator failures** (`Ledger`, `NameService`, `Relay`, `Mail`,
//!   `Storage`) are propagated untouched.

use alloy::primitives::{Address, U256};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::storage::StorageError;

/// Fail with the given error unless the condition holds.
///
/// ```rust,ignore
/// ensure!(is_valid_ens_name(name), RelayerError::InvalidAddressOrEnsName(name.to_string()));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err.into());
        }
    };
}

#[derive(Debug, thiserror::Error)]
pub enum RelayerError {
    #[error("Insufficient gas: {reason}")]
    InsufficientGas { reason: String },

    #[error("Invalid signature: recovered signer {signer} is not a key of wallet {wallet}")]
    InvalidSignature { wallet: Address, signer: Address },

    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    #[error("Invalid nonce: expected {expected}, got {actual}")]
    InvalidNonce { expected: U256, actual: U256 },

    #[error("Unsupported operation type: {0}")]
    UnsupportedOperation(u8),

    #[error("Contract {0} is not whitelisted")]
    ContractNotWhitelisted(Address),

    #[error("{0} is not valid address or ENS name")]
    InvalidAddressOrEnsName(String),

    #[error("Invalid code")]
    InvalidCode,

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid deployment condition: {0}")]
    InvalidCondition(String),

    #[error("Balance observer already resolved")]
    ObserverResolved,

    #[error("Balance observer already started")]
    ObserverStarted,

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Name service error: {0}")]
    NameService(String),

    #[error("Relay error: {0}")]
    Relay(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type RelayerResult<T> = Result<T, RelayerError>;

impl RelayerError {
    /// Stable machine-readable code for API clients.
    pub fn error_code(&self) -> &'static str {
        match self {
            RelayerError::InsufficientGas { .. } => "insufficient_gas",
            RelayerError::InvalidSignature { .. } => "invalid_signature",
            RelayerError::MalformedSignature(_) => "malformed_signature",
            RelayerError::InvalidNonce { .. } => "invalid_nonce",
            RelayerError::UnsupportedOperation(_) => "unsupported_operation",
            RelayerError::ContractNotWhitelisted(_) => "contract_not_whitelisted",
            RelayerError::InvalidAddressOrEnsName(_) => "invalid_address_or_ens_name",
            RelayerError::InvalidCode => "invalid_code",
            RelayerError::InvalidEmail(_) => "invalid_email",
            RelayerError::NotFound(_) => "not_found",
            RelayerError::InvalidCondition(_) => "invalid_condition",
            RelayerError::ObserverResolved => "observer_resolved",
            RelayerError::ObserverStarted => "observer_started",
            RelayerError::Ledger(_) => "ledger_error",
            RelayerError::NameService(_) => "name_service_error",
            RelayerError::Relay(_) => "relay_error",
            RelayerError::Mail(_) => "mail_error",
            RelayerError::Signing(_) => "signing_error",
            RelayerError::Storage(_) => "storage_error",
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayerError::InsufficientGas { .. }
            | RelayerError::InvalidSignature { .. }
            | RelayerError::MalformedSignature(_)
            | RelayerError::InvalidNonce { .. }
            | RelayerError::UnsupportedOperation(_)
            | RelayerError::ContractNotWhitelisted(_) => StatusCode::UNPROCESSABLE_ENTITY,
            RelayerError::InvalidAddressOrEnsName(_)
            | RelayerError::InvalidCode
            | RelayerError::InvalidEmail(_)
            | RelayerError::InvalidCondition(_) => StatusCode::BAD_REQUEST,
            RelayerError::NotFound(_) => StatusCode::NOT_FOUND,
            RelayerError::ObserverResolved | RelayerError::ObserverStarted => StatusCode::CONFLICT,
            RelayerError::Ledger(_)
            | RelayerError::NameService(_)
            | RelayerError::Relay(_)
            | RelayerError::Mail(_) => StatusCode::BAD_GATEWAY,
            RelayerError::Signing(_) | RelayerError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: String,
}

impl IntoResponse for RelayerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
