// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use alloy::primitives::{Address, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Wallet contract operation types. Only `Call` is relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Call,
    DelegateCall,
    Create,
}

impl OperationType {
    pub fn as_u8(self) -> u8 {
        match self {
            OperationType::Call => 0,
            OperationType::DelegateCall => 1,
            OperationType::Create => 2,
        }
    }
}

/// Off-chain signed instruction for a wallet contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignedMessage {
    #[schema(value_type = String)]
    pub from: Address,
    #[schema(value_type = String)]
    pub to: Address,
    #[schema(value_type = String)]
    pub value: U256,
    #[schema(value_type = String)]
    pub data: Bytes,
    #[schema(value_type = String)]
    pub nonce: U256,
    #[schema(value_type = String)]
    pub gas_price: U256,
    #[schema(value_type = String)]
    pub gas_token: Address,
    #[schema(value_type = String)]
    pub gas_limit_execution: U256,
    #[schema(value_type = String)]
    pub gas_data: U256,
    pub operation_type: OperationType,
    #[schema(value_type = String)]
    pub signature: Bytes,
}

/// A token the wallet may be funded with and the amount that unlocks
/// deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportedToken {
    pub address: Address,
    pub minimal_amount: U256,
}

/// Result of a balance wait: which token funded which contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDetails {
    pub token_address: Address,
    pub contract_address: Address,
}

/// What an email confirmation code was requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationIntent {
    Creating,
    Restoring,
}

impl ConfirmationIntent {
    pub const ALL: [ConfirmationIntent; 2] =
        [ConfirmationIntent::Creating, ConfirmationIntent::Restoring];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfirmationIntent::Creating => "creating",
            ConfirmationIntent::Restoring => "restoring",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationStatus {
    /// Code sent, not yet confirmed
    Pending,
    /// Code confirmed, privileged action not yet performed
    Confirmed,
    /// Privileged action performed; the code is spent
    Redeemed,
}

/// Outstanding email confirmation for one `(email, intent)` pair.
///
/// Only the HMAC digest of the code is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfirmation {
    pub id: String,
    pub email: String,
    pub intent: ConfirmationIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ens_name: Option<String>,
    pub code_digest: String,
    pub created_at: DateTime<Utc>,
    pub status: ConfirmationStatus,
}

/// Encrypted wallet backup. `wallet_json` is opaque ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredEncryptedWallet {
    pub email: String,
    pub ens_name: String,
    #[serde(rename = "walletJSON")]
    #[schema(value_type = Object)]
    pub wallet_json: serde_json::Value,
    #[schema(value_type = String)]
    pub contract_address: Address,
    #[schema(value_type = String)]
    pub public_key: Address,
}

/// Client metadata forwarded with deployment requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInfo {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_name: Option<String>,
}
