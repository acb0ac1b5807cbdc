// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM integration for the relayer.
//!
//! This module provides:
//! - Ledger queries (token balances, contract existence, wallet nonce and keys)
//! - ENS constructor arguments for wallet deployment
//! - Message hashing, signing and gas-data estimation
//! - The HTTP client that submits deployments to a relayer

pub mod client;
pub mod contracts;
pub mod ens;
pub mod relay;
pub mod signing;

use alloy::primitives::{Address, Bytes, B256, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RelayerResult;
use crate::models::ApplicationInfo;

pub use client::EvmLedger;
pub use ens::{is_valid_ens_name, ConfiguredNameService, EnsArgs, EnsDomain};
pub use relay::RelayerApiClient;

/// Token address standing for the chain's native currency.
pub const ETHER_NATIVE_TOKEN: Address = Address::ZERO;

/// Read-only view of the ledger.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Balance of `address` in `token` (native currency for [`ETHER_NATIVE_TOKEN`]).
    async fn balance_of(&self, address: Address, token: Address) -> RelayerResult<U256>;

    async fn contract_exists_at(&self, address: Address) -> RelayerResult<bool>;

    /// Next nonce the wallet contract will accept.
    async fn last_nonce(&self, wallet: Address) -> RelayerResult<U256>;

    /// Whether `key` is registered as a signing key of `wallet`.
    async fn key_exists(&self, wallet: Address, key: Address) -> RelayerResult<bool>;
}

/// Resolves the ENS constructor arguments for a wallet name.
#[async_trait]
pub trait NameService: Send + Sync {
    async fn args_for(&self, ens_name: &str) -> RelayerResult<EnsArgs>;
}

/// Signed deployment request sent to the relayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRequest {
    pub public_key: Address,
    pub ens_name: String,
    pub gas_price: U256,
    pub gas_token: Address,
    pub signature: Bytes,
    pub application_info: ApplicationInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSubmission {
    pub deployment_hash: B256,
}

/// Accepts signed deployment requests.
#[async_trait]
pub trait DeploymentRelay: Send + Sync {
    async fn submit_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> RelayerResult<DeploymentSubmission>;
}
