// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM ledger client backed by an alloy HTTP provider.

use alloy::{
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use async_trait::async_trait;

use super::contracts::{IWalletContract, IERC20};
use super::{Ledger, ETHER_NATIVE_TOKEN};
use crate::error::{RelayerError, RelayerResult};

/// Ledger queries over JSON-RPC.
pub struct EvmLedger {
    provider: DynProvider,
}

impl EvmLedger {
    /// Create a new client for the given RPC endpoint.
    pub fn new(rpc_url: &str) -> RelayerResult<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| RelayerError::Ledger(format!("Invalid RPC URL: {e}")))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self { provider })
    }
}

fn rpc_error(e: impl std::fmt::Display) -> RelayerError {
    RelayerError::Ledger(format!("RPC error: {e}"))
}

fn contract_error(e: impl std::fmt::Display) -> RelayerError {
    RelayerError::Ledger(format!("Contract error: {e}"))
}

#[async_trait]
impl Ledger for EvmLedger {
    async fn balance_of(&self, address: Address, token: Address) -> RelayerResult<U256> {
        if token == ETHER_NATIVE_TOKEN {
            return self.provider.get_balance(address).await.map_err(rpc_error);
        }

        let contract = IERC20::new(token, self.provider.clone());
        contract
            .balanceOf(address)
            .call()
            .await
            .map_err(contract_error)
    }

    async fn contract_exists_at(&self, address: Address) -> RelayerResult<bool> {
        let code = self
            .provider
            .get_code_at(address)
            .await
            .map_err(rpc_error)?;
        Ok(!code.is_empty())
    }

    async fn last_nonce(&self, wallet: Address) -> RelayerResult<U256> {
        let contract = IWalletContract::new(wallet, self.provider.clone());
        contract.lastNonce().call().await.map_err(contract_error)
    }

    async fn key_exists(&self, wallet: Address, key: Address) -> RelayerResult<bool> {
        let contract = IWalletContract::new(wallet, self.provider.clone());
        contract.keyExist(key).call().await.map_err(contract_error)
    }
}
