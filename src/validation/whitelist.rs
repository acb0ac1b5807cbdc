// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::HashSet;

use alloy::primitives::Address;
use async_trait::async_trait;

use super::MessageValidator;
use crate::ensure;
use crate::error::{RelayerError, RelayerResult};
use crate::models::{OperationType, SignedMessage};

/// Only plain calls are relayed. With a non-empty whitelist, calls must
/// target the sending wallet itself or a listed contract.
pub struct WhitelistValidator {
    contracts: HashSet<Address>,
}

impl WhitelistValidator {
    pub fn new(contracts: HashSet<Address>) -> Self {
        Self { contracts }
    }
}

#[async_trait]
impl MessageValidator for WhitelistValidator {
    fn name(&self) -> &'static str {
        "whitelist"
    }

    async fn validate(&self, message: &SignedMessage) -> RelayerResult<()> {
        ensure!(
            message.operation_type == OperationType::Call,
            RelayerError::UnsupportedOperation(message.operation_type.as_u8())
        );
        if self.contracts.is_empty() {
            return Ok(());
        }
        ensure!(
            message.to == message.from || self.contracts.contains(&message.to),
            RelayerError::ContractNotWhitelisted(message.to)
        );
        Ok(())
    }
}
