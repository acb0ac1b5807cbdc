// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use async_trait::async_trait;

use super::MessageValidator;
use crate::blockchain::Ledger;
use crate::ensure;
use crate::error::{RelayerError, RelayerResult};
use crate::models::SignedMessage;

/// The message nonce must be the one the wallet accepts next.
pub struct NonceValidator {
    ledger: Arc<dyn Ledger>,
}

impl NonceValidator {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl MessageValidator for NonceValidator {
    fn name(&self) -> &'static str {
        "nonce"
    }

    async fn validate(&self, message: &SignedMessage) -> RelayerResult<()> {
        let expected = self.ledger.last_nonce(message.from).await?;
        ensure!(
            message.nonce == expected,
            RelayerError::InvalidNonce {
                expected,
                actual: message.nonce,
            }
        );
        Ok(())
    }
}
