// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use async_trait::async_trait;

use super::MessageValidator;
use crate::blockchain::signing::recover_signer;
use crate::blockchain::Ledger;
use crate::ensure;
use crate::error::{RelayerError, RelayerResult};
use crate::models::SignedMessage;

/// The recovered signer must be a registered key of the `from` wallet.
pub struct SignatureValidator {
    ledger: Arc<dyn Ledger>,
}

impl SignatureValidator {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl MessageValidator for SignatureValidator {
    fn name(&self) -> &'static str {
        "signature"
    }

    async fn validate(&self, message: &SignedMessage) -> RelayerResult<()> {
        let signer = recover_signer(message)?;
        let is_key = self.ledger.key_exists(message.from, signer).await?;
        ensure!(
            is_key,
            RelayerError::InvalidSignature {
                wallet: message.from,
                signer,
            }
        );
        Ok(())
    }
}
