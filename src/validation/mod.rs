// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Signed Message Admission
//!
//! A signed message is relayed only if every check accepts it. Checks run
//! in a fixed order and the first rejection wins:
//!
//! | Order | Check | Rejects with |
//! |-------|-------|--------------|
//! | 1 | [`GasValidator`] | `InsufficientGas` |
//! | 2 | [`WhitelistValidator`] | `UnsupportedOperation`, `ContractNotWhitelisted` |
//! | 3 | [`NonceValidator`] | `InvalidNonce` |
//! | 4 | [`SignatureValidator`] | `InvalidSignature`, `MalformedSignature` |
//!
//! Checks only read chain state, so a chain can be shared across requests.

mod gas;
mod nonce;
mod signature;
mod whitelist;

use std::collections::HashSet;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;

use crate::blockchain::Ledger;
use crate::error::RelayerResult;
use crate::models::SignedMessage;

pub use gas::{GasValidator, GAS_BASE};
pub use nonce::NonceValidator;
pub use signature::SignatureValidator;
pub use whitelist::WhitelistValidator;

/// One admission check over a signed message.
#[async_trait]
pub trait MessageValidator: Send + Sync {
    fn name(&self) -> &'static str;

    async fn validate(&self, message: &SignedMessage) -> RelayerResult<()>;
}

/// Ordered, fail-fast list of checks.
pub struct ValidatorChain {
    validators: Vec<Box<dyn MessageValidator>>,
}

impl ValidatorChain {
    pub fn new(validators: Vec<Box<dyn MessageValidator>>) -> Self {
        Self { validators }
    }

    /// Gas, operation whitelist, nonce, then signature.
    pub fn standard(ledger: Arc<dyn Ledger>, whitelist: HashSet<Address>) -> Self {
        Self::new(vec![
            Box::new(GasValidator),
            Box::new(WhitelistValidator::new(whitelist)),
            Box::new(NonceValidator::new(ledger.clone())),
            Box::new(SignatureValidator::new(ledger)),
        ])
    }

    pub async fn validate(&self, message: &SignedMessage) -> RelayerResult<()> {
        for validator in &self.validators {
            if let Err(e) = validator.validate(message).await {
                tracing::debug!(
                    validator = validator.name(),
                    wallet = %message.from,
                    error = %e,
                    "Message rejected"
                );
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::signing::{estimate_gas_data, sign_message, signer_from_private_key};
    use crate::error::RelayerError;
    use crate::models::OperationType;
    use crate::testing::{sample_message, FakeLedger, TEST_PRIVATE_KEY};
    use alloy::primitives::{Bytes, U256};

    const WALLET: Address = Address::repeat_byte(0xaa);

    struct Setup {
        chain: ValidatorChain,
        ledger: Arc<FakeLedger>,
        message: SignedMessage,
    }

    /// A chain plus a message every check accepts.
    fn setup(whitelist: &[Address]) -> Setup {
        let signer = signer_from_private_key(TEST_PRIVATE_KEY).unwrap();
        let ledger = Arc::new(FakeLedger::default());
        let mut message = sample_message(WALLET);
        message.signature = sign_message(&message, &signer).unwrap();

        ledger.set_nonce(WALLET, message.nonce);
        ledger.add_key(WALLET, signer.address());

        let chain = ValidatorChain::standard(ledger.clone(), whitelist.iter().copied().collect());
        Setup {
            chain,
            ledger,
            message,
        }
    }

    /// Re-sign and re-estimate after editing a field, so only the field
    /// under test is wrong.
    fn reseal(message: &mut SignedMessage) {
        let signer = signer_from_private_key(TEST_PRIVATE_KEY).unwrap();
        message.gas_data = estimate_gas_data(message);
        message.signature = sign_message(message, &signer).unwrap();
    }

    #[tokio::test]
    async fn valid_message_passes_every_check() {
        let s = setup(&[]);
        s.chain.validate(&s.message).await.unwrap();
    }

    #[tokio::test]
    async fn wrong_gas_data_fails_gas_check() {
        let s = setup(&[]);
        let mut message = s.message.clone();
        message.gas_data += U256::from(1);
        let signer = signer_from_private_key(TEST_PRIVATE_KEY).unwrap();
        message.signature = sign_message(&message, &signer).unwrap();

        let err = s.chain.validate(&message).await.unwrap_err();
        assert!(matches!(err, RelayerError::InsufficientGas { .. }));
    }

    #[tokio::test]
    async fn zero_gas_limit_always_fails() {
        let s = setup(&[]);
        let mut message = s.message.clone();
        message.gas_limit_execution = U256::ZERO;
        reseal(&mut message);

        let err = s.chain.validate(&message).await.unwrap_err();
        assert!(matches!(err, RelayerError::InsufficientGas { .. }));
    }

    #[tokio::test]
    async fn gas_check_runs_before_ledger_queries() {
        let s = setup(&[]);
        let mut message = s.message.clone();
        message.gas_data = U256::ZERO;

        assert!(s.chain.validate(&message).await.is_err());
        assert_eq!(s.ledger.calls(), 0);
    }

    #[tokio::test]
    async fn delegate_call_is_rejected() {
        let s = setup(&[]);
        let mut message = s.message.clone();
        message.operation_type = OperationType::DelegateCall;
        reseal(&mut message);

        let err = s.chain.validate(&message).await.unwrap_err();
        assert!(matches!(err, RelayerError::UnsupportedOperation(1)));
    }

    #[tokio::test]
    async fn whitelist_allows_listed_contract_and_own_wallet() {
        let listed = Address::repeat_byte(0xbb);
        let s = setup(&[listed]);
        s.chain.validate(&s.message).await.unwrap();

        let mut to_self = s.message.clone();
        to_self.to = WALLET;
        reseal(&mut to_self);
        s.chain.validate(&to_self).await.unwrap();

        let mut elsewhere = s.message.clone();
        elsewhere.to = Address::repeat_byte(0xcc);
        reseal(&mut elsewhere);
        let err = s.chain.validate(&elsewhere).await.unwrap_err();
        assert!(matches!(err, RelayerError::ContractNotWhitelisted(addr) if addr == elsewhere.to));
    }

    #[tokio::test]
    async fn stale_nonce_fails_nonce_check() {
        let s = setup(&[]);
        s.ledger.set_nonce(WALLET, s.message.nonce + U256::from(1));

        let err = s.chain.validate(&s.message).await.unwrap_err();
        match err {
            RelayerError::InvalidNonce { expected, actual } => {
                assert_eq!(expected, s.message.nonce + U256::from(1));
                assert_eq!(actual, s.message.nonce);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unregistered_signer_fails_signature_check() {
        let s = setup(&[]);
        let other_wallet = Address::repeat_byte(0xab);
        let mut message = s.message.clone();
        message.from = other_wallet;
        reseal(&mut message);
        s.ledger.set_nonce(other_wallet, message.nonce);

        let err = s.chain.validate(&message).await.unwrap_err();
        assert!(matches!(err, RelayerError::InvalidSignature { wallet, .. } if wallet == other_wallet));
    }

    #[tokio::test]
    async fn tampered_value_fails_signature_check() {
        let s = setup(&[]);
        let mut message = s.message.clone();
        message.value += U256::from(1);
        message.gas_data = estimate_gas_data(&message);

        let err = s.chain.validate(&message).await.unwrap_err();
        assert!(matches!(err, RelayerError::InvalidSignature { .. }));
    }

    #[tokio::test]
    async fn truncated_signature_is_malformed() {
        let s = setup(&[]);
        let mut message = s.message.clone();
        message.signature = Bytes::from(vec![1u8; 12]);

        let err = s.chain.validate(&message).await.unwrap_err();
        assert!(matches!(err, RelayerError::MalformedSignature(_)));
    }

    #[tokio::test]
    async fn ledger_failure_is_propagated() {
        let s = setup(&[]);
        s.ledger.fail_with("node down");

        let err = s.chain.validate(&s.message).await.unwrap_err();
        assert!(matches!(err, RelayerError::Ledger(msg) if msg == "node down"));
    }
}
