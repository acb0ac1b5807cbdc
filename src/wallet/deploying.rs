// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use alloy::primitives::{Address, B256};
use alloy::signers::local::PrivateKeySigner;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::signing::{estimate_gas_data, sign_message};
use crate::blockchain::Ledger;
use crate::error::{RelayerError, RelayerResult};
use crate::models::SignedMessage;

/// A wallet whose deployment was submitted but not yet mined.
pub struct DeployingWallet {
    deployment_hash: B256,
    contract_address: Address,
    name: String,
    signer: PrivateKeySigner,
}

/// How [`DeployingWallet::wait_to_be_deployed`] ended. Every path that does
/// not confirm the deployment hands the wallet back.
pub enum DeploymentWait {
    Deployed(DeployedWallet),
    /// Shutdown fired before the contract appeared.
    Pending(DeployingWallet),
    Failed(DeployingWallet, RelayerError),
}

impl std::fmt::Debug for DeployingWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployingWallet")
            .field("deployment_hash", &self.deployment_hash)
            .field("contract_address", &self.contract_address)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl DeployingWallet {
    pub(crate) fn new(
        deployment_hash: B256,
        contract_address: Address,
        name: String,
        signer: PrivateKeySigner,
    ) -> Self {
        Self {
            deployment_hash,
            contract_address,
            name,
            signer,
        }
    }

    pub fn deployment_hash(&self) -> B256 {
        self.deployment_hash
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Probe the ledger once.
    pub async fn check(&self, ledger: &dyn Ledger) -> RelayerResult<bool> {
        ledger.contract_exists_at(self.contract_address).await
    }

    /// Poll until the contract exists, `shutdown` fires or a ledger query
    /// fails.
    pub async fn wait_to_be_deployed(
        self,
        ledger: &dyn Ledger,
        poll_interval: Duration,
        shutdown: CancellationToken,
    ) -> DeploymentWait {
        if poll_interval.is_zero() {
            return DeploymentWait::Failed(
                self,
                RelayerError::InvalidCondition("poll interval must be greater than zero".into()),
            );
        }

        loop {
            match self.check(ledger).await {
                Ok(true) => {
                    info!(
                        contract_address = %self.contract_address,
                        name = %self.name,
                        "Wallet deployed"
                    );
                    return DeploymentWait::Deployed(DeployedWallet {
                        contract_address: self.contract_address,
                        name: self.name,
                        signer: self.signer,
                    });
                }
                Ok(false) => {
                    debug!(deployment_hash = %self.deployment_hash, "Deployment pending");
                }
                Err(e) => {
                    warn!(
                        deployment_hash = %self.deployment_hash,
                        error = %e,
                        "Deployment check failed"
                    );
                    return DeploymentWait::Failed(self, e);
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => return DeploymentWait::Pending(self),
                _ = tokio::time::sleep(poll_interval) => {}
            }
        }
    }
}

/// A wallet with code on chain.
pub struct DeployedWallet {
    contract_address: Address,
    name: String,
    signer: PrivateKeySigner,
}

impl std::fmt::Debug for DeployedWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployedWallet")
            .field("contract_address", &self.contract_address)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl DeployedWallet {
    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_key(&self) -> Address {
        self.signer.address()
    }

    /// Fill in `from` and `gasData` and sign `message` with the wallet key.
    pub fn sign_message(&self, mut message: SignedMessage) -> RelayerResult<SignedMessage> {
        message.from = self.contract_address;
        message.gas_data = estimate_gas_data(&message);
        message.signature = sign_message(&message, &self.signer)?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::signing::{recover_signer, signer_from_private_key};
    use crate::testing::{sample_message, FakeLedger, TEST_PRIVATE_KEY};
    use crate::validation::ValidatorChain;
    use alloy::primitives::U256;
    use std::collections::HashSet;
    use std::sync::Arc;

    const WALLET: Address = Address::repeat_byte(0x77);
    const INTERVAL: Duration = Duration::from_millis(10);

    fn deploying() -> DeployingWallet {
        DeployingWallet::new(
            B256::repeat_byte(0xd1),
            WALLET,
            "alice.mylogin.eth".into(),
            signer_from_private_key(TEST_PRIVATE_KEY).unwrap(),
        )
    }

    fn deployed(wait: DeploymentWait) -> DeployedWallet {
        match wait {
            DeploymentWait::Deployed(wallet) => wallet,
            DeploymentWait::Pending(wallet) => panic!("still pending: {wallet:?}"),
            DeploymentWait::Failed(wallet, e) => panic!("{wallet:?} failed: {e}"),
        }
    }

    #[tokio::test]
    async fn check_reflects_contract_code() {
        let ledger = FakeLedger::default();
        let wallet = deploying();
        assert!(!wallet.check(&ledger).await.unwrap());
        ledger.deploy_contract(WALLET);
        assert!(wallet.check(&ledger).await.unwrap());
    }

    #[tokio::test]
    async fn waits_until_code_appears() {
        let ledger = Arc::new(FakeLedger::default());
        let wallet = deploying();
        let public_key = signer_from_private_key(TEST_PRIVATE_KEY).unwrap().address();

        let task = {
            let ledger = ledger.clone();
            tokio::spawn(async move {
                wallet
                    .wait_to_be_deployed(ledger.as_ref(), INTERVAL, CancellationToken::new())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        ledger.deploy_contract(WALLET);

        let deployed = deployed(task.await.unwrap());
        assert_eq!(deployed.contract_address(), WALLET);
        assert_eq!(deployed.name(), "alice.mylogin.eth");
        assert_eq!(deployed.public_key(), public_key);
    }

    #[tokio::test]
    async fn shutdown_hands_the_wallet_back() {
        let ledger = FakeLedger::default();
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let wallet = match deploying()
            .wait_to_be_deployed(&ledger, INTERVAL, shutdown)
            .await
        {
            DeploymentWait::Pending(wallet) => wallet,
            other => panic!("expected pending, got {}", variant(&other)),
        };
        assert_eq!(wallet.deployment_hash(), B256::repeat_byte(0xd1));

        ledger.deploy_contract(WALLET);
        let deployed = deployed(
            wallet
                .wait_to_be_deployed(&ledger, INTERVAL, CancellationToken::new())
                .await,
        );
        assert_eq!(deployed.contract_address(), WALLET);
    }

    #[tokio::test]
    async fn ledger_error_hands_the_wallet_back() {
        let ledger = FakeLedger::default();
        ledger.fail_with("node down");

        let wallet = match deploying()
            .wait_to_be_deployed(&ledger, INTERVAL, CancellationToken::new())
            .await
        {
            DeploymentWait::Failed(wallet, RelayerError::Ledger(msg)) => {
                assert_eq!(msg, "node down");
                wallet
            }
            other => panic!("expected ledger failure, got {}", variant(&other)),
        };

        ledger.recover();
        ledger.deploy_contract(WALLET);
        let deployed = deployed(
            wallet
                .wait_to_be_deployed(&ledger, INTERVAL, CancellationToken::new())
                .await,
        );
        assert_eq!(deployed.name(), "alice.mylogin.eth");
    }

    #[tokio::test]
    async fn zero_poll_interval_is_rejected_without_polling() {
        let ledger = FakeLedger::default();
        let wait = deploying()
            .wait_to_be_deployed(&ledger, Duration::ZERO, CancellationToken::new())
            .await;
        assert!(matches!(
            wait,
            DeploymentWait::Failed(_, RelayerError::InvalidCondition(_))
        ));
        assert_eq!(ledger.calls(), 0);
    }

    #[tokio::test]
    async fn deployed_wallet_signs_admissible_messages() {
        let ledger = Arc::new(FakeLedger::default());
        ledger.deploy_contract(WALLET);
        let wallet = deployed(
            deploying()
                .wait_to_be_deployed(ledger.as_ref(), INTERVAL, CancellationToken::new())
                .await,
        );
        ledger.add_key(WALLET, wallet.public_key());
        ledger.set_nonce(WALLET, U256::from(7u64));

        let mut unsigned = sample_message(Address::ZERO);
        unsigned.gas_data = U256::ZERO;
        let message = wallet.sign_message(unsigned).unwrap();

        assert_eq!(message.from, WALLET);
        assert_eq!(recover_signer(&message).unwrap(), wallet.public_key());
        ValidatorChain::standard(ledger, HashSet::new())
            .validate(&message)
            .await
            .unwrap();
    }

    fn variant(wait: &DeploymentWait) -> &'static str {
        match wait {
            DeploymentWait::Deployed(_) => "deployed",
            DeploymentWait::Pending(_) => "pending",
            DeploymentWait::Failed(..) => "failed",
        }
    }
}
