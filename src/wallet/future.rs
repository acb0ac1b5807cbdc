// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Counterfactual wallet awaiting funding and deployment.

use std::sync::Arc;
use std::time::Duration;

use alloy::{
    primitives::{Address, U256},
    signers::local::PrivateKeySigner,
    sol_types::SolCall,
};
use tokio::sync::oneshot;
use tracing::info;

use super::deploying::DeployingWallet;
use super::observer::{BalanceObserver, DEFAULT_POLL_INTERVAL};
use crate::blockchain::contracts::initializeWithENSCall;
use crate::blockchain::signing::initialize_signature;
use crate::blockchain::{
    is_valid_ens_name, DeploymentRelay, DeploymentRequest, Ledger, NameService,
};
use crate::ensure;
use crate::error::{RelayerError, RelayerResult};
use crate::models::{ApplicationInfo, BalanceDetails, SupportedToken};

/// Gas units the deployer is refunded for; the wallet must hold
/// `gas_price * DEFAULT_DEPLOYMENT_REFUND` of the gas token to be deployed.
pub const DEFAULT_DEPLOYMENT_REFUND: u64 = 1_000_000;

/// Collaborators shared by every wallet of a relayer.
#[derive(Clone)]
pub struct WalletServices {
    pub ledger: Arc<dyn Ledger>,
    pub name_service: Arc<dyn NameService>,
    pub relay: Arc<dyn DeploymentRelay>,
    pub deployment_refund: U256,
    pub poll_interval: Duration,
    pub application_info: ApplicationInfo,
}

impl WalletServices {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        name_service: Arc<dyn NameService>,
        relay: Arc<dyn DeploymentRelay>,
    ) -> Self {
        Self {
            ledger,
            name_service,
            relay,
            deployment_refund: U256::from(DEFAULT_DEPLOYMENT_REFUND),
            poll_interval: DEFAULT_POLL_INTERVAL,
            application_info: ApplicationInfo::default(),
        }
    }
}

/// A wallet whose address is known but whose contract does not exist yet.
///
/// The public key is always derived from the private key. [`deploy`]
/// consumes the wallet, so a deployment cannot be submitted twice.
///
/// [`deploy`]: FutureWallet::deploy
pub struct FutureWallet {
    contract_address: Address,
    signer: PrivateKeySigner,
    ens_name: String,
    gas_price: U256,
    gas_token: Address,
    observer: BalanceObserver,
    services: WalletServices,
}

impl std::fmt::Debug for FutureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FutureWallet")
            .field("contract_address", &self.contract_address)
            .field("public_key", &self.signer.address())
            .field("ens_name", &self.ens_name)
            .field("gas_price", &self.gas_price)
            .field("gas_token", &self.gas_token)
            .finish_non_exhaustive()
    }
}

impl FutureWallet {
    pub fn new(
        contract_address: Address,
        signer: PrivateKeySigner,
        ens_name: impl Into<String>,
        gas_price: U256,
        gas_token: Address,
        services: WalletServices,
    ) -> RelayerResult<Self> {
        let minimal_amount = gas_price
            .checked_mul(services.deployment_refund)
            .ok_or_else(|| {
                RelayerError::InvalidCondition(format!(
                    "gas price {gas_price} overflows the deployment refund"
                ))
            })?;
        let observer = BalanceObserver::new(
            vec![SupportedToken {
                address: gas_token,
                minimal_amount,
            }],
            services.ledger.clone(),
            services.poll_interval,
        )?;

        Ok(Self {
            contract_address,
            signer,
            ens_name: ens_name.into(),
            gas_price,
            gas_token,
            observer,
            services,
        })
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn public_key(&self) -> Address {
        self.signer.address()
    }

    pub fn ens_name(&self) -> &str {
        &self.ens_name
    }

    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    pub fn gas_token(&self) -> Address {
        self.gas_token
    }

    /// Amount of the gas token that unlocks deployment.
    pub fn minimal_amount(&self) -> U256 {
        self.gas_price * self.services.deployment_refund
    }

    /// Wait until the wallet address is funded.
    ///
    /// Returns `None` if the wait was cancelled with [`FutureWallet::cancel`].
    /// After a cancel or a ledger error the wait can be started again.
    pub async fn wait_for_balance(&self) -> RelayerResult<Option<BalanceDetails>> {
        let (tx, rx) = oneshot::channel();
        let handle = self
            .observer
            .start_and_subscribe(self.contract_address, move |details| {
                let _ = tx.send(details);
            })?;

        if let Ok(details) = rx.await {
            return Ok(Some(details));
        }

        // The sender is dropped without firing when the task ends early.
        match handle.await {
            Ok(Ok(())) => Ok(None),
            Ok(Err(e)) => Err(e),
            Err(e) => Err(RelayerError::Ledger(format!(
                "balance observer task failed: {e}"
            ))),
        }
    }

    /// Swap the token the wallet is expected to be funded with.
    pub fn set_supported_token(&self, token: SupportedToken) -> RelayerResult<()> {
        self.observer.set_supported_token(token)
    }

    pub fn cancel(&self) {
        self.observer.cancel();
    }

    /// Sign the ENS initializer and submit the deployment.
    pub async fn deploy(self) -> RelayerResult<DeployingWallet> {
        ensure!(
            is_valid_ens_name(&self.ens_name),
            RelayerError::InvalidAddressOrEnsName(self.ens_name.clone())
        );

        let public_key = self.signer.address();
        let args = self.services.name_service.args_for(&self.ens_name).await?;
        let init_data = initializeWithENSCall {
            key: public_key,
            hashLabel: args.hash_label,
            name: args.label,
            node: args.node,
            ens: args.ens_address,
            registrar: args.registrar_address,
            resolver: args.resolver_address,
            gasPrice: self.gas_price,
            gasToken: self.gas_token,
        }
        .abi_encode();
        let signature = initialize_signature(&init_data, &self.signer)?;

        let request = DeploymentRequest {
            public_key,
            ens_name: self.ens_name.clone(),
            gas_price: self.gas_price,
            gas_token: self.gas_token,
            signature,
            application_info: self.services.application_info.clone(),
        };
        let submission = self.services.relay.submit_deployment(&request).await?;

        info!(
            contract_address = %self.contract_address,
            ens_name = %self.ens_name,
            deployment_hash = %submission.deployment_hash,
            "Wallet deployment started"
        );

        Ok(DeployingWallet::new(
            submission.deployment_hash,
            self.contract_address,
            self.ens_name,
            self.signer,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::signing::signer_from_private_key;
    use crate::testing::{FakeLedger, FakeNameService, FakeRelay, TEST_PRIVATE_KEY};
    use alloy::primitives::keccak256;
    use alloy::primitives::Signature;

    const WALLET: Address = Address::repeat_byte(0x77);
    const GAS_TOKEN: Address = Address::repeat_byte(0x0e);

    struct Fakes {
        ledger: Arc<FakeLedger>,
        names: Arc<FakeNameService>,
        relay: Arc<FakeRelay>,
    }

    fn future_wallet(ens_name: &str) -> (FutureWallet, Fakes) {
        let fakes = Fakes {
            ledger: Arc::new(FakeLedger::default()),
            names: Arc::new(FakeNameService::default()),
            relay: Arc::new(FakeRelay::default()),
        };
        let mut services =
            WalletServices::new(fakes.ledger.clone(), fakes.names.clone(), fakes.relay.clone());
        services.poll_interval = Duration::from_millis(10);
        services.application_info = ApplicationInfo {
            kind: "laptop".into(),
            application_name: Some("Jarvis".into()),
        };

        let wallet = FutureWallet::new(
            WALLET,
            signer_from_private_key(TEST_PRIVATE_KEY).unwrap(),
            ens_name,
            U256::from(2),
            GAS_TOKEN,
            services,
        )
        .unwrap();
        (wallet, fakes)
    }

    #[test]
    fn public_key_is_derived_from_private_key() {
        let (wallet, _) = future_wallet("alice.mylogin.eth");
        let signer = signer_from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(wallet.public_key(), signer.address());
        assert_eq!(wallet.minimal_amount(), U256::from(2_000_000u64));
    }

    #[tokio::test]
    async fn invalid_name_fails_without_contacting_collaborators() {
        let (wallet, fakes) = future_wallet("Not A Name");
        let err = wallet.deploy().await.unwrap_err();

        assert!(matches!(err, RelayerError::InvalidAddressOrEnsName(name) if name == "Not A Name"));
        assert_eq!(fakes.names.calls(), 0);
        assert_eq!(fakes.relay.calls(), 0);
        assert_eq!(fakes.ledger.calls(), 0);
    }

    #[tokio::test]
    async fn deploy_submits_signed_initializer() {
        let (wallet, fakes) = future_wallet("alice.mylogin.eth");
        let public_key = wallet.public_key();

        let deploying = wallet.deploy().await.unwrap();
        assert_eq!(deploying.deployment_hash(), FakeRelay::DEPLOYMENT_HASH);
        assert_eq!(deploying.contract_address(), WALLET);
        assert_eq!(deploying.name(), "alice.mylogin.eth");

        let request = fakes.relay.last_request().unwrap();
        assert_eq!(request.public_key, public_key);
        assert_eq!(request.gas_token, GAS_TOKEN);
        assert_eq!(request.application_info.kind, "laptop");
        assert_eq!(fakes.names.calls(), 1);

        let args = fakes.names.args_for("alice.mylogin.eth").await.unwrap();
        let init_data = initializeWithENSCall {
            key: public_key,
            hashLabel: args.hash_label,
            name: args.label,
            node: args.node,
            ens: args.ens_address,
            registrar: args.registrar_address,
            resolver: args.resolver_address,
            gasPrice: U256::from(2),
            gasToken: GAS_TOKEN,
        }
        .abi_encode();
        let signature = Signature::from_raw(&request.signature).unwrap();
        let recovered = signature
            .recover_address_from_msg(keccak256(&init_data).as_slice())
            .unwrap();
        assert_eq!(recovered, public_key);
    }

    #[tokio::test]
    async fn wait_for_balance_resolves_with_gas_token() {
        let (wallet, fakes) = future_wallet("alice.mylogin.eth");
        fakes
            .ledger
            .set_balance(WALLET, GAS_TOKEN, U256::from(2_000_000u64));

        let details = wallet.wait_for_balance().await.unwrap().unwrap();
        assert_eq!(
            details,
            BalanceDetails {
                token_address: GAS_TOKEN,
                contract_address: WALLET
            }
        );
    }

    #[tokio::test]
    async fn wait_for_balance_returns_none_on_cancel() {
        let (wallet, _fakes) = future_wallet("alice.mylogin.eth");
        let wallet = Arc::new(wallet);

        let waiter = {
            let wallet = wallet.clone();
            tokio::spawn(async move { wallet.wait_for_balance().await })
        };
        tokio::time::sleep(Duration::from_millis(30)).await;
        wallet.cancel();

        assert_eq!(waiter.await.unwrap().unwrap(), None);
    }

    #[tokio::test]
    async fn swapped_token_funds_deployment() {
        let (wallet, fakes) = future_wallet("alice.mylogin.eth");
        let other = Address::repeat_byte(0x0f);
        fakes.ledger.set_balance(WALLET, other, U256::from(5));
        wallet
            .set_supported_token(SupportedToken {
                address: other,
                minimal_amount: U256::from(5),
            })
            .unwrap();

        let details = wallet.wait_for_balance().await.unwrap().unwrap();
        assert_eq!(details.token_address, other);
    }

    #[tokio::test]
    async fn ledger_failure_surfaces_from_wait() {
        let (wallet, fakes) = future_wallet("alice.mylogin.eth");
        fakes.ledger.fail_with("node down");

        let err = wallet.wait_for_balance().await.unwrap_err();
        assert!(matches!(err, RelayerError::Ledger(_)));
    }

    #[tokio::test]
    async fn wait_for_balance_can_be_retried_after_ledger_failure() {
        let (wallet, fakes) = future_wallet("alice.mylogin.eth");
        fakes.ledger.fail_with("transient");
        assert!(matches!(
            wallet.wait_for_balance().await,
            Err(RelayerError::Ledger(msg)) if msg == "transient"
        ));

        fakes.ledger.recover();
        fakes
            .ledger
            .set_balance(WALLET, GAS_TOKEN, U256::from(2_000_000u64));
        let details = wallet.wait_for_balance().await.unwrap().unwrap();
        assert_eq!(details.token_address, GAS_TOKEN);

        let deploying = wallet.deploy().await.unwrap();
        assert_eq!(deploying.contract_address(), WALLET);
    }
}
