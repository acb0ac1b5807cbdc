// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use alloy::primitives::{keccak256, Address, Bytes, B256, U256};
use async_trait::async_trait;

use crate::blockchain::signing::{estimate_gas_data, SIGNATURE_LENGTH};
use crate::blockchain::{
    DeploymentRelay, DeploymentRequest, DeploymentSubmission, EnsArgs, Ledger, NameService,
};
use crate::error::{RelayerError, RelayerResult};
use crate::models::{OperationType, SignedMessage};
use crate::recovery::Mailer;

/// Well-known development key (first anvil account).
pub const TEST_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Unsigned `Call` message from `from` with a correct `gasData`.
pub fn sample_message(from: Address) -> SignedMessage {
    let mut message = SignedMessage {
        from,
        to: Address::repeat_byte(0xbb),
        value: U256::from(1_000u64),
        data: Bytes::from(vec![0xa9, 0x05, 0x9c, 0xbb, 0x00, 0x01]),
        nonce: U256::from(7u64),
        gas_price: U256::from(10u64),
        gas_token: Address::ZERO,
        gas_limit_execution: U256::from(100_000u64),
        gas_data: U256::ZERO,
        operation_type: OperationType::Call,
        signature: Bytes::from(vec![0u8; SIGNATURE_LENGTH]),
    };
    message.gas_data = estimate_gas_data(&message);
    message
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<(Address, Address), U256>,
    nonces: HashMap<Address, U256>,
    keys: HashSet<(Address, Address)>,
    contracts: HashSet<Address>,
    failure: Option<String>,
}

/// Scriptable ledger. Every query increments [`FakeLedger::calls`].
#[derive(Default)]
pub struct FakeLedger {
    state: Mutex<LedgerState>,
    calls: AtomicUsize,
}

impl FakeLedger {
    pub fn set_balance(&self, address: Address, token: Address, amount: U256) {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert((address, token), amount);
    }

    pub fn set_nonce(&self, wallet: Address, nonce: U256) {
        self.state.lock().unwrap().nonces.insert(wallet, nonce);
    }

    pub fn add_key(&self, wallet: Address, key: Address) {
        self.state.lock().unwrap().keys.insert((wallet, key));
    }

    pub fn deploy_contract(&self, address: Address) {
        self.state.lock().unwrap().contracts.insert(address);
    }

    /// Make every subsequent query fail.
    pub fn fail_with(&self, reason: &str) {
        self.state.lock().unwrap().failure = Some(reason.to_string());
    }

    pub fn recover(&self) {
        self.state.lock().unwrap().failure = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> RelayerResult<std::sync::MutexGuard<'_, LedgerState>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if let Some(reason) = state.failure.clone() {
            return Err(RelayerError::Ledger(reason));
        }
        Ok(state)
    }
}

#[async_trait]
impl Ledger for FakeLedger {
    async fn balance_of(&self, address: Address, token: Address) -> RelayerResult<U256> {
        let state = self.enter()?;
        Ok(state
            .balances
            .get(&(address, token))
            .copied()
            .unwrap_or_default())
    }

    async fn contract_exists_at(&self, address: Address) -> RelayerResult<bool> {
        Ok(self.enter()?.contracts.contains(&address))
    }

    async fn last_nonce(&self, wallet: Address) -> RelayerResult<U256> {
        Ok(self
            .enter()?
            .nonces
            .get(&wallet)
            .copied()
            .unwrap_or_default())
    }

    async fn key_exists(&self, wallet: Address, key: Address) -> RelayerResult<bool> {
        Ok(self.enter()?.keys.contains(&(wallet, key)))
    }
}

/// Name service answering for any name with fixed contract addresses.
#[derive(Default)]
pub struct FakeNameService {
    calls: AtomicUsize,
}

impl FakeNameService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NameService for FakeNameService {
    async fn args_for(&self, ens_name: &str) -> RelayerResult<EnsArgs> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let label = ens_name.split('.').next().unwrap_or_default().to_string();
        Ok(EnsArgs {
            hash_label: keccak256(label.as_bytes()),
            label,
            node: keccak256(ens_name.as_bytes()),
            ens_address: Address::repeat_byte(0xe0),
            registrar_address: Address::repeat_byte(0xe1),
            resolver_address: Address::repeat_byte(0xe2),
        })
    }
}

/// Relay that records submitted requests and answers with a fixed hash.
#[derive(Default)]
pub struct FakeRelay {
    requests: Mutex<Vec<DeploymentRequest>>,
}

impl FakeRelay {
    pub const DEPLOYMENT_HASH: B256 = B256::repeat_byte(0xd1);

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<DeploymentRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl DeploymentRelay for FakeRelay {
    async fn submit_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> RelayerResult<DeploymentSubmission> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(DeploymentSubmission {
            deployment_hash: Self::DEPLOYMENT_HASH,
        })
    }
}

/// Mailer keeping the last code sent to each address.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<HashMap<String, String>>,
}

impl RecordingMailer {
    pub fn last_code(&self, email: &str) -> Option<String> {
        self.sent.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_confirmation(&self, email: &str, code: &str) -> RelayerResult<()> {
        self.sent
            .lock()
            .unwrap()
            .insert(email.to_string(), code.to_string());
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send_confirmation(&self, _email: &str, _code: &str) -> RelayerResult<()> {
        Err(RelayerError::Mail("mail API unavailable".into()))
    }
}

/// Application state over a temporary database, a recording mailer and a
/// fake ledger.
pub fn test_state() -> (
    crate::state::AppState,
    std::sync::Arc<RecordingMailer>,
    tempfile::TempDir,
) {
    use std::sync::Arc;

    use crate::recovery::{CodeIssuer, RecoveryWorkflow, DEFAULT_CODE_TTL_SECS};
    use crate::storage::RelayerDatabase;
    use crate::validation::ValidatorChain;

    let dir = tempfile::tempdir().unwrap();
    let db = Arc::new(RelayerDatabase::open(&dir.path().join("relayer.redb")).unwrap());
    let mailer = Arc::new(RecordingMailer::default());
    let recovery = RecoveryWorkflow::new(
        db.clone(),
        db,
        mailer.clone(),
        CodeIssuer::new(b"test-secret".to_vec()),
        chrono::Duration::seconds(DEFAULT_CODE_TTL_SECS),
    );
    let validators = ValidatorChain::standard(Arc::new(FakeLedger::default()), HashSet::new());
    let state = crate::state::AppState::new(recovery, validators)
        .with_data_dir(dir.path().to_path_buf());
    (state, mailer, dir)
}
