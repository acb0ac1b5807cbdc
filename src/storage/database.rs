// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded relayer database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `email_confirmations`: `intent|email` → serialized EmailConfirmation
//! - `encrypted_wallets`: `email|ens_name` → serialized WalletRecord

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redb::{Database, ReadableDatabase, ReadableTable, Table, TableDefinition};
use serde::{Deserialize, Serialize};

use super::{
    ConfirmationStore, EncryptedWalletStore, StorageResult, Transition, TransitionRequest,
};
use crate::models::{ConfirmationIntent, EmailConfirmation, StoredEncryptedWallet};

// =============================================================================
// Table Definitions
// =============================================================================

const EMAIL_CONFIRMATIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("email_confirmations");

const ENCRYPTED_WALLETS: TableDefinition<&str, &[u8]> = TableDefinition::new("encrypted_wallets");

/// Persisted backup plus the time it was stored, used to pick the latest
/// backup when restoring by email alone.
#[derive(Debug, Serialize, Deserialize)]
struct WalletRecord {
    wallet: StoredEncryptedWallet,
    stored_at: DateTime<Utc>,
}

// =============================================================================
// Key Helpers
// =============================================================================

fn confirmation_key(email: &str, intent: ConfirmationIntent) -> String {
    format!("{}|{}", intent.as_str(), email)
}

fn wallet_key(email: &str, ens_name: &str) -> String {
    format!("{email}|{ens_name}")
}

/// Range bounds covering every wallet key of one email.
///
/// `}` is the byte after `|`, so `email|` ..`email}` spans exactly the prefix.
fn wallet_prefix_range(email: &str) -> (String, String) {
    (format!("{email}|"), format!("{email}}}"))
}

/// Compare-and-set on one confirmation record inside the caller's write
/// transaction. Nothing is written on rejection.
fn apply_transition(
    table: &mut Table<'_, &'static str, &'static [u8]>,
    request: &TransitionRequest<'_>,
) -> StorageResult<Transition> {
    let key = confirmation_key(request.email, request.intent);

    // Read and deserialize before mutating
    let existing = table.get(key.as_str())?.map(|value| value.value().to_vec());
    let Some(bytes) = existing else {
        return Ok(Transition::Rejected);
    };

    let mut confirmation: EmailConfirmation = serde_json::from_slice(&bytes)?;
    let matches = confirmation.code_digest == request.code_digest
        && confirmation.status == request.from
        && confirmation.created_at > request.expired_before;
    if !matches {
        return Ok(Transition::Rejected);
    }

    confirmation.status = request.to;
    let json = serde_json::to_vec(&confirmation)?;
    table.insert(key.as_str(), json.as_slice())?;
    Ok(Transition::Applied(confirmation))
}

fn wallet_record(wallet: &StoredEncryptedWallet) -> StorageResult<Vec<u8>> {
    let record = WalletRecord {
        wallet: wallet.clone(),
        stored_at: Utc::now(),
    };
    Ok(serde_json::to_vec(&record)?)
}

// =============================================================================
// RelayerDatabase
// =============================================================================

pub struct RelayerDatabase {
    db: Database,
}

impl RelayerDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(EMAIL_CONFIRMATIONS)?;
            let _ = write_txn.open_table(ENCRYPTED_WALLETS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn read_confirmation(
        &self,
        email: &str,
        intent: ConfirmationIntent,
    ) -> StorageResult<Option<EmailConfirmation>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EMAIL_CONFIRMATIONS)?;
        match table.get(confirmation_key(email, intent).as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ConfirmationStore for RelayerDatabase {
    async fn put_confirmation(&self, confirmation: &EmailConfirmation) -> StorageResult<()> {
        let json = serde_json::to_vec(confirmation)?;
        let key = confirmation_key(&confirmation.email, confirmation.intent);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(EMAIL_CONFIRMATIONS)?;
            table.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    async fn get_confirmation(
        &self,
        email: &str,
        intent: ConfirmationIntent,
    ) -> StorageResult<Option<EmailConfirmation>> {
        self.read_confirmation(email, intent)
    }

    async fn transition(&self, request: TransitionRequest<'_>) -> StorageResult<Transition> {
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut table = write_txn.open_table(EMAIL_CONFIRMATIONS)?;
            apply_transition(&mut table, &request)?
        };

        match outcome {
            Transition::Applied(_) => write_txn.commit()?,
            Transition::Rejected => write_txn.abort()?,
        }
        Ok(outcome)
    }

    async fn delete_confirmation(
        &self,
        email: &str,
        intent: ConfirmationIntent,
    ) -> StorageResult<bool> {
        let key = confirmation_key(email, intent);
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(EMAIL_CONFIRMATIONS)?;
            let removed = table.remove(key.as_str())?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    async fn purge_confirmations(&self, cutoff: DateTime<Utc>) -> StorageResult<usize> {
        let write_txn = self.db.begin_write()?;
        let purged = {
            let mut table = write_txn.open_table(EMAIL_CONFIRMATIONS)?;

            let mut stale = Vec::new();
            for entry in table.iter()? {
                let (key, value) = entry?;
                let confirmation: EmailConfirmation = serde_json::from_slice(value.value())?;
                if confirmation.created_at <= cutoff {
                    stale.push(key.value().to_string());
                }
            }

            for key in &stale {
                table.remove(key.as_str())?;
            }
            stale.len()
        };
        write_txn.commit()?;
        Ok(purged)
    }
}

#[async_trait]
impl EncryptedWalletStore for RelayerDatabase {
    async fn replace_wallet(&self, wallet: &StoredEncryptedWallet) -> StorageResult<()> {
        let json = wallet_record(wallet)?;
        let key = wallet_key(&wallet.email, &wallet.ens_name);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(ENCRYPTED_WALLETS)?;
            table.remove(key.as_str())?;
            table.insert(key.as_str(), json.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    async fn redeem_and_replace(
        &self,
        request: TransitionRequest<'_>,
        wallet: &StoredEncryptedWallet,
    ) -> StorageResult<Transition> {
        let json = wallet_record(wallet)?;
        let key = wallet_key(&wallet.email, &wallet.ens_name);

        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut confirmations = write_txn.open_table(EMAIL_CONFIRMATIONS)?;
            let outcome = apply_transition(&mut confirmations, &request)?;
            if let Transition::Applied(_) = outcome {
                let mut wallets = write_txn.open_table(ENCRYPTED_WALLETS)?;
                wallets.remove(key.as_str())?;
                wallets.insert(key.as_str(), json.as_slice())?;
            }
            outcome
        };

        match outcome {
            Transition::Applied(_) => write_txn.commit()?,
            Transition::Rejected => write_txn.abort()?,
        }
        Ok(outcome)
    }

    async fn get_wallet(
        &self,
        email: &str,
        ens_name: &str,
    ) -> StorageResult<Option<StoredEncryptedWallet>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENCRYPTED_WALLETS)?;
        match table.get(wallet_key(email, ens_name).as_str())? {
            Some(value) => {
                let record: WalletRecord = serde_json::from_slice(value.value())?;
                Ok(Some(record.wallet))
            }
            None => Ok(None),
        }
    }

    async fn latest_wallet_for_email(
        &self,
        email: &str,
    ) -> StorageResult<Option<StoredEncryptedWallet>> {
        let (start, end) = wallet_prefix_range(email);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ENCRYPTED_WALLETS)?;

        let mut latest: Option<WalletRecord> = None;
        for entry in table.range(start.as_str()..end.as_str())? {
            let (_, value) = entry?;
            let record: WalletRecord = serde_json::from_slice(value.value())?;
            let newer = latest
                .as_ref()
                .map_or(true, |current| record.stored_at >= current.stored_at);
            if newer {
                latest = Some(record);
            }
        }

        Ok(latest.map(|record| record.wallet))
    }

    async fn delete_wallet(&self, email: &str, ens_name: &str) -> StorageResult<bool> {
        let key = wallet_key(email, ens_name);
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(ENCRYPTED_WALLETS)?;
            let removed = table.remove(key.as_str())?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

// =============================================================================
// Tests
// =============================================================================
