// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Persistence Contracts
//!
//! The relayer core only needs keyed get/put/delete over two record types,
//! plus per-key compare-and-set transitions for confirmation codes:
//!
//! - [`ConfirmationStore`]: one [`EmailConfirmation`] per `(email, intent)`
//! - [`EncryptedWalletStore`]: one [`StoredEncryptedWallet`] per `(email, ens_name)`
//!
//! [`RelayerDatabase`] implements both on redb. Every compare-and-set runs
//! inside a single write transaction, and redb serializes writers, so two
//! concurrent confirmations of the same code cannot both succeed.

pub mod database;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{
    ConfirmationIntent, ConfirmationStatus, EmailConfirmation, StoredEncryptedWallet,
};

pub use database::RelayerDatabase;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Outcome of a status transition attempt on a confirmation record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The record matched and moved to the target status.
    Applied(EmailConfirmation),
    /// No record, digest mismatch, wrong status or expired.
    Rejected,
}

/// Compare-and-set request for a confirmation record.
#[derive(Debug, Clone)]
pub struct TransitionRequest<'a> {
    pub email: &'a str,
    pub intent: ConfirmationIntent,
    pub code_digest: &'a str,
    pub from: ConfirmationStatus,
    pub to: ConfirmationStatus,
    /// Records created at or before this instant are expired.
    pub expired_before: DateTime<Utc>,
}

#[async_trait]
pub trait ConfirmationStore: Send + Sync {
    /// Insert a confirmation, replacing any record for the same `(email, intent)`.
    async fn put_confirmation(&self, confirmation: &EmailConfirmation) -> StorageResult<()>;

    async fn get_confirmation(
        &self,
        email: &str,
        intent: ConfirmationIntent,
    ) -> StorageResult<Option<EmailConfirmation>>;

    /// Atomically move a matching, unexpired record from `from` to `to`.
    async fn transition(&self, request: TransitionRequest<'_>) -> StorageResult<Transition>;

    async fn delete_confirmation(&self, email: &str, intent: ConfirmationIntent)
        -> StorageResult<bool>;

    /// Delete every confirmation created at or before `cutoff`. Returns the count.
    async fn purge_confirmations(&self, cutoff: DateTime<Utc>) -> StorageResult<usize>;
}

#[async_trait]
pub trait EncryptedWalletStore: Send + Sync {
    /// Store a backup, deleting any previous record for `(email, ens_name)`
    /// in the same transaction.
    async fn replace_wallet(&self, wallet: &StoredEncryptedWallet) -> StorageResult<()>;

    /// Apply `request` to its confirmation record and, only if it applies,
    /// replace the backup. Both writes commit together or not at all.
    async fn redeem_and_replace(
        &self,
        request: TransitionRequest<'_>,
        wallet: &StoredEncryptedWallet,
    ) -> StorageResult<Transition>;

    async fn get_wallet(&self, email: &str, ens_name: &str)
        -> StorageResult<Option<StoredEncryptedWallet>>;

    /// Most recently stored backup for an email, if any.
    async fn latest_wallet_for_email(&self, email: &str)
        -> StorageResult<Option<StoredEncryptedWallet>>;

    async fn delete_wallet(&self, email: &str, ens_name: &str) -> StorageResult<bool>;
}
