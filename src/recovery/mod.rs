// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Email-Confirmed Wallet Recovery
//!
//! Encrypted wallet backups are gated behind proof of email ownership.
//! Each code is scoped to an intent and walks through three states:
//!
//! ```text
//! request_creating / request_restore      confirm          store_wallet / restore_wallet
//!            ──────────────────────▶ Pending ─────▶ Confirmed ─────────────────────▶ Redeemed
//! ```
//!
//! Confirmation and the privileged action are separate calls, so a code
//! issued for restoring can never be used to overwrite a backup and vice
//! versa. Every transition is a compare-and-set in the [`ConfirmationStore`].

pub mod codes;
pub mod mailer;
pub mod sweeper;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::blockchain::ens::is_valid_ens_name;
use crate::ensure;
use crate::error::{RelayerError, RelayerResult};
use crate::models::{
    ConfirmationIntent, ConfirmationStatus, EmailConfirmation, StoredEncryptedWallet,
};
use crate::storage::{ConfirmationStore, EncryptedWalletStore, Transition, TransitionRequest};

pub use codes::{mask_email, normalize_email, CodeIssuer};
pub use mailer::{HttpMailer, LogMailer, Mailer};
pub use sweeper::ConfirmationSweeper;

/// Default lifetime of a confirmation code, in seconds.
pub const DEFAULT_CODE_TTL_SECS: i64 = 3600;

pub struct RecoveryWorkflow {
    confirmations: Arc<dyn ConfirmationStore>,
    wallets: Arc<dyn EncryptedWalletStore>,
    mailer: Arc<dyn Mailer>,
    codes: CodeIssuer,
    code_ttl: chrono::Duration,
}

impl RecoveryWorkflow {
    pub fn new(
        confirmations: Arc<dyn ConfirmationStore>,
        wallets: Arc<dyn EncryptedWalletStore>,
        mailer: Arc<dyn Mailer>,
        codes: CodeIssuer,
        code_ttl: chrono::Duration,
    ) -> Self {
        Self {
            confirmations,
            wallets,
            mailer,
            codes,
            code_ttl,
        }
    }

    /// Send a code that authorizes storing a backup for `ens_name`.
    ///
    /// Returns the normalized email.
    pub async fn request_creating(&self, email: &str, ens_name: &str) -> RelayerResult<String> {
        let email = normalize_email(email)?;
        ensure!(
            is_valid_ens_name(ens_name),
            RelayerError::InvalidAddressOrEnsName(ens_name.to_string())
        );

        self.issue(&email, ConfirmationIntent::Creating, Some(ens_name.to_string()))
            .await?;
        Ok(email)
    }

    /// Send a code that authorizes reading the backup stored for `email`.
    pub async fn request_restore(&self, email: &str) -> RelayerResult<String> {
        let email = normalize_email(email)?;
        if self.wallets.latest_wallet_for_email(&email).await?.is_none() {
            return Err(RelayerError::NotFound(format!(
                "Encrypted wallet for {}",
                mask_email(&email)
            )));
        }

        self.issue(&email, ConfirmationIntent::Restoring, None).await?;
        Ok(email)
    }

    /// Store a fresh code for `(email, intent)`, replacing any outstanding
    /// one, and mail it.
    async fn issue(
        &self,
        email: &str,
        intent: ConfirmationIntent,
        ens_name: Option<String>,
    ) -> RelayerResult<()> {
        let code = self.codes.generate()?;
        let confirmation = EmailConfirmation {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            intent,
            ens_name,
            code_digest: self.codes.digest(email, intent, &code)?,
            created_at: Utc::now(),
            status: ConfirmationStatus::Pending,
        };
        self.confirmations.put_confirmation(&confirmation).await?;

        if let Err(e) = self.mailer.send_confirmation(email, &code).await {
            warn!(
                email = %mask_email(email),
                intent = intent.as_str(),
                error = %e,
                "Confirmation mail failed, discarding code"
            );
            self.confirmations.delete_confirmation(email, intent).await?;
            return Err(e);
        }

        info!(
            email = %mask_email(email),
            intent = intent.as_str(),
            confirmation_id = %confirmation.id,
            "Email confirmation requested"
        );
        Ok(())
    }

    /// Redeem a code sent to `email`, whichever intent it was issued for.
    ///
    /// Fails with [`RelayerError::InvalidCode`] when there is no matching
    /// pending code, it was already used, or it expired.
    pub async fn confirm(&self, email: &str, code: &str) -> RelayerResult<ConfirmationIntent> {
        let email = normalize_email(email)?;
        let expired_before = self.expired_before();

        for intent in ConfirmationIntent::ALL {
            let digest = self.codes.digest(&email, intent, code)?;
            let outcome = self
                .confirmations
                .transition(TransitionRequest {
                    email: &email,
                    intent,
                    code_digest: &digest,
                    from: ConfirmationStatus::Pending,
                    to: ConfirmationStatus::Confirmed,
                    expired_before,
                })
                .await?;

            if let Transition::Applied(confirmation) = outcome {
                info!(
                    email = %mask_email(&email),
                    intent = intent.as_str(),
                    confirmation_id = %confirmation.id,
                    "Email confirmed"
                );
                return Ok(intent);
            }
        }

        debug!(email = %mask_email(&email), "Email confirmation rejected");
        Err(RelayerError::InvalidCode)
    }

    /// Persist an encrypted backup using a confirmed creating code.
    ///
    /// The code must have been requested for the same `(email, ens_name)`.
    /// Any previous backup for that pair is replaced. The code is spent only
    /// if the backup is written.
    pub async fn store_wallet(
        &self,
        mut wallet: StoredEncryptedWallet,
        code: &str,
    ) -> RelayerResult<()> {
        wallet.email = normalize_email(&wallet.email)?;
        ensure!(
            is_valid_ens_name(&wallet.ens_name),
            RelayerError::InvalidAddressOrEnsName(wallet.ens_name.clone())
        );

        let requested_for = self
            .confirmations
            .get_confirmation(&wallet.email, ConfirmationIntent::Creating)
            .await?
            .and_then(|confirmation| confirmation.ens_name);
        ensure!(
            requested_for.as_deref() == Some(wallet.ens_name.as_str()),
            RelayerError::InvalidCode
        );

        let digest = self
            .codes
            .digest(&wallet.email, ConfirmationIntent::Creating, code)?;
        let request = TransitionRequest {
            email: &wallet.email,
            intent: ConfirmationIntent::Creating,
            code_digest: &digest,
            from: ConfirmationStatus::Confirmed,
            to: ConfirmationStatus::Redeemed,
            expired_before: self.expired_before(),
        };
        match self.wallets.redeem_and_replace(request, &wallet).await? {
            Transition::Applied(_) => {}
            Transition::Rejected => return Err(RelayerError::InvalidCode),
        }

        info!(
            email = %mask_email(&wallet.email),
            ens_name = %wallet.ens_name,
            contract_address = %wallet.contract_address,
            "Encrypted wallet stored"
        );
        Ok(())
    }

    /// Return the stored backup for `email` using a confirmed restore code.
    ///
    /// The ciphertext is returned untouched.
    pub async fn restore_wallet(
        &self,
        email: &str,
        code: &str,
    ) -> RelayerResult<StoredEncryptedWallet> {
        let email = normalize_email(email)?;
        self.redeem(&email, ConfirmationIntent::Restoring, code)
            .await?;

        let wallet = self
            .wallets
            .latest_wallet_for_email(&email)
            .await?
            .ok_or_else(|| {
                RelayerError::NotFound(format!("Encrypted wallet for {}", mask_email(&email)))
            })?;

        info!(
            email = %mask_email(&email),
            ens_name = %wallet.ens_name,
            "Encrypted wallet restored"
        );
        Ok(wallet)
    }

    async fn redeem(
        &self,
        email: &str,
        intent: ConfirmationIntent,
        code: &str,
    ) -> RelayerResult<EmailConfirmation> {
        let digest = self.codes.digest(email, intent, code)?;
        let outcome = self
            .confirmations
            .transition(TransitionRequest {
                email,
                intent,
                code_digest: &digest,
                from: ConfirmationStatus::Confirmed,
                to: ConfirmationStatus::Redeemed,
                expired_before: self.expired_before(),
            })
            .await?;

        match outcome {
            Transition::Applied(confirmation) => Ok(confirmation),
            Transition::Rejected => Err(RelayerError::InvalidCode),
        }
    }

    fn expired_before(&self) -> DateTime<Utc> {
        Utc::now() - self.code_ttl
    }
}
