// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Confirmation Sweeper
//!
//! Background task that deletes email confirmations older than the code
//! lifetime. Expired codes are already rejected at confirm time; the sweep
//! only keeps the table from growing.
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::storage::ConfirmationStore;

/// Default interval between sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

pub struct ConfirmationSweeper {
    store: Arc<dyn ConfirmationStore>,
    code_ttl: chrono::Duration,
    interval: Duration,
}

impl ConfirmationSweeper {
    pub fn new(store: Arc<dyn ConfirmationStore>, code_ttl: chrono::Duration) -> Self {
        Self {
            store,
            code_ttl,
            interval: DEFAULT_SWEEP_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Run until the cancellation token is triggered.
    ///
    /// ```rust,ignore
    /// tokio::spawn(sweeper.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Confirmation sweeper starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Confirmation sweeper shutting down");
                return;
            }

            self.sweep_step().await;

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Confirmation sweeper shutting down");
                    return;
                }
            }
        }
    }

    /// Delete every expired confirmation once. Returns how many were removed.
    pub async fn sweep_step(&self) -> usize {
        let cutoff = Utc::now() - self.code_ttl;
        match self.store.purge_confirmations(cutoff).await {
            Ok(0) => 0,
            Ok(purged) => {
                debug!(purged, "Purged expired email confirmations");
                purged
            }
            Err(e) => {
                warn!(error = %e, "Confirmation sweep failed, will retry");
                0
            }
        }
    }
}
