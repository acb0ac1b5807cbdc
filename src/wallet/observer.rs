// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Balance observer gating wallet deployment.
//!
//! Polls the balances of a counterfactual address until one of the
//! supported tokens reaches its minimal amount, then fires once.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use alloy::primitives::Address;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::Ledger;
use crate::ensure;
use crate::error::{RelayerError, RelayerResult};
use crate::models::{BalanceDetails, SupportedToken};

/// Default delay between two polling rounds.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

struct ObserverState {
    tokens: Vec<SupportedToken>,
    resolved: bool,
    /// Token of the running poll, `None` while idle.
    running: Option<CancellationToken>,
}

/// Resolve-once balance watcher.
///
/// A poll that ends without resolving (cancelled or failed) leaves the
/// observer idle, so it can be started again.
pub struct BalanceObserver {
    state: Arc<Mutex<ObserverState>>,
    ledger: Arc<dyn Ledger>,
    poll_interval: Duration,
    shutdown: CancellationToken,
}

fn validate_tokens(tokens: &[SupportedToken]) -> RelayerResult<()> {
    ensure!(
        !tokens.is_empty(),
        RelayerError::InvalidCondition("at least one supported token is required".into())
    );
    for token in tokens {
        ensure!(
            !token.minimal_amount.is_zero(),
            RelayerError::InvalidCondition(format!(
                "minimal amount for {} must be greater than zero",
                token.address
            ))
        );
    }
    Ok(())
}

impl BalanceObserver {
    pub fn new(
        tokens: Vec<SupportedToken>,
        ledger: Arc<dyn Ledger>,
        poll_interval: Duration,
    ) -> RelayerResult<Self> {
        validate_tokens(&tokens)?;
        ensure!(
            !poll_interval.is_zero(),
            RelayerError::InvalidCondition("poll interval must be greater than zero".into())
        );
        Ok(Self {
            state: Arc::new(Mutex::new(ObserverState {
                tokens,
                resolved: false,
                running: None,
            })),
            ledger,
            poll_interval,
            shutdown: CancellationToken::new(),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ObserverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `token` the only candidate. Tokens dropped here can no longer
    /// win, even if their balance query is already in flight.
    pub fn set_supported_token(&self, token: SupportedToken) -> RelayerResult<()> {
        let tokens = vec![token];
        validate_tokens(&tokens)?;
        let mut state = self.lock();
        ensure!(!state.resolved, RelayerError::ObserverResolved);
        state.tokens = tokens;
        Ok(())
    }

    pub fn is_resolved(&self) -> bool {
        self.lock().resolved
    }

    /// Stop the running poll without firing. No-op while idle.
    pub fn cancel(&self) {
        if let Some(running) = &self.lock().running {
            running.cancel();
        }
    }

    /// Start polling `address`. `on_ready` runs at most once, with the first
    /// funded token in configuration order.
    ///
    /// The returned task ends with `Ok` on resolution or cancellation and
    /// with the ledger error if a balance query fails. Once it has ended
    /// without resolving, the observer may be started again.
    pub fn start_and_subscribe<F>(
        &self,
        address: Address,
        on_ready: F,
    ) -> RelayerResult<JoinHandle<RelayerResult<()>>>
    where
        F: FnOnce(BalanceDetails) + Send + 'static,
    {
        let cancel = {
            let mut state = self.lock();
            ensure!(!state.resolved, RelayerError::ObserverResolved);
            ensure!(state.running.is_none(), RelayerError::ObserverStarted);
            let cancel = self.shutdown.child_token();
            state.running = Some(cancel.clone());
            cancel
        };

        let state = self.state.clone();
        let ledger = self.ledger.clone();
        let poll_interval = self.poll_interval;

        debug!(%address, "Balance observer started");

        Ok(tokio::spawn(async move {
            let result =
                poll(&state, ledger.as_ref(), address, poll_interval, &cancel, on_ready).await;
            let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
            if !guard.resolved {
                guard.running = None;
            }
            result
        }))
    }
}

async fn poll<F>(
    state: &Mutex<ObserverState>,
    ledger: &dyn Ledger,
    address: Address,
    poll_interval: Duration,
    cancel: &CancellationToken,
    on_ready: F,
) -> RelayerResult<()>
where
    F: FnOnce(BalanceDetails),
{
    loop {
        let tokens = state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tokens
            .clone();

        for token in tokens {
            let balance = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                balance = ledger.balance_of(address, token.address) => balance,
            };
            let balance = match balance {
                Ok(balance) => balance,
                Err(e) => {
                    warn!(
                        %address,
                        token = %token.address,
                        error = %e,
                        "Balance query failed"
                    );
                    return Err(e);
                }
            };

            if balance < token.minimal_amount {
                continue;
            }

            let won = {
                let mut guard = state.lock().unwrap_or_else(PoisonError::into_inner);
                let still_supported = guard.tokens.contains(&token);
                if !guard.resolved && still_supported && !cancel.is_cancelled() {
                    guard.resolved = true;
                    true
                } else {
                    false
                }
            };
            if won {
                info!(%address, token = %token.address, %balance, "Deployment balance reached");
                on_ready(BalanceDetails {
                    token_address: token.address,
                    contract_address: address,
                });
                return Ok(());
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(%address, "Balance observer cancelled");
                return Ok(());
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }
    }
}

impl Drop for BalanceObserver {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
