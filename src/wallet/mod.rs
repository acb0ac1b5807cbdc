// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Wallet Deployment Lifecycle
//!
//! ```text
//! FutureWallet ──deploy()──▶ DeployingWallet ──wait_to_be_deployed()──▶ DeployedWallet
//!      │
//!      └── wait_for_balance(): BalanceObserver polls until funded
//! ```
//!
//! Each transition consumes the previous state, so a wallet never goes
//! back to an earlier stage. A wait that ends without confirmation hands
//! the `DeployingWallet` back through [`DeploymentWait`].

mod deploying;
mod future;
mod observer;

pub use deploying::{DeployedWallet, DeployingWallet, DeploymentWait};
pub use future::{FutureWallet, WalletServices, DEFAULT_DEPLOYMENT_REFUND};
pub use observer::{BalanceObserver, DEFAULT_POLL_INTERVAL};
