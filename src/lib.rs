// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relational Relayer - Smart Wallet Relaying Service
//!
//! Accepts signed requests on behalf of smart-contract wallets, decides
//! whether they are admissible, deploys counterfactual wallets once they
//! are funded and gates encrypted wallet backups behind email confirmation.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - EVM ledger queries, ENS arguments, signing and the deployment relay
//! - `recovery` - Email confirmation codes and encrypted backup recovery
//! - `storage` - Confirmation and backup storage (redb)
//! - `validation` - Admission checks for signed messages
//! - `wallet` - Counterfactual wallet deployment lifecycle

pub mod api;
pub mod blockchain;
pub mod config;
pub mod error;
pub mod models;
pub mod recovery;
pub mod state;
pub mod storage;
pub mod validation;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;
