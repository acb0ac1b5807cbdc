// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `DATA_DIR` | Directory holding the relayer database | `/data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `RPC_URL` | EVM JSON-RPC endpoint | `http://127.0.0.1:8545` |
//! | `CODE_TTL_SECS` | Lifetime of an email confirmation code | `3600` |
//! | `CODE_HMAC_SECRET` | Key for confirmation code digests | Required |
//! | `MAIL_API_URL` | Transactional mail endpoint | Optional (codes are only logged without it) |
//! | `MAIL_API_KEY` | Bearer token for the mail endpoint | Optional |
//! | `CONTRACT_WHITELIST` | Comma-separated contracts messages may call | Empty (any contract) |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::collections::HashSet;
use std::path::PathBuf;

use alloy::primitives::Address;

use crate::recovery::DEFAULT_CODE_TTL_SECS;

/// Directory holding `relayer.redb`.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const RPC_URL_ENV: &str = "RPC_URL";
pub const CODE_TTL_SECS_ENV: &str = "CODE_TTL_SECS";

/// Secret keying the HMAC digests of confirmation codes.
///
/// Rotating it invalidates every outstanding code.
pub const CODE_HMAC_SECRET_ENV: &str = "CODE_HMAC_SECRET";
pub const MAIL_API_URL_ENV: &str = "MAIL_API_URL";
pub const MAIL_API_KEY_ENV: &str = "MAIL_API_KEY";
pub const CONTRACT_WHITELIST_ENV: &str = "CONTRACT_WHITELIST";

/// `json` for structured logs, anything else for human-readable output.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_DATA_DIR: &str = "/data";
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct RelayerConfig {
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub rpc_url: String,
    pub code_ttl: chrono::Duration,
    pub code_hmac_secret: Vec<u8>,
    pub mail_api_url: Option<url::Url>,
    pub mail_api_key: Option<String>,
    pub contract_whitelist: HashSet<Address>,
    pub log_format: LogFormat,
}

impl RelayerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port: u16 = match get(PORT_ENV) {
            Some(v) => v.parse().map_err(|e| invalid(PORT_ENV, e))?,
            None => 8080,
        };

        let code_ttl_secs: i64 = match get(CODE_TTL_SECS_ENV) {
            Some(v) => v.parse().map_err(|e| invalid(CODE_TTL_SECS_ENV, e))?,
            None => DEFAULT_CODE_TTL_SECS,
        };
        if code_ttl_secs <= 0 {
            return Err(invalid(CODE_TTL_SECS_ENV, "must be positive"));
        }

        let code_hmac_secret = get(CODE_HMAC_SECRET_ENV)
            .ok_or(ConfigError::Missing(CODE_HMAC_SECRET_ENV))?
            .into_bytes();

        let mail_api_url: Option<url::Url> = get(MAIL_API_URL_ENV)
            .map(|v| v.parse().map_err(|e| invalid(MAIL_API_URL_ENV, e)))
            .transpose()?;

        let contract_whitelist = match get(CONTRACT_WHITELIST_ENV) {
            Some(v) => parse_address_list(&v)?,
            None => HashSet::new(),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            data_dir: PathBuf::from(
                get(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            host: get(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            rpc_url: get(RPC_URL_ENV).unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            code_ttl: chrono::Duration::seconds(code_ttl_secs),
            code_hmac_secret,
            mail_api_url,
            mail_api_key: get(MAIL_API_KEY_ENV),
            contract_whitelist,
            log_format,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("relayer.redb")
    }
}

fn parse_address_list(raw: &str) -> Result<HashSet<Address>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<Address>()
                .map_err(|e| invalid(CONTRACT_WHITELIST_ENV, format!("{item}: {e}")))
        })
        .collect()
}
