// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confirmation code generation, digesting and email normalization.

use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use unicode_normalization::UnicodeNormalization;

use crate::error::{RelayerError, RelayerResult};
use crate::models::ConfirmationIntent;

type HmacSha256 = Hmac<Sha256>;

/// Number of decimal digits in a confirmation code.
pub const CODE_LENGTH: usize = 6;

const CODE_SPACE: u32 = 1_000_000;

/// Largest multiple of `CODE_SPACE` that fits in a u32; draws at or above it
/// are rejected so every code is equally likely.
const REJECTION_BOUND: u32 = u32::MAX - (u32::MAX % CODE_SPACE);

/// Issues unpredictable codes and derives their storage digests.
pub struct CodeIssuer {
    rng: SystemRandom,
    secret: Vec<u8>,
}

impl CodeIssuer {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            rng: SystemRandom::new(),
            secret: secret.into(),
        }
    }

    /// Generate a fresh zero-padded numeric code from the OS CSPRNG.
    pub fn generate(&self) -> RelayerResult<String> {
        loop {
            let mut bytes = [0u8; 4];
            self.rng
                .fill(&mut bytes)
                .map_err(|_| RelayerError::Signing("system randomness unavailable".into()))?;
            let draw = u32::from_be_bytes(bytes);
            if draw < REJECTION_BOUND {
                return Ok(format!("{:0width$}", draw % CODE_SPACE, width = CODE_LENGTH));
            }
        }
    }

    /// HMAC-SHA256 digest binding a code to its intent and email.
    pub fn digest(
        &self,
        email: &str,
        intent: ConfirmationIntent,
        code: &str,
    ) -> RelayerResult<String> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| RelayerError::Signing(format!("HMAC key rejected: {e}")))?;
        mac.update(intent.as_str().as_bytes());
        mac.update(b"|");
        mac.update(email.as_bytes());
        mac.update(b"|");
        mac.update(code.trim().as_bytes());
        Ok(Base64::encode_string(&mac.finalize().into_bytes()))
    }
}

/// Canonical form of an email used as a storage key.
pub fn normalize_email(raw: &str) -> RelayerResult<String> {
    let email: String = raw.trim().nfkc().collect::<String>().to_lowercase();

    let mut parts = email.split('@');
    let valid = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
                && !email.contains('|')
        }
        _ => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(RelayerError::InvalidEmail(raw.to_string()))
    }
}

/// Hide most of the local part for logs: `name@gmail.com` → `n***@gmail.com`.
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{first}***@{domain}")
        }
        None => "***".to_string(),
    }
}
