// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Confirmation mail delivery.

use async_trait::async_trait;
use serde::Serialize;

use super::codes::mask_email;
use crate::error::{RelayerError, RelayerResult};

/// Delivers confirmation codes to users.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation(&self, email: &str, code: &str) -> RelayerResult<()>;
}

#[derive(Serialize)]
struct MailPayload<'a> {
    to: &'a str,
    subject: &'a str,
    text: String,
}

/// Posts confirmation mails to a transactional mail HTTP API.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: url::Url,
    api_key: Option<String>,
}

impl HttpMailer {
    pub fn new(endpoint: url::Url, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_confirmation(&self, email: &str, code: &str) -> RelayerResult<()> {
        let payload = MailPayload {
            to: email,
            subject: "Your confirmation code",
            text: format!("Your confirmation code is {code}. It can be used once."),
        };

        let mut request = self.client.post(self.endpoint.clone()).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelayerError::Mail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayerError::Mail(format!("mail API returned {status}: {body}")));
        }

        tracing::info!(email = %mask_email(email), "Confirmation mail sent");
        Ok(())
    }
}

/// Writes mails to the log instead of sending them. For local runs only.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation(&self, email: &str, code: &str) -> RelayerResult<()> {
        #[cfg(feature = "dev")]
        tracing::info!(email = %email, code = %code, "Confirmation code issued (dev)");

        #[cfg(not(feature = "dev"))]
        {
            let _ = code;
            tracing::info!(
                email = %mask_email(email),
                "Confirmation code issued; no mail API configured"
            );
        }

        Ok(())
    }
}
