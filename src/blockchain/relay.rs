// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP client for a relayer's deployment endpoint.

use async_trait::async_trait;
use serde::Deserialize;

use super::{DeploymentRelay, DeploymentRequest, DeploymentSubmission};
use crate::error::{RelayerError, RelayerResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployResponse {
    deployment_hash: alloy::primitives::B256,
}

/// Submits signed deployments to `POST {base}/wallet/deploy`.
pub struct RelayerApiClient {
    client: reqwest::Client,
    base_url: url::Url,
}

impl RelayerApiClient {
    pub fn new(base_url: url::Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn deploy_url(&self) -> RelayerResult<url::Url> {
        self.base_url
            .join("wallet/deploy")
            .map_err(|e| RelayerError::Relay(format!("Invalid relayer URL: {e}")))
    }
}

#[async_trait]
impl DeploymentRelay for RelayerApiClient {
    async fn submit_deployment(
        &self,
        request: &DeploymentRequest,
    ) -> RelayerResult<DeploymentSubmission> {
        let response = self
            .client
            .post(self.deploy_url()?)
            .json(request)
            .send()
            .await
            .map_err(|e| RelayerError::Relay(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayerError::Relay(format!(
                "relayer returned {status}: {body}"
            )));
        }

        let body: DeployResponse = response
            .json()
            .await
            .map_err(|e| RelayerError::Relay(format!("Invalid deploy response: {e}")))?;

        tracing::info!(
            ens_name = %request.ens_name,
            deployment_hash = %body.deployment_hash,
            "Deployment submitted"
        );

        Ok(DeploymentSubmission {
            deployment_hash: body.deployment_hash,
        })
    }
}
