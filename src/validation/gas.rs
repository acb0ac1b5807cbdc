// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use alloy::primitives::U256;
use async_trait::async_trait;

use super::MessageValidator;
use crate::blockchain::signing::estimate_gas_data;
use crate::ensure;
use crate::error::{RelayerError, RelayerResult};
use crate::models::SignedMessage;

/// Execution gas a message must reserve beyond this floor.
pub const GAS_BASE: U256 = U256::ZERO;

/// Signed `gasData` must match the estimate exactly and the execution
/// limit must be positive.
pub struct GasValidator;

#[async_trait]
impl MessageValidator for GasValidator {
    fn name(&self) -> &'static str {
        "gas"
    }

    async fn validate(&self, message: &SignedMessage) -> RelayerResult<()> {
        let expected = estimate_gas_data(message);
        ensure!(
            message.gas_data == expected,
            RelayerError::InsufficientGas {
                reason: format!(
                    "gasData should be {expected} but is {}",
                    message.gas_data
                ),
            }
        );
        ensure!(
            message.gas_limit_execution > GAS_BASE,
            RelayerError::InsufficientGas {
                reason: format!(
                    "gasLimitExecution should be greater than {GAS_BASE} but is {}",
                    message.gas_limit_execution
                ),
            }
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_message;
    use alloy::primitives::Address;

    #[tokio::test]
    async fn reason_carries_expected_and_actual() {
        let mut message = sample_message(Address::repeat_byte(0xaa));
        let expected = message.gas_data;
        message.gas_data = U256::from(5);

        let err = GasValidator.validate(&message).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains(&expected.to_string()));
        assert!(text.contains("is 5"));
    }

    #[tokio::test]
    async fn positive_limit_with_exact_estimate_passes() {
        let mut message = sample_message(Address::repeat_byte(0xaa));
        message.gas_limit_execution = U256::from(1);
        message.gas_data = estimate_gas_data(&message);
        GasValidator.validate(&message).await.unwrap();
    }
}
