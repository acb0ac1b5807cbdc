// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Message hashing, signing and gas-data estimation for wallet messages.
//!
//! Signatures are EIP-191 personal signatures over a keccak256 digest, the
//! same scheme wallet contracts verify on chain.

use alloy::{
    primitives::{keccak256, Address, Bytes, Signature, B256, U256},
    signers::{local::PrivateKeySigner, SignerSync},
    sol_types::{SolCall, SolValue},
};

use super::contracts::executeSignedCall;
use crate::error::{RelayerError, RelayerResult};
use crate::models::SignedMessage;

/// Calldata cost of a zero byte.
const GAS_PER_ZERO_BYTE: u64 = 4;

/// Calldata cost of a non-zero byte.
const GAS_PER_NON_ZERO_BYTE: u64 = 16;

/// Length of an ECDSA signature in `r || s || v` form.
pub const SIGNATURE_LENGTH: usize = 65;

/// Create a signer from a hex private key (with or without `0x`).
pub fn signer_from_private_key(private_key_hex: &str) -> RelayerResult<PrivateKeySigner> {
    let key_bytes = alloy::primitives::hex::decode(private_key_hex.trim())
        .map_err(|e| RelayerError::Signing(format!("Invalid private key: {e}")))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| RelayerError::Signing(format!("Invalid private key: {e}")))
}

/// Hash of every signed field of a message (everything but `signature`).
pub fn message_hash(message: &SignedMessage) -> B256 {
    let packed = (
        message.from,
        message.to,
        message.value,
        keccak256(&message.data),
        message.nonce,
        message.gas_price,
        message.gas_token,
        message.gas_limit_execution,
        message.gas_data,
        alloy::primitives::FixedBytes::<1>([message.operation_type.as_u8()]),
    )
        .abi_encode_packed();
    keccak256(packed)
}

/// Sign the message hash and return the 65-byte signature.
pub fn sign_message(message: &SignedMessage, signer: &PrivateKeySigner) -> RelayerResult<Bytes> {
    sign_digest(message_hash(message), signer)
}

/// Recover the address that produced `message.signature`.
pub fn recover_signer(message: &SignedMessage) -> RelayerResult<Address> {
    let signature = Signature::from_raw(&message.signature)
        .map_err(|e| RelayerError::MalformedSignature(e.to_string()))?;

    signature
        .recover_address_from_msg(message_hash(message).as_slice())
        .map_err(|e| RelayerError::MalformedSignature(e.to_string()))
}

/// Signature over the wallet initialization payload.
pub fn initialize_signature(init_data: &[u8], signer: &PrivateKeySigner) -> RelayerResult<Bytes> {
    sign_digest(keccak256(init_data), signer)
}

fn sign_digest(digest: B256, signer: &PrivateKeySigner) -> RelayerResult<Bytes> {
    let signature = signer
        .sign_message_sync(digest.as_slice())
        .map_err(|e| RelayerError::Signing(e.to_string()))?;
    Ok(Bytes::from(signature.as_bytes().to_vec()))
}

/// Calldata gas cost: 4 per zero byte, 16 per non-zero byte.
pub fn compute_gas_data(calldata: &[u8]) -> U256 {
    let gas: u64 = calldata
        .iter()
        .map(|byte| {
            if *byte == 0 {
                GAS_PER_ZERO_BYTE
            } else {
                GAS_PER_NON_ZERO_BYTE
            }
        })
        .sum();
    U256::from(gas)
}

/// Deterministic `gasData` for a message, computed from its unsigned fields.
///
/// `gasData` and `signature` are replaced by all-`0xff` placeholders so the
/// estimate does not depend on the values it is compared against.
pub fn estimate_gas_data(message: &SignedMessage) -> U256 {
    let call = executeSignedCall {
        to: message.to,
        value: message.value,
        data: message.data.clone(),
        nonce: message.nonce,
        gasPrice: message.gas_price,
        gasToken: message.gas_token,
        gasLimitExecution: message.gas_limit_execution,
        gasData: U256::MAX,
        operationType: message.operation_type.as_u8(),
        signature: Bytes::from(vec![0xff; SIGNATURE_LENGTH]),
    };
    compute_gas_data(&call.abi_encode())
}
