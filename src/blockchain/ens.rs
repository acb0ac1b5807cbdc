// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ENS names for counterfactual wallets.
//!
//! Wallets are deployed with a subdomain of a domain the relayer operates,
//! e.g. `alice.mylogin.eth` under `mylogin.eth`. The proxy initializer needs
//! the label hash, the name node and the ENS contracts serving the domain.

use std::collections::HashMap;

use alloy::primitives::{keccak256, Address, B256};
use async_trait::async_trait;

use super::NameService;
use crate::error::{RelayerError, RelayerResult};

/// Constructor arguments for registering `label.domain` during deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsArgs {
    pub hash_label: B256,
    pub label: String,
    pub node: B256,
    pub ens_address: Address,
    pub registrar_address: Address,
    pub resolver_address: Address,
}

/// ENS contracts serving one parent domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnsDomain {
    pub registrar_address: Address,
    pub resolver_address: Address,
}

/// Whether `name` is a wallet name: `label.domain.tld`, lowercase
/// alphanumerics and inner hyphens.
pub fn is_valid_ens_name(name: &str) -> bool {
    let labels: Vec<&str> = name.split('.').collect();
    labels.len() == 3 && labels.iter().all(|label| is_valid_label(label))
}

fn is_valid_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// EIP-137 namehash.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        node = keccak256(buf);
    }
    node
}

/// Name service computing ENS arguments from a fixed domain table.
#[derive(Debug, Clone)]
pub struct ConfiguredNameService {
    ens_address: Address,
    domains: HashMap<String, EnsDomain>,
}

impl ConfiguredNameService {
    pub fn new(ens_address: Address, domains: HashMap<String, EnsDomain>) -> Self {
        Self {
            ens_address,
            domains,
        }
    }
}

#[async_trait]
impl NameService for ConfiguredNameService {
    async fn args_for(&self, ens_name: &str) -> RelayerResult<EnsArgs> {
        let (label, domain) = ens_name
            .split_once('.')
            .ok_or_else(|| RelayerError::InvalidAddressOrEnsName(ens_name.to_string()))?;

        let contracts = self.domains.get(domain).ok_or_else(|| {
            RelayerError::NameService(format!("Domain {domain} is not registered"))
        })?;

        Ok(EnsArgs {
            hash_label: keccak256(label.as_bytes()),
            label: label.to_string(),
            node: namehash(ens_name),
            ens_address: self.ens_address,
            registrar_address: contracts.registrar_address,
            resolver_address: contracts.resolver_address,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    #[test]
    fn valid_names() {
        assert!(is_valid_ens_name("alice.mylogin.eth"));
        assert!(is_valid_ens_name("alice-2.my-login.test"));
    }

    #[test]
    fn invalid_names() {
        for name in [
            "",
            "alice",
            "alice.eth",
            "a.b.c.eth",
            "Alice.mylogin.eth",
            "-alice.mylogin.eth",
            "alice..eth",
            "al ice.mylogin.eth",
            "0x0000000000000000000000000000000000000001",
        ] {
            assert!(!is_valid_ens_name(name), "{name} should be invalid");
        }
    }

    #[test]
    fn namehash_matches_eip137_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            namehash("eth"),
            b256!("93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")
        );
        assert_eq!(
            namehash("foo.eth"),
            b256!("de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f")
        );
    }

    #[tokio::test]
    async fn args_for_registered_domain() {
        let domain = EnsDomain {
            registrar_address: Address::repeat_byte(0x02),
            resolver_address: Address::repeat_byte(0x03),
        };
        let service = ConfiguredNameService::new(
            Address::repeat_byte(0x01),
            HashMap::from([("mylogin.eth".to_string(), domain)]),
        );

        let args = service.args_for("alice.mylogin.eth").await.unwrap();
        assert_eq!(args.label, "alice");
        assert_eq!(args.hash_label, keccak256("alice"));
        assert_eq!(args.node, namehash("alice.mylogin.eth"));
        assert_eq!(args.ens_address, Address::repeat_byte(0x01));
        assert_eq!(args.registrar_address, Address::repeat_byte(0x02));
        assert_eq!(args.resolver_address, Address::repeat_byte(0x03));
    }

    #[tokio::test]
    async fn args_for_unknown_domain_fails() {
        let service = ConfiguredNameService::new(Address::ZERO, HashMap::new());
        let result = service.args_for("alice.unknown.eth").await;
        assert!(matches!(result, Err(RelayerError::NameService(_))));
    }
}
