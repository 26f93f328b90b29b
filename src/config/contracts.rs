//! Built-in contract address book.
//!
//! Addresses are per chain. Overrides from configuration replace individual
//! entries and may add chains.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::blockchain::types::{BlockchainError, BlockchainResult, AELF, TDVV};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContractName {
    Dao,
    Proposal,
    Vote,
    Parliament,
    Association,
    Referendum,
    Election,
    TokenConverter,
    Profit,
    Token,
    Genesis,
}

impl ContractName {
    pub const ALL: [ContractName; 11] = [
        Self::Dao,
        Self::Proposal,
        Self::Vote,
        Self::Parliament,
        Self::Association,
        Self::Referendum,
        Self::Election,
        Self::TokenConverter,
        Self::Profit,
        Self::Token,
        Self::Genesis,
    ];

    /// Key used in override maps.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Dao => "dao",
            Self::Proposal => "proposal",
            Self::Vote => "vote",
            Self::Parliament => "parliament",
            Self::Association => "association",
            Self::Referendum => "referendum",
            Self::Election => "election",
            Self::TokenConverter => "tokenConverter",
            Self::Profit => "profit",
            Self::Token => "token",
            Self::Genesis => "genesis",
        }
    }
}

impl fmt::Display for ContractName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ContractName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown contract name '{}'", s))
    }
}

/// Proposal-capable governance contract family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProposalContractType {
    #[default]
    Parliament,
    Association,
    Referendum,
}

impl ProposalContractType {
    pub fn contract(&self) -> ContractName {
        match self {
            Self::Parliament => ContractName::Parliament,
            Self::Association => ContractName::Association,
            Self::Referendum => ContractName::Referendum,
        }
    }
}

impl FromStr for ProposalContractType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "parliament" => Ok(Self::Parliament),
            "association" => Ok(Self::Association),
            "referendum" => Ok(Self::Referendum),
            other => Err(format!(
                "unknown proposal contract type '{}', expected Parliament, Association or Referendum",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractBook {
    chains: BTreeMap<String, BTreeMap<ContractName, String>>,
}

impl ContractBook {
    pub fn defaults() -> Self {
        let aelf = [
            (ContractName::Parliament, "2JT8xzjR5zJ8xnBvdgBZdSjfbokFSbF5hDdpUCbXeWaJfPDmsK"),
            (ContractName::Association, "XyRN9VNabpBiVUFeX2t7ZUR2b3tWV7U31exufJ2AUepVb5t56"),
            (ContractName::Referendum, "NxSBGHE3zs85tpnX1Ns4awQUtFL8Dnr6Hux4C4E18WZsW4zzJ"),
            (ContractName::Election, "NrVf8B7XUduXn1oGHZeF1YANFXEXAhvCymz2WPyKZt4DE2zSg"),
            (ContractName::TokenConverter, "SietKh9cArYub9ox6E4rU94LrzPad6TB72rCwe3X1jQ5m1C34"),
            (ContractName::Profit, "2ZUgaDqWSh4aJ5s5Ker2tRczhJSNep4bVVfrRBRJTRQdMTbA5W"),
            (ContractName::Token, "JRmBduh4nXWi1aXgdUsj5gJrzeZb2LxmrAbf7W99faZSvoAaE"),
            (ContractName::Genesis, "pykr77ft9UUKJZLVq15wCH8PinBSjVRQ12sD1Ayq92mKFsJ1i"),
        ];
        let tdvv = [
            (ContractName::Dao, "2izSidAeMiZ6tmD7FKmnoWbygjFSmH5nko3cGJ9EtbfC44BycC"),
            (ContractName::Proposal, "2tCM3oV6dTCmwFxSiFGPEVhGngdMwBV741wi156vj8kmqfp6da"),
            (ContractName::Vote, "2A8h4hLynLt86RxqvpNY43x6Js8CYhgyuAzj7sDGQ2ecP77Zgp"),
            (ContractName::Token, "7RzVGiuVWkvL4VfVHdZfQF2Tri3sgLe9U991bohHFfSRZXuGX"),
        ];

        let to_map = |entries: &[(ContractName, &str)]| {
            entries
                .iter()
                .map(|(name, addr)| (*name, addr.to_string()))
                .collect::<BTreeMap<_, _>>()
        };

        Self {
            chains: BTreeMap::from([(AELF.to_string(), to_map(&aelf)), (TDVV.to_string(), to_map(&tdvv))]),
        }
    }

    /// Built-in book with `overrides` (chain → name → address) applied.
    pub fn with_overrides(overrides: &BTreeMap<String, BTreeMap<String, String>>) -> Result<Self, String> {
        let mut book = Self::defaults();
        for (chain, entries) in overrides {
            let target = book.chains.entry(chain.clone()).or_default();
            for (name, address) in entries {
                let name: ContractName = name.parse()?;
                target.insert(name, address.clone());
            }
        }
        Ok(book)
    }

    pub fn address(&self, chain_id: &str, name: ContractName) -> Option<&str> {
        self.chains.get(chain_id)?.get(&name).map(String::as_str)
    }

    /// Every address registered under `name`, across chains.
    pub fn addresses_of(&self, name: ContractName) -> impl Iterator<Item = &str> + '_ {
        self.chains
            .values()
            .filter_map(move |entries| entries.get(&name).map(String::as_str))
    }

    /// Address or `UnsupportedChain`.
    pub fn require(&self, chain_id: &str, name: ContractName) -> BlockchainResult<&str> {
        self.address(chain_id, name).ok_or_else(|| {
            BlockchainError::UnsupportedChain(format!("{} contract not configured for {}", name, chain_id))
        })
    }

    /// Governance proposal contract. Network governance lives on the main chain only.
    pub fn proposal_contract(&self, chain_id: &str, kind: ProposalContractType) -> BlockchainResult<&str> {
        if chain_id != AELF {
            return Err(BlockchainError::UnsupportedChain(format!(
                "network governance currently supports AELF only, got {}",
                chain_id
            )));
        }
        self.require(chain_id, kind.contract())
    }

    pub fn token_contract(&self, chain_id: &str) -> BlockchainResult<&str> {
        self.require(chain_id, ContractName::Token)
    }
}

impl Default for ContractBook {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_contract_main_chain_only() {
        let book = ContractBook::defaults();
        assert_eq!(
            book.proposal_contract(AELF, ProposalContractType::Association).unwrap(),
            "XyRN9VNabpBiVUFeX2t7ZUR2b3tWV7U31exufJ2AUepVb5t56"
        );
        let err = book.proposal_contract(TDVV, ProposalContractType::Parliament).unwrap_err();
        assert_eq!(err.code(), "UNSUPPORTED_CHAIN");
    }

    #[test]
    fn test_token_contract_per_chain() {
        let book = ContractBook::defaults();
        assert_ne!(book.token_contract(AELF).unwrap(), book.token_contract(TDVV).unwrap());
        assert!(book.token_contract("XYZ").is_err());
        assert_eq!(book.addresses_of(ContractName::Token).count(), 2);
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let overrides = BTreeMap::from([
            (
                AELF.to_string(),
                BTreeMap::from([("parliament".to_string(), "custom-parliament".to_string())]),
            ),
            (
                "tDVW".to_string(),
                BTreeMap::from([("Token".to_string(), "test-token".to_string())]),
            ),
        ]);
        let book = ContractBook::with_overrides(&overrides).unwrap();
        assert_eq!(book.address(AELF, ContractName::Parliament), Some("custom-parliament"));
        assert_eq!(book.token_contract("tDVW").unwrap(), "test-token");
        // Untouched entries survive.
        assert!(book.address(AELF, ContractName::Genesis).is_some());
    }

    #[test]
    fn test_unknown_override_name() {
        let overrides = BTreeMap::from([(
            AELF.to_string(),
            BTreeMap::from([("treasury".to_string(), "x".to_string())]),
        )]);
        assert!(ContractBook::with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_proposal_type_parse() {
        assert_eq!(
            "association".parse::<ProposalContractType>().unwrap(),
            ProposalContractType::Association
        );
        assert!("council".parse::<ProposalContractType>().is_err());
    }
}
