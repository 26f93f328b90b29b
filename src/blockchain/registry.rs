//! Contract method registry.
//!
//! Maps `(contract address, method name)` to a [`MethodDescriptor`] naming
//! the input codec for that method. Lookups replace any dynamic dispatch on
//! the contract object: a method missing from the table is
//! [`BlockchainError::MethodNotFound`].

use base64::prelude::*;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::contracts::{ContractBook, ContractName};

/// Input encoding for a contract method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCodec {
    /// Arguments are passed through as protobuf-JSON. No binary packing.
    Json,
    /// A single `aelf.Hash`, given as a hex string or `{ "value": hex }`.
    Hash,
    /// `google.protobuf.Empty`.
    Empty,
}

impl InputCodec {
    /// Params string sent to the node alongside the method name.
    pub fn params(&self, method: &str, args: &Value) -> BlockchainResult<String> {
        let value = match self {
            Self::Json => match args {
                Value::Null => json!({}),
                other => other.clone(),
            },
            Self::Hash => json!({ "value": BASE64_STANDARD.encode(hash_bytes(method, args)?) }),
            Self::Empty => json!({}),
        };
        serde_json::to_string(&value).map_err(|e| BlockchainError::InvalidArgs {
            method: method.to_string(),
            reason: e.to_string(),
        })
    }

    /// Protobuf wire bytes of the input, when this codec knows the layout.
    pub fn pack(&self, method: &str, args: &Value) -> BlockchainResult<Option<Vec<u8>>> {
        match self {
            Self::Json => Ok(None),
            Self::Hash => {
                let bytes = hash_bytes(method, args)?;
                // field 1, wire type 2 (length-delimited)
                let mut out = Vec::with_capacity(2 + bytes.len());
                out.push(0x0a);
                out.push(bytes.len() as u8);
                out.extend_from_slice(&bytes);
                Ok(Some(out))
            }
            Self::Empty => Ok(Some(Vec::new())),
        }
    }
}

fn hash_bytes(method: &str, args: &Value) -> BlockchainResult<[u8; 32]> {
    let invalid = |reason: String| BlockchainError::InvalidArgs {
        method: method.to_string(),
        reason,
    };

    let inner = match args {
        Value::Object(map) => map
            .get("value")
            .or_else(|| map.get("proposalId"))
            .ok_or_else(|| invalid("expected a hash string or an object with `value`".to_string()))?,
        other => other,
    };

    let bytes = match inner {
        Value::String(s) => {
            let s = s.strip_prefix("0x").unwrap_or(s);
            hex::decode(s).map_err(|e| invalid(format!("hash is not hex: {}", e)))?
        }
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_u64().and_then(|b| u8::try_from(b).ok()))
            .collect::<Option<Vec<u8>>>()
            .ok_or_else(|| invalid("hash byte array must contain values 0-255".to_string()))?,
        _ => return Err(invalid("hash must be a hex string or byte array".to_string())),
    };

    <[u8; 32]>::try_from(bytes.as_slice())
        .map_err(|_| invalid(format!("hash must be 32 bytes, got {}", bytes.len())))
}

/// One callable method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub input: InputCodec,
}

/// The methods exposed by one contract.
#[derive(Debug, Clone, Default)]
pub struct ContractInterface {
    methods: HashMap<String, MethodDescriptor>,
}

impl ContractInterface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, name: &str, input: InputCodec) -> Self {
        self.methods.insert(
            name.to_string(),
            MethodDescriptor {
                name: name.to_string(),
                input,
            },
        );
        self
    }

    pub fn json_methods(self, names: &[&str]) -> Self {
        names
            .iter()
            .fold(self, |iface, name| iface.method(name, InputCodec::Json))
    }

    pub fn get(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// Contract address → interface lookup table.
#[derive(Debug, Clone, Default)]
pub struct ContractRegistry {
    contracts: HashMap<String, Arc<ContractInterface>>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry with the known governance contracts in `book`.
    pub fn from_book(book: &ContractBook) -> Self {
        let mut registry = Self::new();

        let proposal_iface = ContractInterface::new()
            .json_methods(&["CreateProposal", "CreateOrganization", "GetOrganization"])
            .method("Approve", InputCodec::Hash)
            .method("Reject", InputCodec::Hash)
            .method("Abstain", InputCodec::Hash)
            .method("Release", InputCodec::Hash)
            .method("GetProposal", InputCodec::Hash);

        let interfaces = [
            (ContractName::Parliament, proposal_iface.clone()),
            (ContractName::Association, proposal_iface.clone()),
            (ContractName::Referendum, proposal_iface),
            (
                ContractName::Election,
                ContractInterface::new()
                    .json_methods(&["AnnounceElection", "QuitElection", "Vote", "ChangeVotingOption"])
                    .method("Withdraw", InputCodec::Hash)
                    .method("GetCandidates", InputCodec::Empty),
            ),
            (
                ContractName::Profit,
                ContractInterface::new().json_methods(&["ClaimProfits", "GetProfitAmount"]),
            ),
            (
                ContractName::TokenConverter,
                ContractInterface::new().json_methods(&["Buy", "Sell", "GetPairConnector"]),
            ),
            (
                ContractName::Token,
                ContractInterface::new().json_methods(&[
                    "GetBalance",
                    "GetAllowance",
                    "GetTokenInfo",
                    "Approve",
                    "Transfer",
                ]),
            ),
            (
                ContractName::Genesis,
                ContractInterface::new()
                    .json_methods(&[
                        "ProposeNewContract",
                        "ProposeUpdateContract",
                        "DeployUserSmartContract",
                        "UpdateUserSmartContract",
                        "ReleaseApprovedContract",
                        "ReleaseCodeCheckedContract",
                    ])
                    .method("GetSmartContractRegistrationByCodeHash", InputCodec::Hash),
            ),
            (
                ContractName::Dao,
                ContractInterface::new().json_methods(&[
                    "CreateDAO",
                    "UpdateMetadata",
                    "UploadFileInfos",
                    "RemoveFileInfos",
                    "GetDAOInfo",
                ]),
            ),
            (
                ContractName::Proposal,
                ContractInterface::new()
                    .json_methods(&["CreateProposal", "CreateTransferProposal", "CreateVetoProposal"])
                    .method("ExecuteProposal", InputCodec::Hash)
                    .method("GetProposalInfo", InputCodec::Hash),
            ),
            (
                ContractName::Vote,
                ContractInterface::new().json_methods(&["Vote", "Withdraw"]),
            ),
        ];

        for (name, iface) in interfaces {
            let iface = Arc::new(iface);
            for address in book.addresses_of(name) {
                registry.contracts.insert(address.to_string(), iface.clone());
            }
        }

        registry
    }

    /// Register (or replace) the interface for a contract address.
    pub fn register(&mut self, contract_address: impl Into<String>, iface: ContractInterface) {
        self.contracts.insert(contract_address.into(), Arc::new(iface));
    }

    /// Resolve a method on a contract.
    pub fn resolve(&self, contract_address: &str, method: &str) -> BlockchainResult<&MethodDescriptor> {
        self.contracts
            .get(contract_address)
            .and_then(|iface| iface.get(method))
            .ok_or_else(|| BlockchainError::MethodNotFound {
                contract: contract_address.to_string(),
                method: method.to_string(),
            })
    }

    pub fn contains(&self, contract_address: &str) -> bool {
        self.contracts.contains_key(contract_address)
    }
}
