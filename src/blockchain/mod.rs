//! Chain execution subsystem.
//!
//! # Data Flow
//! ```text
//! ContractCallRequest
//!     → caller.rs (chain → RPC URL, mode dispatch)
//!     → pool.rs (one cached node client per RPC URL)
//!     → registry.rs (contract address + method → input codec)
//!     → wallet.rs (throwaway for views, configured key for sends)
//!     → client.rs (node web API)
//!     → waiter.rs (poll until a terminal status)
//! ```
//!
//! # Security Constraints
//! - Private keys come from configuration or a per-call override
//! - Never log private keys or signatures
//! - Every node request carries a timeout

pub mod caller;
pub mod client;
pub mod pool;
pub mod registry;
pub mod types;
pub mod waiter;
pub mod wallet;

pub use caller::ChainCaller;
pub use client::{ChainNode, ContractCall, HttpChainNode};
pub use pool::{NodeFactory, RpcClientPool};
pub use registry::{ContractInterface, ContractRegistry, InputCodec, MethodDescriptor};
pub use types::{
    BlockchainError, BlockchainResult, ChainId, ContractCallRequest, ExecutionMode, SendOptions,
    SendOutcome, TxReceipt, WaitOptions,
};
pub use waiter::{TxOutcome, TxWaiter};
pub use wallet::Wallet;
