//! TMRW DAO and aelf network governance toolkit.
//!
//! # Architecture Overview
//!
//! ```text
//!   domain tool ──▶ ChainCaller ──▶ RpcClientPool ──▶ chain node
//!        │              │  └──────▶ Wallet (signing)
//!        │              └─────────▶ TxWaiter ──▶ chain node
//!        └────────▶ ApiClient ──▶ TokenCache ──▶ token endpoint
//!                       └──────────────────────▶ backend REST API
//! ```
//!
//! Every tool returns a [`ToolResult`]; nothing below the tool boundary
//! escapes as a panic or a raw transport error.

pub mod auth;
pub mod blockchain;
pub mod config;
pub mod context;
pub mod domains;
pub mod http;
pub mod observability;
pub mod resilience;
pub mod result;

pub use config::SkillConfig;
pub use context::SkillContext;
pub use domains::dispatch::{dispatch, TOOL_NAMES};
pub use result::{SkillError, SkillResult, ToolError, ToolResult};
