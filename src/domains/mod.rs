//! Governance tools.
//!
//! # Responsibilities
//! - Validate tool input and pick the domain's default chain
//! - Map each tool onto a contract call or a REST call
//! - Wrap every invocation in a traced [`ToolResult`] envelope
//!
//! # Design Decisions
//! - Tools never panic or leak errors: [`run_tool`] turns any failure into
//!   the failure envelope
//! - State-changing tools default to simulate mode
//! - Inputs are serde structs with defaulted fields so a missing field
//!   surfaces as `INVALID_INPUT`, not a decode error

pub mod bp;
pub mod chain;
pub mod dao;
pub mod dispatch;
pub mod network;
pub mod resource;

use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

use crate::blockchain::types::{
    BlockchainError, ChainId, ContractCallRequest, ExecutionMode, SendOptions, TxReceipt, AELF,
};
use crate::context::SkillContext;
use crate::result::{SkillError, SkillResult, ToolResult};

/// Successful tool output: payload plus an optional receipt.
pub type ToolOutput = (Value, Option<TxReceipt>);

/// Run one tool body under a fresh trace id.
pub async fn run_tool<F>(tool: &str, body: F) -> ToolResult<Value>
where
    F: Future<Output = SkillResult<ToolOutput>>,
{
    let trace_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!("tool", tool, trace_id = %trace_id);

    match body.instrument(span).await {
        Ok((data, tx)) => {
            tracing::debug!(tool, trace_id = %trace_id, has_tx = tx.is_some(), "Tool succeeded");
            ToolResult::ok(data).with_tx(tx).with_trace_id(trace_id)
        }
        Err(err) => failure(tool, trace_id, &err),
    }
}

/// Failure envelope for errors raised outside a tool body.
pub fn fail_traced(stage: &str, err: &SkillError) -> ToolResult<Value> {
    failure(stage, Uuid::new_v4().to_string(), err)
}

fn failure(tool: &str, trace_id: String, err: &SkillError) -> ToolResult<Value> {
    tracing::warn!(tool, trace_id = %trace_id, code = err.code(), error = %err, "Tool failed");
    ToolResult::fail(err).with_trace_id(trace_id)
}

/// Fields shared by every state-changing tool.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendInput {
    pub chain_id: Option<String>,
    pub args: Value,
    pub mode: ExecutionMode,
}

/// Input of tools that only pick a chain.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainInput {
    pub chain_id: Option<String>,
}

/// Requested chain, else `default`.
pub(crate) fn chain_or(requested: &Option<String>, default: &str) -> ChainId {
    match requested.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => ChainId::new(id),
        _ => ChainId::new(default),
    }
}

/// Reject anything but the main chain for main-chain-only domains.
pub(crate) fn ensure_main_chain(chain: &ChainId, domain: &str) -> SkillResult<()> {
    if chain.as_str() == AELF {
        Ok(())
    } else {
        Err(BlockchainError::UnsupportedChain(format!(
            "{} currently supports AELF only, got {}",
            domain, chain
        ))
        .into())
    }
}

/// Submit (or preview) one contract call.
pub(crate) async fn send_call(
    ctx: &SkillContext,
    request: ContractCallRequest,
    mode: ExecutionMode,
) -> SkillResult<ToolOutput> {
    tracing::debug!(preview = %request.preview(), mode = ?mode, "Contract send");
    let outcome = ctx.chain().call_send(&request, &SendOptions::with_mode(mode)).await?;
    Ok((outcome.result, outcome.tx))
}

/// Read-only contract call.
pub(crate) async fn view_call(ctx: &SkillContext, request: ContractCallRequest) -> SkillResult<ToolOutput> {
    let result = ctx.chain().call_view(&request).await?;
    Ok((result, None))
}

/// `skipCount`/`maxResultCount` with list defaults; zero means default.
pub(crate) fn paging(skip: Option<u64>, max: Option<u64>) -> (u64, u64) {
    (skip.unwrap_or(0), max.filter(|m| *m > 0).unwrap_or(20))
}

/// Proposal id passed as the whole argument of a hash-input method.
pub(crate) fn proposal_id_arg(proposal_id: &str) -> SkillResult<Value> {
    if proposal_id.is_empty() {
        return Err(SkillError::invalid_input("proposalId is required"));
    }
    Ok(json!(proposal_id))
}
