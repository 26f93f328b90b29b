//! Generic chain and backend tools: raw contract calls, input packing,
//! transaction lookup, backend reads and the auth token.

use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use crate::blockchain::types::{ChainId, ContractCallRequest, ExecutionMode, SendOptions, WaitOptions};
use crate::context::SkillContext;
use crate::domains::run_tool;
use crate::http::RequestOptions;
use crate::result::{require_text, SkillResult, ToolResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractInput {
    pub chain_id: String,
    pub contract_address: String,
    pub method_name: String,
    pub args: Value,
    pub mode: ExecutionMode,
    /// Return right after submission instead of polling for a terminal status.
    pub no_wait: bool,
}

impl ContractInput {
    fn request(&self) -> SkillResult<ContractCallRequest> {
        require_text(&self.chain_id, "chainId")?;
        require_text(&self.contract_address, "contractAddress")?;
        require_text(&self.method_name, "methodName")?;
        Ok(ContractCallRequest::new(
            self.chain_id.as_str(),
            self.contract_address.as_str(),
            self.method_name.as_str(),
            self.args.clone(),
        ))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TxResultInput {
    pub chain_id: String,
    pub tx_id: String,
    pub poll_interval_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

pub async fn contract_view(ctx: &SkillContext, input: ContractInput) -> ToolResult<Value> {
    run_tool("contract_view", async move {
        let request = input.request()?;
        Ok((ctx.chain().call_view(&request).await?, None))
    })
    .await
}

pub async fn contract_send(ctx: &SkillContext, input: ContractInput) -> ToolResult<Value> {
    run_tool("contract_send", async move {
        let request = input.request()?;
        let options = SendOptions {
            mode: input.mode,
            wait_for_mined: Some(!input.no_wait),
            ..SendOptions::default()
        };
        let outcome = ctx.chain().call_send(&request, &options).await?;
        Ok((outcome.result, outcome.tx))
    })
    .await
}

/// Base64 protobuf bytes of a method input.
pub async fn pack_input(ctx: &SkillContext, input: ContractInput) -> ToolResult<Value> {
    run_tool("pack_input", async move {
        let request = input.request()?;
        let packed = ctx.chain().pack_input(
            &request.chain_id,
            &request.contract_address,
            &request.method_name,
            &request.args,
        )?;
        Ok((json!({ "methodName": request.method_name, "input": packed }), None))
    })
    .await
}

/// Poll a transaction until it reaches a terminal status.
pub async fn tx_result(ctx: &SkillContext, input: TxResultInput) -> ToolResult<Value> {
    run_tool("tx_result", async move {
        require_text(&input.chain_id, "chainId")?;
        require_text(&input.tx_id, "txId")?;
        let rpc_url = ctx.chain().rpc_url(&ChainId::new(input.chain_id.as_str()))?.to_string();

        let defaults = WaitOptions::default();
        let options = WaitOptions {
            poll_interval: input
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_interval),
            max_attempts: input.max_attempts.unwrap_or(defaults.max_attempts),
        };

        let outcome = ctx.chain().wait_for_tx_result(&rpc_url, &input.tx_id, Some(options)).await?;
        Ok((
            json!({
                "txId": input.tx_id,
                "status": outcome.status,
                "result": outcome.raw,
            }),
            None,
        ))
    })
    .await
}

/// GET any backend path under the API prefix.
pub async fn api_get(ctx: &SkillContext, path: String, query: Option<Value>, auth: bool) -> ToolResult<Value> {
    run_tool("api_get", async move {
        require_text(&path, "path")?;
        let options = RequestOptions { auth };
        let data = ctx.api().get(&path, query.as_ref(), options).await?;
        Ok((data, None))
    })
    .await
}

/// Fetch (or refresh) the auth token and report its metadata. The token
/// itself never leaves the process.
pub async fn token_status(ctx: &SkillContext, force_refresh: bool) -> ToolResult<Value> {
    run_tool("auth_token", async move {
        let token = ctx.tokens().get_access_token(force_refresh).await?;
        Ok((
            json!({
                "tokenType": token.token_type,
                "expiresIn": token.expires_in,
                "expiresAt": token.expires_at,
                "valid": token.is_valid(),
            }),
            None,
        ))
    })
    .await
}
