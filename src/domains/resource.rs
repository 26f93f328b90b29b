//! Resource tokens: trading through the TokenConverter and market records.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::blockchain::types::{ChainId, ContractCallRequest, ExecutionMode};
use crate::config::contracts::ContractName;
use crate::context::SkillContext;
use crate::domains::{chain_or, ensure_main_chain, paging, run_tool, send_call, ToolOutput};
use crate::http::RequestOptions;
use crate::result::{require_text, require_value, SkillResult, ToolResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TradeInput {
    pub chain_id: Option<String>,
    pub symbol: String,
    pub amount: Value,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordsInput {
    pub chain_id: Option<String>,
    pub skip_count: Option<u64>,
    pub max_result_count: Option<u64>,
    pub symbol: Option<String>,
}

fn resource_chain(ctx: &SkillContext, requested: &Option<String>) -> ChainId {
    chain_or(requested, &ctx.config().chains.default_network_chain)
}

async fn trade(ctx: &SkillContext, input: TradeInput, method: &str) -> SkillResult<ToolOutput> {
    require_text(&input.symbol, "symbol")?;
    require_value(&input.amount, "amount")?;
    let chain = resource_chain(ctx, &input.chain_id);
    ensure_main_chain(&chain, "resource domain")?;
    let converter = ctx.contracts().require(chain.as_str(), ContractName::TokenConverter)?.to_string();
    let args = json!({ "symbol": input.symbol, "amount": input.amount });
    send_call(ctx, ContractCallRequest::new(chain, converter, method, args), input.mode).await
}

pub async fn buy(ctx: &SkillContext, input: TradeInput) -> ToolResult<Value> {
    run_tool("resource_buy", trade(ctx, input, "Buy")).await
}

pub async fn sell(ctx: &SkillContext, input: TradeInput) -> ToolResult<Value> {
    run_tool("resource_sell", trade(ctx, input, "Sell")).await
}

pub async fn realtime_records(ctx: &SkillContext, input: RecordsInput) -> ToolResult<Value> {
    run_tool("resource_realtime_records", async move {
        let (skip, max) = paging(input.skip_count, input.max_result_count);
        let query = json!({
            "chainId": resource_chain(ctx, &input.chain_id),
            "skipCount": skip,
            "maxResultCount": max,
        });
        let data = ctx
            .api()
            .get("/resource/realtime-records", Some(&query), RequestOptions::default())
            .await?;
        Ok((data, None))
    })
    .await
}

pub async fn turnover(ctx: &SkillContext, input: RecordsInput) -> ToolResult<Value> {
    run_tool("resource_turnover", async move {
        let query = json!({
            "chainId": resource_chain(ctx, &input.chain_id),
            "symbol": input.symbol,
        });
        let data = ctx.api().get("/resource/turnover", Some(&query), RequestOptions::default()).await?;
        Ok((data, None))
    })
    .await
}

pub async fn records(ctx: &SkillContext, input: RecordsInput) -> ToolResult<Value> {
    run_tool("resource_records", async move {
        let (skip, max) = paging(input.skip_count, input.max_result_count);
        let query = json!({
            "chainId": resource_chain(ctx, &input.chain_id),
            "skipCount": skip,
            "maxResultCount": max,
            "symbol": input.symbol,
        });
        let data = ctx.api().get("/resource/records", Some(&query), RequestOptions::default()).await?;
        Ok((data, None))
    })
    .await
}
