//! Block producer election: candidacy, votes, profits and team profiles.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::blockchain::types::{ChainId, ContractCallRequest};
use crate::config::contracts::ContractName;
use crate::context::SkillContext;
use crate::domains::{chain_or, ensure_main_chain, paging, run_tool, send_call, ChainInput, SendInput, ToolOutput};
use crate::http::RequestOptions;
use crate::result::{require_text, require_value, SkillResult, ToolResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VotesListInput {
    pub chain_id: Option<String>,
    pub skip_count: Option<u64>,
    pub max_result_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamDescGetInput {
    pub chain_id: Option<String>,
    pub public_key: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamDescAddInput {
    pub chain_id: Option<String>,
    pub public_key: String,
    pub address: String,
    pub name: String,
    pub avatar: Option<String>,
    pub intro: Option<String>,
    pub tx_id: Option<String>,
    pub is_active: Option<bool>,
    pub socials: Option<Vec<String>>,
    pub official_website: Option<String>,
    pub location: Option<String>,
    pub mail: Option<String>,
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoteReclaimInput {
    pub chain_id: Option<String>,
    pub vote_id: String,
    pub proposal_id: Option<String>,
}

fn bp_chain(ctx: &SkillContext, requested: &Option<String>) -> ChainId {
    chain_or(requested, &ctx.config().chains.default_network_chain)
}

async fn contract_send(
    ctx: &SkillContext,
    input: SendInput,
    contract: ContractName,
    method: &str,
) -> SkillResult<ToolOutput> {
    require_value(&input.args, "args")?;
    let chain = bp_chain(ctx, &input.chain_id);
    ensure_main_chain(&chain, "bp domain")?;
    let address = ctx.contracts().require(chain.as_str(), contract)?.to_string();
    send_call(ctx, ContractCallRequest::new(chain, address, method, input.args), input.mode).await
}

/// Announce candidacy (`Election.AnnounceElection`).
pub async fn apply(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool("bp_apply", contract_send(ctx, input, ContractName::Election, "AnnounceElection")).await
}

pub async fn quit(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool("bp_quit", contract_send(ctx, input, ContractName::Election, "QuitElection")).await
}

pub async fn vote(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool("bp_vote", contract_send(ctx, input, ContractName::Election, "Vote")).await
}

/// Withdraw a matured vote; `args` is the vote id.
pub async fn withdraw(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool("bp_withdraw", contract_send(ctx, input, ContractName::Election, "Withdraw")).await
}

pub async fn change_vote(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool(
        "bp_change_vote",
        contract_send(ctx, input, ContractName::Election, "ChangeVotingOption"),
    )
    .await
}

pub async fn claim_profits(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool("bp_claim_profits", contract_send(ctx, input, ContractName::Profit, "ClaimProfits")).await
}

pub async fn votes_list(ctx: &SkillContext, input: VotesListInput) -> ToolResult<Value> {
    run_tool("bp_votes_list", async move {
        let (skip, max) = paging(input.skip_count, input.max_result_count);
        let query = json!({
            "chainId": bp_chain(ctx, &input.chain_id),
            "skipCount": skip,
            "maxResultCount": max,
        });
        let data = ctx.api().get("/networkdao/votes", Some(&query), RequestOptions::default()).await?;
        Ok((data, None))
    })
    .await
}

pub async fn team_desc_get(ctx: &SkillContext, input: TeamDescGetInput) -> ToolResult<Value> {
    run_tool("bp_team_desc_get", async move {
        require_text(&input.public_key, "publicKey")?;
        let query = json!({
            "chainId": bp_chain(ctx, &input.chain_id),
            "publicKey": input.public_key,
        });
        let data = ctx
            .api()
            .get("/networkdao/vote/getTeamDesc", Some(&query), RequestOptions::default())
            .await?;
        Ok((data, None))
    })
    .await
}

pub async fn team_desc_list(ctx: &SkillContext, input: ChainInput) -> ToolResult<Value> {
    run_tool("bp_team_desc_list", async move {
        let query = json!({ "chainId": bp_chain(ctx, &input.chain_id) });
        let data = ctx
            .api()
            .get("/networkdao/vote/getAllTeamDesc", Some(&query), RequestOptions::default())
            .await?;
        Ok((data, None))
    })
    .await
}

/// Publish a candidate team profile. `isActive` defaults to true.
pub async fn team_desc_add(ctx: &SkillContext, input: TeamDescAddInput) -> ToolResult<Value> {
    run_tool("bp_team_desc_add", async move {
        require_text(&input.public_key, "publicKey")?;
        require_text(&input.address, "address")?;
        require_text(&input.name, "name")?;
        let body = json!({
            "chainId": bp_chain(ctx, &input.chain_id),
            "publicKey": input.public_key,
            "address": input.address,
            "name": input.name,
            "avatar": input.avatar,
            "intro": input.intro,
            "txId": input.tx_id,
            "isActive": input.is_active.unwrap_or(true),
            "socials": input.socials,
            "officialWebsite": input.official_website,
            "location": input.location,
            "mail": input.mail,
            "updateTime": input.update_time,
        });
        let data = ctx
            .api()
            .post("/networkdao/vote/addTeamDesc", &body, RequestOptions::authenticated())
            .await?;
        Ok((data, None))
    })
    .await
}

pub async fn vote_reclaim(ctx: &SkillContext, input: VoteReclaimInput) -> ToolResult<Value> {
    run_tool("bp_vote_reclaim", async move {
        require_text(&input.vote_id, "voteId")?;
        let body = json!({
            "chainId": bp_chain(ctx, &input.chain_id),
            "voteId": input.vote_id,
            "proposalId": input.proposal_id,
        });
        let data = ctx
            .api()
            .post("/networkdao/vote/reclaim", &body, RequestOptions::authenticated())
            .await?;
        Ok((data, None))
    })
    .await
}
