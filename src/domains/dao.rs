//! TMRW DAO tools: DAO lifecycle, proposals, votes and discussion.
//!
//! Defaults to the DAO chain (`tDVV`). Contract addresses come from the
//! book for the selected chain, so a chain without DAO contracts fails with
//! `UNSUPPORTED_CHAIN`.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::blockchain::types::{ChainId, ContractCallRequest, ExecutionMode};
use crate::config::contracts::ContractName;
use crate::context::SkillContext;
use crate::domains::{chain_or, paging, proposal_id_arg, run_tool, send_call, view_call, SendInput, ToolOutput};
use crate::http::RequestOptions;
use crate::result::{require_text, require_value, SkillError, SkillResult, ToolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum DaoProposalMethod {
    CreateProposal,
    CreateTransferProposal,
    CreateVetoProposal,
}

impl DaoProposalMethod {
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateProposal => "CreateProposal",
            Self::CreateTransferProposal => "CreateTransferProposal",
            Self::CreateVetoProposal => "CreateVetoProposal",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateMetadataInput {
    pub chain_id: Option<String>,
    pub dao_id: String,
    pub metadata: Value,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploadFilesInput {
    pub chain_id: Option<String>,
    pub dao_id: String,
    pub files: Vec<Value>,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoveFilesInput {
    pub chain_id: Option<String>,
    pub dao_id: String,
    pub file_cids: Vec<String>,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalCreateInput {
    pub chain_id: Option<String>,
    pub method_name: Option<DaoProposalMethod>,
    pub args: Value,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecuteInput {
    pub chain_id: Option<String>,
    pub proposal_id: String,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscussionListInput {
    pub chain_id: Option<String>,
    pub proposal_id: Option<String>,
    pub alias: Option<String>,
    pub skip_count: Option<u64>,
    pub max_result_count: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscussionCommentInput {
    pub chain_id: Option<String>,
    pub comment: String,
    pub proposal_id: Option<String>,
    pub alias: Option<String>,
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalMyInfoInput {
    pub chain_id: Option<String>,
    pub proposal_id: String,
    pub address: String,
    pub dao_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllowanceInput {
    pub chain_id: Option<String>,
    pub symbol: String,
    pub owner: String,
    pub spender: String,
}

fn dao_chain(ctx: &SkillContext, requested: &Option<String>) -> ChainId {
    chain_or(requested, &ctx.config().chains.default_dao_chain)
}

async fn dao_send(
    ctx: &SkillContext,
    chain_id: &Option<String>,
    contract: ContractName,
    method: &str,
    args: Value,
    mode: ExecutionMode,
) -> SkillResult<ToolOutput> {
    let chain = dao_chain(ctx, chain_id);
    let address = ctx.contracts().require(chain.as_str(), contract)?.to_string();
    send_call(ctx, ContractCallRequest::new(chain, address, method, args), mode).await
}

pub async fn create(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool("dao_create", async move {
        require_value(&input.args, "args")?;
        dao_send(ctx, &input.chain_id, ContractName::Dao, "CreateDAO", input.args, input.mode).await
    })
    .await
}

pub async fn update_metadata(ctx: &SkillContext, input: UpdateMetadataInput) -> ToolResult<Value> {
    run_tool("dao_update_metadata", async move {
        require_text(&input.dao_id, "daoId")?;
        require_value(&input.metadata, "metadata")?;
        let args = json!({ "daoId": input.dao_id, "metadata": input.metadata });
        dao_send(ctx, &input.chain_id, ContractName::Dao, "UpdateMetadata", args, input.mode).await
    })
    .await
}

pub async fn upload_files(ctx: &SkillContext, input: UploadFilesInput) -> ToolResult<Value> {
    run_tool("dao_upload_files", async move {
        require_text(&input.dao_id, "daoId")?;
        if input.files.is_empty() {
            return Err(SkillError::invalid_input("files must be a non-empty array"));
        }
        let args = json!({ "daoId": input.dao_id, "files": input.files });
        dao_send(ctx, &input.chain_id, ContractName::Dao, "UploadFileInfos", args, input.mode).await
    })
    .await
}

pub async fn remove_files(ctx: &SkillContext, input: RemoveFilesInput) -> ToolResult<Value> {
    run_tool("dao_remove_files", async move {
        require_text(&input.dao_id, "daoId")?;
        if input.file_cids.is_empty() {
            return Err(SkillError::invalid_input("fileCids must be a non-empty array"));
        }
        let args = json!({ "daoId": input.dao_id, "fileCids": input.file_cids });
        dao_send(ctx, &input.chain_id, ContractName::Dao, "RemoveFileInfos", args, input.mode).await
    })
    .await
}

pub async fn proposal_create(ctx: &SkillContext, input: ProposalCreateInput) -> ToolResult<Value> {
    run_tool("dao_proposal_create", async move {
        let method = input
            .method_name
            .ok_or_else(|| SkillError::invalid_input("methodName is required"))?;
        require_value(&input.args, "args")?;
        dao_send(ctx, &input.chain_id, ContractName::Proposal, method.method(), input.args, input.mode).await
    })
    .await
}

pub async fn vote(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool("dao_vote", async move {
        require_value(&input.args, "args")?;
        dao_send(ctx, &input.chain_id, ContractName::Vote, "Vote", input.args, input.mode).await
    })
    .await
}

pub async fn withdraw(ctx: &SkillContext, input: SendInput) -> ToolResult<Value> {
    run_tool("dao_withdraw", async move {
        require_value(&input.args, "args")?;
        dao_send(ctx, &input.chain_id, ContractName::Vote, "Withdraw", input.args, input.mode).await
    })
    .await
}

pub async fn execute(ctx: &SkillContext, input: ExecuteInput) -> ToolResult<Value> {
    run_tool("dao_execute", async move {
        let args = proposal_id_arg(&input.proposal_id)?;
        dao_send(ctx, &input.chain_id, ContractName::Proposal, "ExecuteProposal", args, input.mode).await
    })
    .await
}

pub async fn discussion_list(ctx: &SkillContext, input: DiscussionListInput) -> ToolResult<Value> {
    run_tool("dao_discussion_list", async move {
        let (skip, max) = paging(input.skip_count, input.max_result_count);
        let query = json!({
            "chainId": dao_chain(ctx, &input.chain_id),
            "proposalId": input.proposal_id,
            "alias": input.alias,
            "skipCount": skip,
            "maxResultCount": max,
        });
        let data = ctx
            .api()
            .get("/discussion/comment-list", Some(&query), RequestOptions::default())
            .await?;
        Ok((data, None))
    })
    .await
}

pub async fn discussion_comment(ctx: &SkillContext, input: DiscussionCommentInput) -> ToolResult<Value> {
    run_tool("dao_discussion_comment", async move {
        require_text(&input.comment, "comment")?;
        let body = json!({
            "chainId": dao_chain(ctx, &input.chain_id),
            "proposalId": input.proposal_id,
            "alias": input.alias,
            "comment": input.comment,
            "parentId": input.parent_id,
        });
        let data = ctx
            .api()
            .post("/discussion/new-comment", &body, RequestOptions::authenticated())
            .await?;
        Ok((data, None))
    })
    .await
}

/// The caller's own participation in a proposal. Authenticated.
pub async fn proposal_my_info(ctx: &SkillContext, input: ProposalMyInfoInput) -> ToolResult<Value> {
    run_tool("dao_proposal_my_info", async move {
        require_text(&input.proposal_id, "proposalId")?;
        require_text(&input.address, "address")?;
        require_text(&input.dao_id, "daoId")?;
        let query = json!({
            "chainId": dao_chain(ctx, &input.chain_id),
            "proposalId": input.proposal_id,
            "address": input.address,
            "daoId": input.dao_id,
        });
        let data = ctx
            .api()
            .get("/proposal/my-info", Some(&query), RequestOptions::authenticated())
            .await?;
        Ok((data, None))
    })
    .await
}

/// `Token.GetAllowance` on the DAO chain. A null result reads as `{}`.
pub async fn token_allowance(ctx: &SkillContext, input: AllowanceInput) -> ToolResult<Value> {
    run_tool("dao_token_allowance", async move {
        require_text(&input.symbol, "symbol")?;
        require_text(&input.owner, "owner")?;
        require_text(&input.spender, "spender")?;
        let chain = dao_chain(ctx, &input.chain_id);
        let token = ctx.contracts().token_contract(chain.as_str())?.to_string();
        let args = json!({
            "symbol": input.symbol,
            "owner": input.owner,
            "spender": input.spender,
        });
        let (data, _) = view_call(ctx, ContractCallRequest::new(chain, token, "GetAllowance", args)).await?;
        Ok((if data.is_null() { json!({}) } else { data }, None))
    })
    .await
}
