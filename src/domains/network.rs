//! Network DAO governance: Parliament, Association and Referendum proposals,
//! organizations, and the contract deployment flow on the Genesis contract.
//!
//! Main chain only.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::blockchain::types::{ChainId, ContractCallRequest, ExecutionMode};
use crate::config::contracts::{ContractName, ProposalContractType};
use crate::context::SkillContext;
use crate::domains::{chain_or, ensure_main_chain, paging, proposal_id_arg, run_tool, send_call, ToolOutput};
use crate::http::RequestOptions;
use crate::result::{require_text, require_value, SkillError, SkillResult, ToolResult};

const DOMAIN: &str = "network governance";

/// Threshold scale of Parliament organizations (100% = 10000).
const PARLIAMENT_SCALE: f64 = 10000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum VoteAction {
    Approve,
    Reject,
    Abstain,
    Release,
}

impl VoteAction {
    pub fn method(&self) -> &'static str {
        match self {
            Self::Approve => "Approve",
            Self::Reject => "Reject",
            Self::Abstain => "Abstain",
            Self::Release => "Release",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ContractFlowAction {
    ProposeNewContract,
    ProposeUpdateContract,
    DeployUserSmartContract,
    UpdateUserSmartContract,
}

impl ContractFlowAction {
    pub fn method(&self) -> &'static str {
        match self {
            Self::ProposeNewContract => "ProposeNewContract",
            Self::ProposeUpdateContract => "ProposeUpdateContract",
            Self::DeployUserSmartContract => "DeployUserSmartContract",
            Self::UpdateUserSmartContract => "UpdateUserSmartContract",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ContractReleaseMethod {
    ReleaseApprovedContract,
    ReleaseCodeCheckedContract,
}

impl ContractReleaseMethod {
    pub fn method(&self) -> &'static str {
        match self {
            Self::ReleaseApprovedContract => "ReleaseApprovedContract",
            Self::ReleaseCodeCheckedContract => "ReleaseCodeCheckedContract",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListInput {
    pub chain_id: Option<String>,
    pub skip_count: Option<u64>,
    pub max_result_count: Option<u64>,
    pub proposal_type: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalGetInput {
    pub chain_id: Option<String>,
    pub proposal_id: String,
}

/// Input for `proposal_create` and `organization_create`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalSendInput {
    pub chain_id: Option<String>,
    /// Parliament when absent.
    pub proposal_type: Option<ProposalContractType>,
    pub args: Value,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProposalVoteInput {
    pub chain_id: Option<String>,
    pub proposal_type: Option<ProposalContractType>,
    pub proposal_id: String,
    pub action: Option<VoteAction>,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractNameCheckInput {
    pub chain_id: Option<String>,
    pub contract_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractNameAddInput {
    pub chain_id: Option<String>,
    pub operate_chain_id: String,
    pub contract_name: String,
    pub tx_id: String,
    pub action: Option<i64>,
    pub address: String,
    pub proposal_id: Option<String>,
    pub create_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractNameUpdateInput {
    pub chain_id: Option<String>,
    pub operate_chain_id: Option<String>,
    pub contract_name: String,
    pub address: String,
    pub contract_address: String,
    pub ca_hash: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractFlowStartInput {
    pub chain_id: Option<String>,
    pub action: Option<ContractFlowAction>,
    pub args: Value,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractFlowReleaseInput {
    pub chain_id: Option<String>,
    pub method_name: Option<ContractReleaseMethod>,
    pub proposal_id: String,
    pub proposed_contract_input_hash: String,
    pub mode: ExecutionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContractFlowStatusInput {
    pub chain_id: Option<String>,
    pub proposal_id: Option<String>,
    pub code_hash: Option<String>,
}

fn network_chain(ctx: &SkillContext, requested: &Option<String>) -> ChainId {
    chain_or(requested, &ctx.config().chains.default_network_chain)
}

fn main_chain(ctx: &SkillContext, requested: &Option<String>) -> SkillResult<ChainId> {
    let chain = network_chain(ctx, requested);
    ensure_main_chain(&chain, DOMAIN)?;
    Ok(chain)
}

fn required<T>(value: Option<T>, name: &str) -> SkillResult<T> {
    value.ok_or_else(|| SkillError::invalid_input(format!("{} is required", name)))
}

/// `Number(x || 0)`: numbers as-is, numeric strings parsed, anything else zero.
/// A non-numeric string yields NaN, which fails no comparison.
fn threshold(t: &Value, key: &str) -> f64 {
    match t.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) if !s.is_empty() => s.trim().parse().unwrap_or(f64::NAN),
        Some(Value::Bool(true)) => 1.0,
        _ => 0.0,
    }
}

/// Check `proposalReleaseThreshold` against the organization type's rules.
///
/// Parliament thresholds are on the 10000 scale; Association thresholds are
/// literal member counts; Referendum only checks approval against vote.
pub fn validate_organization_thresholds(kind: ProposalContractType, args: &Value) -> SkillResult<()> {
    let t = args.get("proposalReleaseThreshold").cloned().unwrap_or(Value::Null);

    let min_approval = threshold(&t, "minimalApprovalThreshold");
    let max_rejection = threshold(&t, "maximalRejectionThreshold");
    let max_abstention = threshold(&t, "maximalAbstentionThreshold");
    let min_vote = threshold(&t, "minimalVoteThreshold");

    if min_approval > min_vote {
        return Err(SkillError::invalid_input(
            "Minimal Approval Threshold must be less than or equal to Minimal Vote Threshold",
        ));
    }

    match kind {
        ProposalContractType::Parliament => {
            if min_approval + max_abstention > PARLIAMENT_SCALE {
                return Err(SkillError::invalid_input(
                    "Maximal Abstention Threshold + Minimal Approval Threshold must be <= 100%",
                ));
            }
            if min_approval + max_rejection > PARLIAMENT_SCALE {
                return Err(SkillError::invalid_input(
                    "Maximal Rejection Threshold + Minimal Approval Threshold must be <= 100%",
                ));
            }
        }
        ProposalContractType::Association => {
            let members = args
                .pointer("/organizationMemberList/organizationMembers")
                .and_then(Value::as_array)
                .map_or(0, Vec::len) as f64;
            if min_vote > members {
                return Err(SkillError::invalid_input(
                    "Minimal Vote Threshold must be <= organization member count",
                ));
            }
            if min_approval + max_abstention > members {
                return Err(SkillError::invalid_input(
                    "Maximal Abstention Threshold + Minimal Approval Threshold must be <= organization member count",
                ));
            }
            if min_approval + max_rejection > members {
                return Err(SkillError::invalid_input(
                    "Maximal Rejection Threshold + Minimal Approval Threshold must be <= organization member count",
                ));
            }
        }
        ProposalContractType::Referendum => {}
    }

    Ok(())
}

pub async fn proposals_list(ctx: &SkillContext, input: ListInput) -> ToolResult<Value> {
    run_tool("network_proposals_list", async move {
        let (skip, max) = paging(input.skip_count, input.max_result_count);
        let query = json!({
            "chainId": network_chain(ctx, &input.chain_id),
            "skipCount": skip,
            "maxResultCount": max,
            "proposalType": input.proposal_type,
        });
        let data = ctx
            .api()
            .get("/networkdao/proposals", Some(&query), RequestOptions::default())
            .await?;
        Ok((data, None))
    })
    .await
}

pub async fn proposal_get(ctx: &SkillContext, input: ProposalGetInput) -> ToolResult<Value> {
    run_tool("network_proposal_get", async move {
        require_text(&input.proposal_id, "proposalId")?;
        let query = json!({
            "chainId": network_chain(ctx, &input.chain_id),
            "proposalId": input.proposal_id,
        });
        let data = ctx
            .api()
            .get("/networkdao/proposal/info", Some(&query), RequestOptions::default())
            .await?;
        Ok((data, None))
    })
    .await
}

async fn proposal_contract_send(
    ctx: &SkillContext,
    chain_id: &Option<String>,
    kind: ProposalContractType,
    method: &str,
    args: Value,
    mode: ExecutionMode,
) -> SkillResult<ToolOutput> {
    let chain = main_chain(ctx, chain_id)?;
    let contract = ctx.contracts().proposal_contract(chain.as_str(), kind)?.to_string();
    send_call(ctx, ContractCallRequest::new(chain, contract, method, args), mode).await
}

pub async fn proposal_create(ctx: &SkillContext, input: ProposalSendInput) -> ToolResult<Value> {
    run_tool("network_proposal_create", async move {
        let kind = input.proposal_type.unwrap_or_default();
        require_value(&input.args, "args")?;
        proposal_contract_send(ctx, &input.chain_id, kind, "CreateProposal", input.args, input.mode).await
    })
    .await
}

pub async fn proposal_vote(ctx: &SkillContext, input: ProposalVoteInput) -> ToolResult<Value> {
    run_tool("network_proposal_vote", async move {
        let kind = input.proposal_type.unwrap_or_default();
        let action = required(input.action, "action")?;
        let args = proposal_id_arg(&input.proposal_id)?;
        proposal_contract_send(ctx, &input.chain_id, kind, action.method(), args, input.mode).await
    })
    .await
}

/// `proposal_vote` with the `Release` action.
pub async fn proposal_release(ctx: &SkillContext, mut input: ProposalVoteInput) -> ToolResult<Value> {
    input.action = Some(VoteAction::Release);
    proposal_vote(ctx, input).await
}

pub async fn organization_create(ctx: &SkillContext, input: ProposalSendInput) -> ToolResult<Value> {
    run_tool("network_organization_create", async move {
        let kind = input.proposal_type.unwrap_or_default();
        require_value(&input.args, "args")?;
        validate_organization_thresholds(kind, &input.args)?;
        proposal_contract_send(ctx, &input.chain_id, kind, "CreateOrganization", input.args, input.mode).await
    })
    .await
}

pub async fn organizations_list(ctx: &SkillContext, input: ListInput) -> ToolResult<Value> {
    run_tool("network_organizations_list", async move {
        let (skip, max) = paging(input.skip_count, input.max_result_count);
        let query = json!({
            "chainId": network_chain(ctx, &input.chain_id),
            "proposalType": input.proposal_type,
            "skipCount": skip,
            "maxResultCount": max,
        });
        let data = ctx.api().get("/networkdao/org", Some(&query), RequestOptions::default()).await?;
        Ok((data, None))
    })
    .await
}

pub async fn contract_name_check(ctx: &SkillContext, input: ContractNameCheckInput) -> ToolResult<Value> {
    run_tool("network_contract_name_check", async move {
        require_text(&input.contract_name, "contractName")?;
        let query = json!({
            "chainId": network_chain(ctx, &input.chain_id),
            "contractName": input.contract_name,
        });
        let data = ctx
            .api()
            .get("/networkdao/contract/check", Some(&query), RequestOptions::default())
            .await?;
        Ok((data, None))
    })
    .await
}

pub async fn contract_name_add(ctx: &SkillContext, input: ContractNameAddInput) -> ToolResult<Value> {
    run_tool("network_contract_name_add", async move {
        require_text(&input.operate_chain_id, "operateChainId")?;
        require_text(&input.contract_name, "contractName")?;
        require_text(&input.tx_id, "txId")?;
        require_text(&input.address, "address")?;
        let action = required(input.action, "action")?;
        let body = json!({
            "chainId": network_chain(ctx, &input.chain_id),
            "operateChainId": input.operate_chain_id,
            "contractName": input.contract_name,
            "txId": input.tx_id,
            "action": action,
            "address": input.address,
            "proposalId": input.proposal_id,
            "createAt": input.create_at,
        });
        let data = ctx
            .api()
            .post("/networkdao/contract/add", &body, RequestOptions::authenticated())
            .await?;
        Ok((data, None))
    })
    .await
}

pub async fn contract_name_update(ctx: &SkillContext, input: ContractNameUpdateInput) -> ToolResult<Value> {
    run_tool("network_contract_name_update", async move {
        require_text(&input.contract_name, "contractName")?;
        require_text(&input.address, "address")?;
        require_text(&input.contract_address, "contractAddress")?;
        let body = json!({
            "chainId": network_chain(ctx, &input.chain_id),
            "operateChainId": input.operate_chain_id,
            "contractName": input.contract_name,
            "address": input.address,
            "contractAddress": input.contract_address,
            "caHash": input.ca_hash,
        });
        let data = ctx
            .api()
            .post("/networkdao/contract/update", &body, RequestOptions::authenticated())
            .await?;
        Ok((data, None))
    })
    .await
}

fn genesis(ctx: &SkillContext, chain: &ChainId) -> SkillResult<String> {
    Ok(ctx.contracts().require(chain.as_str(), ContractName::Genesis)?.to_string())
}

pub async fn contract_flow_start(ctx: &SkillContext, input: ContractFlowStartInput) -> ToolResult<Value> {
    run_tool("network_contract_flow_start", async move {
        let action = required(input.action, "action")?;
        require_value(&input.args, "args")?;
        let chain = main_chain(ctx, &input.chain_id)?;
        let contract = genesis(ctx, &chain)?;
        let request = ContractCallRequest::new(chain, contract, action.method(), input.args);
        send_call(ctx, request, input.mode).await
    })
    .await
}

pub async fn contract_flow_release(ctx: &SkillContext, input: ContractFlowReleaseInput) -> ToolResult<Value> {
    run_tool("network_contract_flow_release", async move {
        let method = required(input.method_name, "methodName")?;
        require_text(&input.proposal_id, "proposalId")?;
        require_text(&input.proposed_contract_input_hash, "proposedContractInputHash")?;
        let chain = main_chain(ctx, &input.chain_id)?;
        let contract = genesis(ctx, &chain)?;
        let args = json!({
            "proposalId": input.proposal_id,
            "proposedContractInputHash": input.proposed_contract_input_hash,
        });
        let request = ContractCallRequest::new(chain, contract, method.method(), args);
        send_call(ctx, request, input.mode).await
    })
    .await
}

/// Proposal state and code registration side by side. A failed or skipped
/// lookup reports `null` rather than failing the tool.
pub async fn contract_flow_status(ctx: &SkillContext, input: ContractFlowStatusInput) -> ToolResult<Value> {
    run_tool("network_contract_flow_status", async move {
        let chain = main_chain(ctx, &input.chain_id)?;
        let parliament = ctx.contracts().require(chain.as_str(), ContractName::Parliament)?.to_string();
        let genesis = genesis(ctx, &chain)?;

        let proposal = async {
            match input.proposal_id.as_deref().filter(|id| !id.is_empty()) {
                Some(id) => {
                    let request =
                        ContractCallRequest::new(chain.clone(), parliament.as_str(), "GetProposal", json!(id));
                    lookup(ctx, request).await
                }
                None => None,
            }
        };
        let registration = async {
            match input.code_hash.as_deref().filter(|h| !h.is_empty()) {
                Some(hash) => {
                    let request = ContractCallRequest::new(
                        chain.clone(),
                        genesis.as_str(),
                        "GetSmartContractRegistrationByCodeHash",
                        json!({ "value": hash }),
                    );
                    lookup(ctx, request).await
                }
                None => None,
            }
        };

        let (proposal_status, registration_status) = tokio::join!(proposal, registration);
        Ok((
            json!({
                "proposalStatus": proposal_status,
                "registrationStatus": registration_status,
            }),
            None,
        ))
    })
    .await
}

async fn lookup(ctx: &SkillContext, request: ContractCallRequest) -> Option<Value> {
    match ctx.chain().call_view(&request).await {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(method = %request.method_name, code = e.code(), "Status lookup failed");
            None
        }
    }
}
