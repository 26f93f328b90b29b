//! Name-based tool dispatch with JSON input, for the CLI and embedders.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;

use crate::context::SkillContext;
use crate::domains::{bp, dao, network, resource, run_tool, ToolOutput};
use crate::result::{SkillError, ToolResult};

/// Every dispatchable tool name.
pub const TOOL_NAMES: [&str; 41] = [
    "network-proposals",
    "network-proposal-get",
    "network-proposal-create",
    "network-proposal-vote",
    "network-proposal-release",
    "network-org-create",
    "network-orgs",
    "network-contract-check",
    "network-contract-add",
    "network-contract-update",
    "network-flow-start",
    "network-flow-release",
    "network-flow-status",
    "bp-apply",
    "bp-quit",
    "bp-vote",
    "bp-withdraw",
    "bp-change-vote",
    "bp-claim-profits",
    "bp-votes",
    "bp-team-desc",
    "bp-team-descs",
    "bp-team-desc-add",
    "bp-vote-reclaim",
    "resource-buy",
    "resource-sell",
    "resource-realtime-records",
    "resource-turnover",
    "resource-records",
    "dao-create",
    "dao-update-metadata",
    "dao-upload-files",
    "dao-remove-files",
    "dao-proposal-create",
    "dao-vote",
    "dao-withdraw",
    "dao-execute",
    "dao-discussions",
    "dao-comment",
    "dao-proposal-my-info",
    "dao-token-allowance",
];

async fn invoke<T, F, Fut>(name: &str, input: Value, tool: F) -> ToolResult<Value>
where
    T: DeserializeOwned,
    F: FnOnce(T) -> Fut,
    Fut: Future<Output = ToolResult<Value>>,
{
    match serde_json::from_value::<T>(input) {
        Ok(parsed) => tool(parsed).await,
        Err(e) => rejected(name, SkillError::invalid_input(format!("invalid input for {}: {}", name, e))).await,
    }
}

async fn rejected(name: &str, err: SkillError) -> ToolResult<Value> {
    run_tool(name, async move { Err::<ToolOutput, _>(err) }).await
}

/// Run the tool called `name`. A null input is read as `{}`.
pub async fn dispatch(ctx: &SkillContext, name: &str, input: Value) -> ToolResult<Value> {
    let input = if input.is_null() { Value::Object(Default::default()) } else { input };

    match name {
        "network-proposals" => invoke(name, input, |i| network::proposals_list(ctx, i)).await,
        "network-proposal-get" => invoke(name, input, |i| network::proposal_get(ctx, i)).await,
        "network-proposal-create" => invoke(name, input, |i| network::proposal_create(ctx, i)).await,
        "network-proposal-vote" => invoke(name, input, |i| network::proposal_vote(ctx, i)).await,
        "network-proposal-release" => invoke(name, input, |i| network::proposal_release(ctx, i)).await,
        "network-org-create" => invoke(name, input, |i| network::organization_create(ctx, i)).await,
        "network-orgs" => invoke(name, input, |i| network::organizations_list(ctx, i)).await,
        "network-contract-check" => invoke(name, input, |i| network::contract_name_check(ctx, i)).await,
        "network-contract-add" => invoke(name, input, |i| network::contract_name_add(ctx, i)).await,
        "network-contract-update" => invoke(name, input, |i| network::contract_name_update(ctx, i)).await,
        "network-flow-start" => invoke(name, input, |i| network::contract_flow_start(ctx, i)).await,
        "network-flow-release" => invoke(name, input, |i| network::contract_flow_release(ctx, i)).await,
        "network-flow-status" => invoke(name, input, |i| network::contract_flow_status(ctx, i)).await,

        "bp-apply" => invoke(name, input, |i| bp::apply(ctx, i)).await,
        "bp-quit" => invoke(name, input, |i| bp::quit(ctx, i)).await,
        "bp-vote" => invoke(name, input, |i| bp::vote(ctx, i)).await,
        "bp-withdraw" => invoke(name, input, |i| bp::withdraw(ctx, i)).await,
        "bp-change-vote" => invoke(name, input, |i| bp::change_vote(ctx, i)).await,
        "bp-claim-profits" => invoke(name, input, |i| bp::claim_profits(ctx, i)).await,
        "bp-votes" => invoke(name, input, |i| bp::votes_list(ctx, i)).await,
        "bp-team-desc" => invoke(name, input, |i| bp::team_desc_get(ctx, i)).await,
        "bp-team-descs" => invoke(name, input, |i| bp::team_desc_list(ctx, i)).await,
        "bp-team-desc-add" => invoke(name, input, |i| bp::team_desc_add(ctx, i)).await,
        "bp-vote-reclaim" => invoke(name, input, |i| bp::vote_reclaim(ctx, i)).await,

        "resource-buy" => invoke(name, input, |i| resource::buy(ctx, i)).await,
        "resource-sell" => invoke(name, input, |i| resource::sell(ctx, i)).await,
        "resource-realtime-records" => invoke(name, input, |i| resource::realtime_records(ctx, i)).await,
        "resource-turnover" => invoke(name, input, |i| resource::turnover(ctx, i)).await,
        "resource-records" => invoke(name, input, |i| resource::records(ctx, i)).await,

        "dao-create" => invoke(name, input, |i| dao::create(ctx, i)).await,
        "dao-update-metadata" => invoke(name, input, |i| dao::update_metadata(ctx, i)).await,
        "dao-upload-files" => invoke(name, input, |i| dao::upload_files(ctx, i)).await,
        "dao-remove-files" => invoke(name, input, |i| dao::remove_files(ctx, i)).await,
        "dao-proposal-create" => invoke(name, input, |i| dao::proposal_create(ctx, i)).await,
        "dao-vote" => invoke(name, input, |i| dao::vote(ctx, i)).await,
        "dao-withdraw" => invoke(name, input, |i| dao::withdraw(ctx, i)).await,
        "dao-execute" => invoke(name, input, |i| dao::execute(ctx, i)).await,
        "dao-discussions" => invoke(name, input, |i| dao::discussion_list(ctx, i)).await,
        "dao-comment" => invoke(name, input, |i| dao::discussion_comment(ctx, i)).await,
        "dao-proposal-my-info" => invoke(name, input, |i| dao::proposal_my_info(ctx, i)).await,
        "dao-token-allowance" => invoke(name, input, |i| dao::token_allowance(ctx, i)).await,

        other => rejected(other, SkillError::invalid_input(format!("unknown tool '{}'", other))).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::test_support::offline_context;
    use serde_json::json;

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let ctx = offline_context();
        let result = dispatch(&ctx, "resource-buy", json!({"symbol": "NET", "amount": 5})).await;
        assert!(result.success);
        assert_eq!(result.data.unwrap()["methodName"], "Buy");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let ctx = offline_context();
        let result = dispatch(&ctx, "dao-delete", Value::Null).await;
        let error = result.error.unwrap();
        assert_eq!(error.code, "INVALID_INPUT");
        assert_eq!(error.message, "unknown tool 'dao-delete'");
        assert!(result.trace_id.is_some());
    }

    #[tokio::test]
    async fn test_malformed_input_is_invalid_input() {
        let ctx = offline_context();
        let result = dispatch(&ctx, "network-proposal-vote", json!({"action": "Veto"})).await;
        assert_eq!(result.error.unwrap().code, "INVALID_INPUT");

        let result = dispatch(&ctx, "dao-upload-files", json!({"daoId": "d", "files": "nope"})).await;
        assert_eq!(result.error.unwrap().code, "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_every_name_dispatches() {
        let ctx = offline_context();
        for name in TOOL_NAMES {
            // Previews, input errors, or a fast failure against the closed local port.
            let result = dispatch(&ctx, name, json!({})).await;
            if let Some(error) = &result.error {
                assert_ne!(error.message, format!("unknown tool '{}'", name));
            }
        }
    }
}
