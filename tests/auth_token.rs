//! Token exchange and caching against a mock token endpoint.

use serde_json::{json, Value};

use tmrwdao_skill::auth::TokenCache;
use tmrwdao_skill::blockchain::Wallet;
use tmrwdao_skill::domains::chain;
use tmrwdao_skill::SkillContext;

mod common;

async fn token_backend(token: &'static str) -> common::MockBackend {
    common::start_programmable_backend(move |request| async move {
        if request.path_only() == "/connect/token" {
            (200, common::token_body(token))
        } else {
            (404, "{}".to_string())
        }
    })
    .await
}

#[tokio::test]
async fn test_token_cached_between_calls() {
    let backend = token_backend("tok-a").await;
    let config = common::config_for(&backend);
    let cache = TokenCache::new(&config, common::test_client());

    let first = cache.get_access_token(false).await.unwrap();
    let second = cache.get_access_token(false).await.unwrap();

    assert_eq!(first.access_token, "tok-a");
    assert_eq!(first, second);
    assert_eq!(backend.hits("/connect/token"), 1);
}

#[tokio::test]
async fn test_force_refresh_exchanges_again() {
    let backend = token_backend("tok-b").await;
    let cache = TokenCache::new(&common::config_for(&backend), common::test_client());

    cache.get_access_token(false).await.unwrap();
    cache.get_access_token(true).await.unwrap();

    assert_eq!(backend.hits("/connect/token"), 2);
}

#[tokio::test]
async fn test_token_inside_expiry_margin_is_refreshed() {
    let backend = common::start_mock_backend(
        200,
        r#"{"access_token":"tok-short","token_type":"Bearer","expires_in":30}"#,
    )
    .await;
    let cache = TokenCache::new(&common::config_for(&backend), common::test_client());

    let first = cache.get_access_token(false).await.unwrap();
    assert!(!first.is_valid());
    cache.get_access_token(false).await.unwrap();

    assert_eq!(backend.hits("/connect/token"), 2);
}

#[tokio::test]
async fn test_exchange_form_fields() {
    let backend = token_backend("tok-c").await;
    let cache = TokenCache::new(&common::config_for(&backend), common::test_client());
    cache.get_access_token(false).await.unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.method, "POST");
    assert!(request
        .header("content-type")
        .unwrap()
        .starts_with("application/x-www-form-urlencoded"));

    let form = request.form();
    let wallet = Wallet::from_private_key(common::TEST_PRIVATE_KEY).unwrap();
    assert_eq!(form["grant_type"], "signature");
    assert_eq!(form["scope"], "TomorrowDAOServer");
    assert_eq!(form["client_id"], "TomorrowDAOServer_App");
    assert_eq!(form["source"], "nightElf");
    assert_eq!(form["chain_id"], "AELF");
    assert_eq!(form["address"], wallet.address());
    assert_eq!(form["publickey"], wallet.public_key());
    assert_eq!(form["signature"].len(), 130);
    assert!(form["timestamp"].parse::<u64>().is_ok());
    assert!(!form.contains_key("ca_hash"));
}

#[tokio::test]
async fn test_ca_hash_forwarded_when_configured() {
    let backend = token_backend("tok-d").await;
    let mut config = common::config_for(&backend);
    config.api.ca_hash = Some("ca-123".to_string());
    let cache = TokenCache::new(&config, common::test_client());
    cache.get_access_token(false).await.unwrap();

    assert_eq!(backend.requests()[0].form()["ca_hash"], "ca-123");
}

#[tokio::test]
async fn test_rejected_exchange_is_http_error() {
    let backend = common::start_mock_backend(401, r#"{"error":"invalid_grant"}"#).await;
    let cache = TokenCache::new(&common::config_for(&backend), common::test_client());

    let err = cache.get_access_token(false).await.unwrap_err();
    assert_eq!(err.code(), "AUTH_HTTP_ERROR");
    assert_eq!(err.details(), Some(json!(r#"{"error":"invalid_grant"}"#)));
    assert!(cache.cached().is_none());
}

#[tokio::test]
async fn test_nested_token_response() {
    let backend = common::start_mock_backend(
        200,
        r#"{"code":"20000","data":{"access_token":"tok-e","token_type":"Bearer","expires_in":"120"}}"#,
    )
    .await;
    let cache = TokenCache::new(&common::config_for(&backend), common::test_client());

    let token = cache.get_access_token(false).await.unwrap();
    assert_eq!(token.authorization_header(), "Bearer tok-e");
    assert_eq!(token.expires_in, 120);
}

#[tokio::test]
async fn test_invalid_response_redacts_token() {
    let backend = common::start_mock_backend(200, r#"{"access_token":"secret-tok"}"#).await;
    let cache = TokenCache::new(&common::config_for(&backend), common::test_client());

    let err = cache.get_access_token(false).await.unwrap_err();
    assert_eq!(err.code(), "AUTH_RESPONSE_INVALID");
    let details = err.details().unwrap().to_string();
    assert!(!details.contains("secret-tok"));
}

#[tokio::test]
async fn test_token_tool_reports_metadata_only() {
    let backend = token_backend("tok-f").await;
    let ctx = SkillContext::with_http_client(common::config_for(&backend), common::test_client()).unwrap();

    let result = chain::token_status(&ctx, false).await;
    assert!(result.success);
    let data: Value = result.data.unwrap();
    assert_eq!(data["tokenType"], "Bearer");
    assert_eq!(data["expiresIn"], 3600);
    assert_eq!(data["valid"], true);
    assert!(!data.to_string().contains("tok-f"));

    ctx.reset();
    assert!(ctx.tokens().cached().is_none());
}
