//! Application context.
//!
//! Owns everything with process-wide state (the node client pool and the
//! token slot) so that each test, or each embedding, builds its own
//! independent instance instead of sharing hidden globals.

use std::sync::Arc;

use crate::auth::TokenCache;
use crate::blockchain::{ChainCaller, ContractRegistry, NodeFactory, RpcClientPool};
use crate::config::{ConfigError, ContractBook, SkillConfig};
use crate::http::ApiClient;

pub struct SkillContext {
    config: Arc<SkillConfig>,
    contracts: ContractBook,
    tokens: Arc<TokenCache>,
    api: ApiClient,
    chain: ChainCaller,
}

impl SkillContext {
    pub fn new(config: SkillConfig) -> Result<Self, ConfigError> {
        Self::with_http_client(config, reqwest::Client::new())
    }

    /// Configuration from `TMRW_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(SkillConfig::from_env()?)
    }

    /// Context sharing `client` between the REST client, token exchange and chain nodes.
    pub fn with_http_client(config: SkillConfig, client: reqwest::Client) -> Result<Self, ConfigError> {
        let pool = RpcClientPool::http(
            config.chains.rpc_pool_max,
            config.chains.rpc_timeout(),
            client.clone(),
        );
        Self::build(config, client, pool)
    }

    /// Context whose chain node clients come from `factory`.
    pub fn with_node_factory(
        config: SkillConfig,
        client: reqwest::Client,
        factory: NodeFactory,
    ) -> Result<Self, ConfigError> {
        let pool = RpcClientPool::new(config.chains.rpc_pool_max, factory);
        Self::build(config, client, pool)
    }

    fn build(config: SkillConfig, client: reqwest::Client, pool: RpcClientPool) -> Result<Self, ConfigError> {
        let contracts = config.contract_book()?;
        let registry = ContractRegistry::from_book(&contracts);
        let tokens = Arc::new(TokenCache::new(&config, client.clone()));
        let api = ApiClient::new(&config, client, tokens.clone());
        let chain = ChainCaller::new(&config, registry, pool);

        tracing::debug!(
            api_base = %config.api.api_base,
            chains = ?config.chains.rpc.keys().collect::<Vec<_>>(),
            rpc_pool_max = config.chains.rpc_pool_max,
            "Context initialized"
        );

        Ok(Self {
            config: Arc::new(config),
            contracts,
            tokens,
            api,
            chain,
        })
    }

    pub fn config(&self) -> &SkillConfig {
        &self.config
    }

    pub fn contracts(&self) -> &ContractBook {
        &self.contracts
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn chain(&self) -> &ChainCaller {
        &self.chain
    }

    /// Drop cached node clients and the cached token.
    pub fn reset(&self) {
        self.chain.pool().clear();
        self.tokens.clear();
    }
}

impl std::fmt::Debug for SkillContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkillContext")
            .field("config", &self.config)
            .field("chain", &self.chain)
            .finish()
    }
}
