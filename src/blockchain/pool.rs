//! Bounded cache of chain node clients keyed by RPC URL.
//!
//! # Responsibilities
//! - Hand out one shared client per distinct RPC URL
//! - Evict the oldest-inserted entry when full (insertion order, not LRU)
//! - Never perform I/O: client construction only captures connection parameters
//!
//! The get-or-insert-or-evict sequence runs under one lock with no await
//! point inside, so concurrent callers never observe two clients for a URL.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::blockchain::client::{ChainNode, HttpChainNode};
use crate::observability::metrics;

/// Builds a client for an RPC URL.
pub type NodeFactory = Arc<dyn Fn(&str) -> Arc<dyn ChainNode> + Send + Sync>;

#[derive(Default)]
struct PoolState {
    clients: HashMap<String, Arc<dyn ChainNode>>,
    order: VecDeque<String>,
}

pub struct RpcClientPool {
    max_size: usize,
    factory: NodeFactory,
    state: Mutex<PoolState>,
}

impl RpcClientPool {
    /// Pool with a custom client factory. `max_size` is floored at 1.
    pub fn new(max_size: usize, factory: NodeFactory) -> Self {
        Self {
            max_size: max_size.max(1),
            factory,
            state: Mutex::new(PoolState::default()),
        }
    }

    /// Pool of [`HttpChainNode`]s sharing one HTTP client.
    pub fn http(max_size: usize, timeout: Duration, client: reqwest::Client) -> Self {
        let factory: NodeFactory = Arc::new(move |url: &str| {
            Arc::new(HttpChainNode::new(url, timeout, client.clone())) as Arc<dyn ChainNode>
        });
        Self::new(max_size, factory)
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // Entries are plain Arcs; a panic elsewhere cannot leave them half-written.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached client for `rpc_url`, creating it on a miss.
    pub fn get(&self, rpc_url: &str) -> Arc<dyn ChainNode> {
        let mut state = self.lock();
        if let Some(client) = state.clients.get(rpc_url) {
            return client.clone();
        }

        if state.clients.len() >= self.max_size {
            if let Some(oldest) = state.order.pop_front() {
                state.clients.remove(&oldest);
                tracing::debug!(rpc_url = %oldest, "Evicted chain client");
            }
        }

        let client = (self.factory)(rpc_url);
        state.clients.insert(rpc_url.to_string(), client.clone());
        state.order.push_back(rpc_url.to_string());
        metrics::set_rpc_pool_size(state.clients.len());
        tracing::debug!(rpc_url = %rpc_url, size = state.clients.len(), "Created chain client");
        client
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.clients.clear();
        state.order.clear();
        metrics::set_rpc_pool_size(0);
    }

    pub fn len(&self) -> usize {
        self.lock().clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, rpc_url: &str) -> bool {
        self.lock().clients.contains_key(rpc_url)
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl std::fmt::Debug for RpcClientPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClientPool")
            .field("max_size", &self.max_size)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::client::ContractCall;
    use crate::blockchain::types::BlockchainResult;
    use crate::blockchain::wallet::Wallet;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubNode {
        url: String,
    }

    #[async_trait]
    impl ChainNode for StubNode {
        fn endpoint(&self) -> &str {
            &self.url
        }

        async fn execute(&self, _call: &ContractCall, _wallet: &Wallet) -> BlockchainResult<Value> {
            Ok(Value::Null)
        }

        async fn broadcast(&self, _call: &ContractCall, _wallet: &Wallet) -> BlockchainResult<Value> {
            Ok(Value::Null)
        }

        async fn transaction_result(&self, _tx_id: &str) -> BlockchainResult<Value> {
            Ok(Value::Null)
        }
    }

    fn counting_pool(max: usize) -> (RpcClientPool, Arc<AtomicUsize>) {
        let created = Arc::new(AtomicUsize::new(0));
        let counter = created.clone();
        let factory: NodeFactory = Arc::new(move |url: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(StubNode { url: url.to_string() }) as Arc<dyn ChainNode>
        });
        (RpcClientPool::new(max, factory), created)
    }

    #[test]
    fn test_hit_returns_same_client() {
        let (pool, created) = counting_pool(4);
        let a = pool.get("http://a");
        let b = pool.get("http://a");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(created.load(Ordering::SeqCst), 1);
        assert_eq!(a.endpoint(), "http://a");
    }

    #[test]
    fn test_evicts_oldest_inserted() {
        let (pool, _) = counting_pool(2);
        pool.get("http://a");
        pool.get("http://b");
        pool.get("http://c");
        assert_eq!(pool.len(), 2);
        assert!(!pool.contains("http://a"));
        assert!(pool.contains("http://b"));
        assert!(pool.contains("http://c"));
    }

    #[test]
    fn test_hit_does_not_refresh_order() {
        let (pool, _) = counting_pool(2);
        pool.get("http://a");
        pool.get("http://b");
        // A use-ordered cache would evict b here; insertion order evicts a.
        pool.get("http://a");
        pool.get("http://c");
        assert!(!pool.contains("http://a"));
        assert!(pool.contains("http://b"));
    }

    #[test]
    fn test_zero_capacity_floors_to_one() {
        let (pool, created) = counting_pool(0);
        assert_eq!(pool.max_size(), 1);
        pool.get("http://a");
        pool.get("http://b");
        assert_eq!(pool.len(), 1);
        assert!(pool.contains("http://b"));
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear_empties_pool() {
        let (pool, created) = counting_pool(4);
        let before = pool.get("http://a");
        pool.clear();
        assert!(pool.is_empty());
        let after = pool.get("http://a");
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(created.load(Ordering::SeqCst), 2);
    }
}
