//! Resource-Manager Registry
//!
//! Holds the client object able to execute operations for each resource
//! kind. The registry is filled during startup and then handed to a
//! [`Dispatcher`](super::Dispatcher), after which it is only read.

use super::kind::ResourceKind;
use crate::cloud::auth::Session;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Body/query parameters of a remote call
pub type Params = serde_json::Map<String, Value>;

/// One page of a list call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResult {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Client capabilities for one resource kind
///
/// Errors the remote API can describe should carry a
/// [`ClientError`](super::ClientError) somewhere in their chain so the
/// dispatcher can classify them.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    async fn create(&self, session: &Session, params: &Params) -> Result<Value>;

    async fn get(&self, session: &Session, id: &str, params: &Params) -> Result<Value>;

    async fn list(&self, session: &Session, params: &Params) -> Result<ListResult>;

    async fn update(&self, session: &Session, id: &str, params: &Params) -> Result<Value>;

    async fn delete_with_params(
        &self,
        session: &Session,
        id: &str,
        params: &Params,
        extra: Option<&Params>,
    ) -> Result<Value>;

    async fn get_specific(
        &self,
        session: &Session,
        id: &str,
        spec: &str,
        params: &Params,
    ) -> Result<Value>;

    async fn perform_action(
        &self,
        session: &Session,
        id: &str,
        action: &str,
        params: &Params,
    ) -> Result<Value>;
}

/// Resource kind → manager
#[derive(Clone, Default)]
pub struct ManagerRegistry {
    managers: HashMap<ResourceKind, Arc<dyn ResourceManager>>,
}

impl ManagerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `manager` under `kind`, replacing any earlier registration
    pub fn register(&mut self, kind: ResourceKind, manager: Arc<dyn ResourceManager>) {
        if self.managers.insert(kind, manager).is_some() {
            tracing::debug!("Manager for {} replaced", kind);
        }
    }

    pub fn lookup(&self, kind: ResourceKind) -> Option<Arc<dyn ResourceManager>> {
        self.managers.get(&kind).cloned()
    }

    /// Registered kinds, sorted
    pub fn registered(&self) -> Vec<ResourceKind> {
        let mut kinds: Vec<_> = self.managers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.managers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.managers.is_empty()
    }
}

impl std::fmt::Debug for ManagerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagerRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}
