//! Controller implementations for watching and reconciling resources

pub mod guestbook_controller;

use kube::Client;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::adapters::{EntryStore, KubeStore};
use crate::config::OperatorConfig;

/// Shared context for controllers
pub struct Context {
    /// Object store the reconciler reads and writes through
    pub store: Arc<dyn EntryStore>,
    /// Operator settings
    pub config: OperatorConfig,
    /// Cancelled on shutdown; aborts in-flight store calls
    pub shutdown: CancellationToken,
}

impl Context {
    /// Create a new context backed by the Kubernetes API server
    pub fn new(client: Client, config: OperatorConfig) -> Arc<Self> {
        Self::with_store(Arc::new(KubeStore::new(client)), config)
    }

    /// Create a context around an arbitrary store
    pub fn with_store(store: Arc<dyn EntryStore>, config: OperatorConfig) -> Arc<Self> {
        Arc::new(Self {
            store,
            config,
            shutdown: CancellationToken::new(),
        })
    }
}
