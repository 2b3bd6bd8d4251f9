//! Object store access for the reconciler
//!
//! The reconciler only needs a handful of primitives against the API server.
//! They live behind [`EntryStore`] so reconciliation can run against the real
//! cluster through [`KubeStore`] or against an in-memory store in tests.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client, ResourceExt};
use tracing::debug;

use crate::crd::{GuestbookEntry, GuestbookEntryStatus};
use crate::{Error, Result};

/// Field manager recorded on writes made by the operator
pub const FIELD_MANAGER: &str = "guestbook-operator";

/// Read/write primitives against the object store
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Get a GuestbookEntry, `None` if it does not exist
    async fn get_entry(&self, namespace: &str, name: &str) -> Result<Option<GuestbookEntry>>;

    /// Get a ConfigMap, `None` if it does not exist
    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>>;

    /// Create a ConfigMap
    async fn create_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap>;

    /// Replace an existing ConfigMap
    async fn update_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap>;

    /// Write the status subresource of a GuestbookEntry
    async fn update_status(
        &self,
        entry: &GuestbookEntry,
        status: &GuestbookEntryStatus,
    ) -> Result<()>;
}

/// [`EntryStore`] backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    /// Create a store wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn namespace_of(config_map: &ConfigMap) -> Result<String> {
    config_map
        .metadata
        .namespace
        .clone()
        .ok_or(Error::MissingObjectKey("namespace"))
}

#[async_trait]
impl EntryStore for KubeStore {
    async fn get_entry(&self, namespace: &str, name: &str) -> Result<Option<GuestbookEntry>> {
        let api: Api<GuestbookEntry> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(entry) => Ok(Some(entry)),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        match api.get(name).await {
            Ok(cm) => Ok(Some(cm)),
            Err(kube::Error::Api(ae)) if ae.code == 404 => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let namespace = namespace_of(config_map)?;
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &namespace);
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };

        let created = api.create(&params, config_map).await?;
        debug!(namespace = %namespace, name = %created.name_any(), "created ConfigMap");
        Ok(created)
    }

    async fn update_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let namespace = namespace_of(config_map)?;
        let name = config_map
            .metadata
            .name
            .clone()
            .ok_or(Error::MissingObjectKey("name"))?;
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), &namespace);
        let params = PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };

        // Carries the observed resourceVersion; a concurrent write surfaces as 409
        let updated = api.replace(&name, &params, config_map).await?;
        debug!(namespace = %namespace, name = %name, "updated ConfigMap");
        Ok(updated)
    }

    async fn update_status(
        &self,
        entry: &GuestbookEntry,
        status: &GuestbookEntryStatus,
    ) -> Result<()> {
        let namespace = entry.namespace().ok_or(Error::MissingObjectKey("namespace"))?;
        let api: Api<GuestbookEntry> = Api::namespaced(self.client.clone(), &namespace);
        let patch = serde_json::json!({
            "status": status
        });

        api.patch_status(
            &entry.name_any(),
            &PatchParams::default(),
            &Patch::Merge(&patch),
        )
        .await?;

        Ok(())
    }
}
