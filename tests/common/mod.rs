//! In-memory object store shared by the integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use guestbook_operator::adapters::EntryStore;
use guestbook_operator::crd::{GuestbookEntry, GuestbookEntrySpec, GuestbookEntryStatus};
use guestbook_operator::{Error, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::error::ErrorResponse;
use kube::ResourceExt;

type Key = (String, String);

/// Store calls that can be made to fail
#[derive(Clone, Copy, Debug, Default)]
pub struct Failures {
    pub get_entry: bool,
    pub get_config_map: bool,
    pub create: bool,
    pub update: bool,
    pub update_status: bool,
    /// Create never completes
    pub hang_create: bool,
}

#[derive(Default)]
struct State {
    entries: BTreeMap<Key, GuestbookEntry>,
    config_maps: BTreeMap<Key, ConfigMap>,
    status_writes: Vec<GuestbookEntryStatus>,
    mutations: Vec<&'static str>,
    failures: Failures,
}

/// A fake API server keeping objects in maps
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

fn api_error(code: u16, reason: &str, message: &str) -> Error {
    Error::KubeError(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    }))
}

fn injected() -> Error {
    api_error(500, "InternalError", "injected failure")
}

fn key_of(namespace: Option<String>, name: &str) -> Key {
    (namespace.unwrap_or_default(), name.to_string())
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_entry(&self, entry: GuestbookEntry) {
        let key = key_of(entry.namespace(), &entry.name_any());
        self.state.lock().unwrap().entries.insert(key, entry);
    }

    pub fn insert_config_map(&self, config_map: ConfigMap) {
        let key = key_of(config_map.namespace(), &config_map.name_any());
        self.state.lock().unwrap().config_maps.insert(key, config_map);
    }

    pub fn fail(&self, failures: Failures) {
        self.state.lock().unwrap().failures = failures;
    }

    pub fn entry(&self, namespace: &str, name: &str) -> Option<GuestbookEntry> {
        let key = (namespace.to_string(), name.to_string());
        self.state.lock().unwrap().entries.get(&key).cloned()
    }

    pub fn config_map(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        let key = (namespace.to_string(), name.to_string());
        self.state.lock().unwrap().config_maps.get(&key).cloned()
    }

    pub fn config_map_count(&self) -> usize {
        self.state.lock().unwrap().config_maps.len()
    }

    /// Every status written, in order, including failed attempts
    pub fn status_writes(&self) -> Vec<GuestbookEntryStatus> {
        self.state.lock().unwrap().status_writes.clone()
    }

    /// Successful ConfigMap writes, in order ("create" or "update")
    pub fn mutations(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().mutations.clone()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn get_entry(&self, namespace: &str, name: &str) -> Result<Option<GuestbookEntry>> {
        let state = self.state.lock().unwrap();
        if state.failures.get_entry {
            return Err(injected());
        }
        Ok(state
            .entries
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn get_config_map(&self, namespace: &str, name: &str) -> Result<Option<ConfigMap>> {
        let state = self.state.lock().unwrap();
        if state.failures.get_config_map {
            return Err(injected());
        }
        Ok(state
            .config_maps
            .get(&(namespace.to_string(), name.to_string()))
            .cloned())
    }

    async fn create_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let hang = self.state.lock().unwrap().failures.hang_create;
        if hang {
            std::future::pending::<()>().await;
        }
        let mut state = self.state.lock().unwrap();
        if state.failures.create {
            return Err(injected());
        }
        let key = key_of(config_map.namespace(), &config_map.name_any());
        if state.config_maps.contains_key(&key) {
            return Err(api_error(409, "AlreadyExists", "configmap already exists"));
        }
        state.config_maps.insert(key, config_map.clone());
        state.mutations.push("create");
        Ok(config_map.clone())
    }

    async fn update_config_map(&self, config_map: &ConfigMap) -> Result<ConfigMap> {
        let mut state = self.state.lock().unwrap();
        if state.failures.update {
            return Err(injected());
        }
        let key = key_of(config_map.namespace(), &config_map.name_any());
        if !state.config_maps.contains_key(&key) {
            return Err(api_error(404, "NotFound", "configmap not found"));
        }
        state.config_maps.insert(key, config_map.clone());
        state.mutations.push("update");
        Ok(config_map.clone())
    }

    async fn update_status(
        &self,
        entry: &GuestbookEntry,
        status: &GuestbookEntryStatus,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.status_writes.push(status.clone());
        if state.failures.update_status {
            return Err(injected());
        }
        let key = key_of(entry.namespace(), &entry.name_any());
        match state.entries.get_mut(&key) {
            Some(stored) => {
                stored.status = Some(status.clone());
                Ok(())
            }
            None => Err(api_error(404, "NotFound", "guestbookentry not found")),
        }
    }
}

/// A persisted GuestbookEntry with a uid
pub fn entry(namespace: &str, name: &str, guest: &str, message: &str) -> GuestbookEntry {
    let mut entry = GuestbookEntry::new(
        name,
        GuestbookEntrySpec {
            name: guest.to_string(),
            message: message.to_string(),
        },
    );
    entry.metadata.namespace = Some(namespace.to_string());
    entry.metadata.uid = Some(format!("uid-{}-{}", namespace, name));
    entry
}
