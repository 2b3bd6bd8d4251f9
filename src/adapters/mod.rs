//! Adapters between the reconciler and the Kubernetes API

pub mod config_map_builder;
pub mod store;

pub use store::{EntryStore, KubeStore};
