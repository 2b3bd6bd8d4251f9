//! Reconciliation logic for GuestbookEntry resources
//!
//! A pass reads the entry, derives the ConfigMap it should own, converges the
//! actual ConfigMap onto it and records the outcome in the entry's status.
//! NotFound is never an error here: a vanished entry ends the pass and a
//! vanished ConfigMap is recreated.

use std::future::Future;

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::ResourceExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::adapters::config_map_builder::{
    adopt, build_config_map, data_matches, is_owned_by, owner_reference,
};
use crate::adapters::EntryStore;
use crate::crd::{GuestbookEntry, GuestbookEntryStatus};
use crate::{Error, Result};

pub const MSG_OWNER_REF_FAILED: &str = "Failed to set owner reference for ConfigMap";
pub const MSG_CREATE_FAILED: &str = "Failed to create ConfigMap";
pub const MSG_UPDATE_FAILED: &str = "Failed to update ConfigMap";
pub const MSG_CREATED: &str = "ConfigMap created successfully";
pub const MSG_UPDATED: &str = "ConfigMap updated successfully";
pub const MSG_IN_SYNC: &str = "ConfigMap is in desired state";

/// Result of a successful reconcile pass
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The entry no longer exists
    Absent,
    /// The ConfigMap was missing and has been created
    Created,
    /// The ConfigMap drifted and has been updated
    Updated,
    /// Nothing to do
    InSync,
}

impl Outcome {
    /// Whether the dispatcher should run another pass for this key
    pub fn requeue(&self) -> bool {
        matches!(self, Outcome::Created)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Absent => "absent",
            Outcome::Created => "created",
            Outcome::Updated => "updated",
            Outcome::InSync => "in_sync",
        }
    }
}

/// Run a store call, aborting with [`Error::Cancelled`] if the token fires first
async fn guarded<T, F>(cancel: &CancellationToken, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        res = call => res,
    }
}

/// Converge the ConfigMap owned by the GuestbookEntry `namespace/name`
///
/// Every error is retryable. When the pass fails after the entry was loaded,
/// the entry's status is set to `Error` on a best-effort basis before the
/// original error is returned.
pub async fn reconcile_entry(
    store: &dyn EntryStore,
    cancel: &CancellationToken,
    namespace: &str,
    name: &str,
) -> Result<Outcome> {
    info!(namespace, name, "Reconciling GuestbookEntry");

    let entry = match guarded(cancel, store.get_entry(namespace, name)).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            // Owned ConfigMap is garbage collected through its owner reference
            info!(namespace, name, "GuestbookEntry not found, ignoring since it must have been deleted");
            return Ok(Outcome::Absent);
        }
        Err(e) => {
            error!(namespace, name, error = %e, "Failed to get GuestbookEntry");
            return Err(e);
        }
    };

    let mut desired = build_config_map(&entry);
    let owner = match owner_reference(&entry) {
        Ok(owner) => owner,
        Err(e) => {
            error!(namespace, name, error = %e, "Failed to set owner reference on ConfigMap");
            record_failure(store, cancel, &entry, MSG_OWNER_REF_FAILED).await;
            return Err(e);
        }
    };
    desired.metadata.owner_references = Some(vec![owner.clone()]);

    let config_map_name = desired.name_any();
    let actual = match guarded(cancel, store.get_config_map(namespace, &config_map_name)).await {
        Ok(actual) => actual,
        Err(e) => {
            // Status is left alone so the read failure is not masked
            error!(namespace, config_map = %config_map_name, error = %e, "Failed to get ConfigMap");
            return Err(e);
        }
    };

    let (outcome, status) = match actual {
        None => {
            info!(namespace, config_map = %config_map_name, "Creating a new ConfigMap");
            if let Err(e) = guarded(cancel, store.create_config_map(&desired)).await {
                error!(namespace, config_map = %config_map_name, error = %e, "Failed to create new ConfigMap");
                record_failure(store, cancel, &entry, MSG_CREATE_FAILED).await;
                return Err(e);
            }
            (Outcome::Created, GuestbookEntryStatus::processed(MSG_CREATED))
        }
        Some(actual) => match converge(actual, &desired, &owner) {
            None => {
                info!(namespace, config_map = %config_map_name, "ConfigMap data is already in sync");
                (Outcome::InSync, GuestbookEntryStatus::processed(MSG_IN_SYNC))
            }
            Some(patched) => {
                info!(namespace, config_map = %config_map_name, "ConfigMap out of sync, updating");
                if let Err(e) = guarded(cancel, store.update_config_map(&patched)).await {
                    error!(namespace, config_map = %config_map_name, error = %e, "Failed to update existing ConfigMap");
                    record_failure(store, cancel, &entry, MSG_UPDATE_FAILED).await;
                    return Err(e);
                }
                (Outcome::Updated, GuestbookEntryStatus::processed(MSG_UPDATED))
            }
        },
    };

    if let Err(e) = guarded(cancel, store.update_status(&entry, &status)).await {
        error!(namespace, name, error = %e, "Failed to update GuestbookEntry status");
        return Err(e);
    }

    info!(namespace, name, outcome = outcome.as_str(), "Successfully reconciled GuestbookEntry");
    Ok(outcome)
}

/// The actual ConfigMap rewritten to match `desired`, or `None` if it already does
///
/// Data is replaced wholesale with the desired `name`/`message` pair and the
/// owner is attached if missing. Labels are left as found.
fn converge(mut actual: ConfigMap, desired: &ConfigMap, owner: &OwnerReference) -> Option<ConfigMap> {
    let desired_data = desired.data.clone().unwrap_or_default();
    let in_sync = data_matches(&actual, &desired_data) && is_owned_by(&actual, owner);
    if in_sync {
        return None;
    }

    if !data_matches(&actual, &desired_data) {
        actual.data = Some(desired_data);
    }
    adopt(&mut actual, owner);
    Some(actual)
}

/// Best-effort `Error` status write accompanying a failed pass
///
/// A failure here is logged and dropped; the caller returns the primary error.
async fn record_failure(
    store: &dyn EntryStore,
    cancel: &CancellationToken,
    entry: &GuestbookEntry,
    message: &str,
) {
    let status = GuestbookEntryStatus::error(message);
    if let Err(e) = guarded(cancel, store.update_status(entry, &status)).await {
        warn!(
            namespace = entry.namespace().unwrap_or_default(),
            name = %entry.name_any(),
            error = %e,
            "Failed to update GuestbookEntry status after error"
        );
    }
}
