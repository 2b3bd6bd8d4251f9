//! GuestbookEntry Custom Resource Definition

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// GuestbookEntry resource specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "example.connell.com",
    version = "v1alpha1",
    kind = "GuestbookEntry",
    plural = "guestbookentries",
    singular = "guestbookentry",
    shortname = "gbe",
    namespaced,
    status = "GuestbookEntryStatus",
    printcolumn = r#"{"name": "Phase", "type": "string", "jsonPath": ".status.phase"}"#,
    printcolumn = r#"{"name": "Message", "type": "string", "jsonPath": ".status.message"}"#,
    printcolumn = r#"{"name": "Age", "type": "date", "jsonPath": ".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct GuestbookEntrySpec {
    /// Name of the guest signing the book
    pub name: String,

    /// Message left by the guest
    pub message: String,
}

/// Processing phase reported by the operator
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum EntryPhase {
    /// The child ConfigMap matches the entry
    Processed,
    /// The last reconciliation failed
    Error,
}

impl EntryPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPhase::Processed => "Processed",
            EntryPhase::Error => "Error",
        }
    }
}

impl fmt::Display for EntryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// GuestbookEntry status
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuestbookEntryStatus {
    /// Current phase; unset until the first reconciliation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<EntryPhase>,

    /// Human-readable message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GuestbookEntryStatus {
    pub fn processed(message: impl Into<String>) -> Self {
        Self {
            phase: Some(EntryPhase::Processed),
            message: Some(message.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            phase: Some(EntryPhase::Error),
            message: Some(message.into()),
        }
    }
}
