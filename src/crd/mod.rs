//! Custom Resource Definitions for the Guestbook Operator

mod guestbook_entry;

pub use guestbook_entry::*;

use kube::CustomResourceExt;

/// Generate CRD YAML manifests for all custom resources
pub fn generate_crds() -> Result<Vec<String>, serde_yaml::Error> {
    Ok(vec![serde_yaml::to_string(&GuestbookEntry::crd())?])
}
