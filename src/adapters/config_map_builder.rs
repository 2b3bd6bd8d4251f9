//! ConfigMap builder for GuestbookEntry children

use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;

use crate::crd::{GuestbookEntry, GuestbookEntrySpec};
use crate::{Error, Result};

/// Suffix appended to the entry name to form the ConfigMap name
pub const CONFIG_MAP_SUFFIX: &str = "-entry";

/// Data key holding the guest name
pub const NAME_KEY: &str = "name";

/// Data key holding the guest message
pub const MESSAGE_KEY: &str = "message";

/// Name of the ConfigMap derived from an entry name
pub fn config_map_name(entry_name: &str) -> String {
    format!("{}{}", entry_name, CONFIG_MAP_SUFFIX)
}

/// Build the desired ConfigMap for an entry, without ownership
pub fn build_config_map(entry: &GuestbookEntry) -> ConfigMap {
    let name = entry.name_any();

    ConfigMap {
        metadata: ObjectMeta {
            name: Some(config_map_name(&name)),
            namespace: entry.namespace(),
            labels: Some(build_labels(&name)),
            ..Default::default()
        },
        data: Some(build_data(&entry.spec)),
        ..Default::default()
    }
}

/// Labels carried by every child ConfigMap
pub fn build_labels(entry_name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), "guestbook".to_string());
    labels.insert("entry".to_string(), entry_name.to_string());
    labels
}

/// ConfigMap payload mirroring the entry spec
pub fn build_data(spec: &GuestbookEntrySpec) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert(NAME_KEY.to_string(), spec.name.clone());
    data.insert(MESSAGE_KEY.to_string(), spec.message.clone());
    data
}

/// Controller owner reference pointing at the entry
///
/// Fails when the entry has not been persisted yet (no name or uid).
pub fn owner_reference(entry: &GuestbookEntry) -> Result<OwnerReference> {
    entry.controller_owner_ref(&()).ok_or_else(|| {
        Error::OwnerReferenceError(format!(
            "GuestbookEntry {} has no uid",
            entry.name_any()
        ))
    })
}

/// Whether the ConfigMap lists the given owner
pub fn is_owned_by(config_map: &ConfigMap, owner: &OwnerReference) -> bool {
    config_map
        .metadata
        .owner_references
        .as_ref()
        .is_some_and(|refs| refs.iter().any(|r| r.uid == owner.uid))
}

/// Add the owner to an existing ConfigMap's owner references
///
/// The reference only claims `controller` when no other controller already
/// owns the object. Returns `false` when the owner was already present.
pub fn adopt(config_map: &mut ConfigMap, owner: &OwnerReference) -> bool {
    if is_owned_by(config_map, owner) {
        return false;
    }

    let refs = config_map.metadata.owner_references.get_or_insert_with(Vec::new);
    let has_controller = refs.iter().any(|r| r.controller == Some(true));

    let mut owner = owner.clone();
    if has_controller {
        owner.controller = Some(false);
    }
    refs.push(owner);
    true
}

/// Whether the ConfigMap's `name`/`message` values equal the desired ones
///
/// Keys other than `name` and `message` are ignored.
pub fn data_matches(actual: &ConfigMap, desired: &BTreeMap<String, String>) -> bool {
    let empty = BTreeMap::new();
    let actual = actual.data.as_ref().unwrap_or(&empty);

    [NAME_KEY, MESSAGE_KEY]
        .iter()
        .all(|key| actual.get(*key) == desired.get(*key))
}
