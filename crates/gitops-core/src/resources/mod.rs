//! Generated resources and the merge engine
//!
//! A [`Resources`] collection maps a repository-relative path to the
//! document that belongs there. Builders each produce one, and the
//! orchestrator combines them:
//!
//! - [`merge`] is a plain key-wise union where the second argument wins.
//! - [`reconcile`] is used against a previously written tree: colliding
//!   Kustomizations are extended instead of replaced, so entries added by an
//!   earlier run (or by hand) survive.

mod kinds;

use std::collections::BTreeMap;

use serde::Serialize;

pub use kinds::{
    ApplicationDestination, ApplicationSource, ApplicationSpec, AutomatedSync, DeliveryApplication,
    Kustomization, Namespace, ObjectMeta, Param, Secret, SyncPolicy, TriggerBinding, TriggerBindingSpec,
};

use crate::{Error, Result};

/// A generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Resource {
    Kustomization(Kustomization),
    Secret(Secret),
    TriggerBinding(TriggerBinding),
    DeliveryApplication(DeliveryApplication),
    Namespace(Namespace),
}

impl Resource {
    /// Render the document as YAML. `path` is only used for error reporting.
    pub fn to_yaml(&self, path: &str) -> Result<String> {
        serde_yaml::to_string(self).map_err(|source| Error::Serialize {
            path: path.to_string(),
            source,
        })
    }

    pub fn as_kustomization(&self) -> Option<&Kustomization> {
        match self {
            Self::Kustomization(k) => Some(k),
            _ => None,
        }
    }
}

impl From<Kustomization> for Resource {
    fn from(value: Kustomization) -> Self {
        Self::Kustomization(value)
    }
}

impl From<Secret> for Resource {
    fn from(value: Secret) -> Self {
        Self::Secret(value)
    }
}

impl From<TriggerBinding> for Resource {
    fn from(value: TriggerBinding) -> Self {
        Self::TriggerBinding(value)
    }
}

impl From<DeliveryApplication> for Resource {
    fn from(value: DeliveryApplication) -> Self {
        Self::DeliveryApplication(value)
    }
}

impl From<Namespace> for Resource {
    fn from(value: Namespace) -> Self {
        Self::Namespace(value)
    }
}

/// Documents keyed by repository-relative path, iterated in path order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resources(BTreeMap<String, Resource>);

impl Resources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, resource: impl Into<Resource>) {
        self.0.insert(path.into(), resource.into());
    }

    pub fn get(&self, path: &str) -> Option<&Resource> {
        self.0.get(path)
    }

    pub fn kustomization(&self, path: &str) -> Option<&Kustomization> {
        self.get(path).and_then(Resource::as_kustomization)
    }

    pub fn contains_key(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resource)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Resource)> for Resources {
    fn from_iter<T: IntoIterator<Item = (String, Resource)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Resources {
    type Item = (String, Resource);
    type IntoIter = std::collections::btree_map::IntoIter<String, Resource>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Key-wise union of two collections; `secondary` wins on collision.
///
/// Neither input is modified.
pub fn merge(primary: &Resources, secondary: &Resources) -> Resources {
    let mut merged = primary.clone();
    merged
        .0
        .extend(secondary.0.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Combine a freshly derived tree with what was written before.
///
/// Where both sides hold a Kustomization, the previous one is extended with
/// the derived entries. Any other collision is won by `derived`, and keys
/// only present in `previous` pass through.
pub fn reconcile(previous: &Resources, derived: &Resources) -> Resources {
    let mut reconciled = merge(previous, derived);
    for (path, resource) in derived.iter() {
        if let (Resource::Kustomization(new), Some(old)) = (resource, previous.kustomization(path)) {
            reconciled.insert(path, old.extended_with(new));
        }
    }
    reconciled
}
