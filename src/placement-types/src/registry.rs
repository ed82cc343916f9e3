//!
//! # Type registry
//!
//! Maps `apiVersion`/`kind` to the crd and a factory for an empty object.
//! Populated once at process start by [`SchemeRegistry::bootstrap`].
//!
use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::{Crd, K8List, K8Obj, ObjectMeta, RegistryError, Spec};

pub type ObjectFactory = fn() -> Value;

#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub crd: &'static Crd,
    pub kind: String,
    factory: ObjectFactory,
}

impl TypeEntry {
    pub fn api_version(&self) -> String {
        self.crd.api_version()
    }

    /// empty object of this kind, in its wire form
    pub fn new_object(&self) -> Value {
        (self.factory)()
    }
}

#[derive(Debug, Default)]
pub struct SchemeRegistry {
    entries: BTreeMap<String, TypeEntry>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// registry with every kind this crate defines
    pub fn bootstrap() -> Self {
        let mut registry = Self::new();
        crate::placement::register_types(&mut registry);
        registry
    }

    /// returns false if the kind was already registered, the first entry is kept
    pub fn register_type(
        &mut self,
        kind: impl Into<String>,
        crd: &'static Crd,
        factory: ObjectFactory,
    ) -> bool {
        let kind = kind.into();
        if self.entries.contains_key(&kind) {
            debug!(%kind, "kind already registered");
            return false;
        }
        debug!(%kind, api_version = %crd.api_version(), "register kind");
        self.entries.insert(
            kind.clone(),
            TypeEntry {
                crd,
                kind,
                factory,
            },
        );
        true
    }

    /// register the object and list kinds of a spec
    pub fn register<S>(&mut self)
    where
        S: Spec + 'static,
    {
        self.register_type(S::kind(), S::metadata(), empty_object::<S>);
        self.register_type(S::list_kind(), S::metadata(), empty_list::<S>);
    }

    pub fn lookup(&self, api_version: &str, kind: &str) -> Result<&TypeEntry, RegistryError> {
        let entry = self
            .entries
            .get(kind)
            .ok_or_else(|| RegistryError::UnknownKind(kind.to_owned()))?;
        let expected = entry.api_version();
        if expected != api_version {
            return Err(RegistryError::ApiVersionMismatch {
                kind: kind.to_owned(),
                api_version: api_version.to_owned(),
                expected,
            });
        }
        Ok(entry)
    }

    pub fn new_object(&self, kind: &str) -> Result<Value, RegistryError> {
        self.entries
            .get(kind)
            .map(TypeEntry::new_object)
            .ok_or_else(|| RegistryError::UnknownKind(kind.to_owned()))
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

fn empty_object<S: Spec>() -> Value {
    serde_json::to_value(K8Obj::new(ObjectMeta::default(), S::default())).unwrap_or(Value::Null)
}

fn empty_list<S: Spec>() -> Value {
    serde_json::to_value(K8List::<S>::new()).unwrap_or(Value::Null)
}
