use std::fs::File;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use placement_types::placement::{PlacementApi, PlacementApiSpecInput, SpecDefaults};
use placement_types::registry::SchemeRegistry;
use placement_types::{ObjectMeta, DEFAULT_NS};

use crate::ConfigError;

/// PlacementAPI as submitted by a user, before defaulting
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlacementApiManifest {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: PlacementApiSpecInput,
}

impl PlacementApiManifest {
    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        Ok(serde_yaml::from_reader(file)?)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// check the kind is served, then default and validate the spec
    pub fn into_resource(
        self,
        registry: &SchemeRegistry,
        defaults: &SpecDefaults,
    ) -> Result<PlacementApi, ConfigError> {
        registry.lookup(&self.api_version, &self.kind)?;

        let mut metadata = self.metadata;
        if metadata.namespace.is_empty() {
            metadata.namespace = DEFAULT_NS.to_owned();
        }
        let spec = self.spec.into_spec(defaults)?;
        debug!(name = %metadata.name, namespace = %metadata.namespace, "manifest accepted");
        Ok(PlacementApi::new(metadata, spec))
    }
}

/// stored resource including status, no defaulting applied
pub fn read_resource<T: AsRef<Path>>(path: T) -> Result<PlacementApi, ConfigError> {
    let file = File::open(path.as_ref())?;
    Ok(serde_yaml::from_reader(file)?)
}

pub fn write_resource<T: AsRef<Path>>(path: T, resource: &PlacementApi) -> Result<(), ConfigError> {
    let file = File::create(path)?;
    Ok(serde_yaml::to_writer(file, resource)?)
}

pub fn resource_to_yaml(resource: &PlacementApi) -> Result<String, ConfigError> {
    Ok(serde_yaml::to_string(resource)?)
}
