use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::{Crd, Spec, ValidationError};

use super::{PlacementApiStatus, PLACEMENT_API};

pub const MIN_REPLICAS: i32 = 0;
pub const MAX_REPLICAS: i32 = 32;

pub const DEFAULT_SERVICE_USER: &str = "placement";
pub const DEFAULT_DATABASE_USER: &str = "placement";
pub const DEFAULT_CONTAINER_IMAGE: &str =
    "quay.io/tripleozedcentos9/openstack-placement-api:current-tripleo";
pub const DEFAULT_REPLICAS: i32 = 1;
pub const DEFAULT_DATABASE_PASSWORD_SELECTOR: &str = "PlacementDatabasePassword";
pub const DEFAULT_SERVICE_PASSWORD_SELECTOR: &str = "PlacementPassword";
pub const DEFAULT_CUSTOM_SERVICE_CONFIG: &str = "# add your customization here";

/// Desired state of a PlacementAPI deployment.
///
/// Stored specs are always the output of [`PlacementApiSpecInput::into_spec`];
/// decoding a stored spec never re-applies defaults.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementApiSpec {
    /// user this service registers with in the identity service
    pub service_user: String,
    /// database cluster the service database is created in
    pub database_instance: String,
    pub database_user: String,
    pub container_image: String,
    pub replicas: i32,
    /// secret holding the database and service passwords
    pub secret: String,
    pub password_selectors: PasswordSelector,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub node_selector: BTreeMap<String, String>,
    pub debug: PlacementApiDebug,
    pub preserve_jobs: bool,
    /// raw service config, added to the service as `custom.conf`
    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_service_config: String,
    /// config files replacing or extending the rendered defaults, by file name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub default_config_overwrite: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "ResourceRequirements::is_empty")]
    pub resources: ResourceRequirements,
    pub network_attachments: Vec<String>,
}

impl Spec for PlacementApiSpec {
    type Status = PlacementApiStatus;

    fn metadata() -> &'static Crd {
        &PLACEMENT_API
    }
}

impl PlacementApiSpec {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(MIN_REPLICAS..=MAX_REPLICAS).contains(&self.replicas) {
            return Err(ValidationError::ReplicasOutOfRange(self.replicas));
        }
        if self.secret.trim().is_empty() {
            return Err(ValidationError::MissingField("secret"));
        }
        if self.database_instance.trim().is_empty() {
            return Err(ValidationError::MissingField("databaseInstance"));
        }
        Ok(())
    }
}

/// keys of the secret holding the database and service user passwords
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordSelector {
    pub database: String,
    pub service: String,
}

/// pause a deploy stage instead of running it
#[derive(Deserialize, Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementApiDebug {
    pub db_sync: bool,
    pub service: bool,
}

/// compute resources, quantities kept in their string form
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceRequirements {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub limits: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub requests: BTreeMap<String, String>,
}

impl ResourceRequirements {
    pub fn is_empty(&self) -> bool {
        self.limits.is_empty() && self.requests.is_empty()
    }
}

/// values used by the defaulting pass for absent fields
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SpecDefaults {
    pub service_user: String,
    pub database_user: String,
    pub container_image: String,
    pub replicas: i32,
    pub password_selectors: PasswordSelector,
    pub custom_service_config: String,
}

impl Default for SpecDefaults {
    fn default() -> Self {
        Self {
            service_user: DEFAULT_SERVICE_USER.to_owned(),
            database_user: DEFAULT_DATABASE_USER.to_owned(),
            container_image: DEFAULT_CONTAINER_IMAGE.to_owned(),
            replicas: DEFAULT_REPLICAS,
            password_selectors: PasswordSelector {
                database: DEFAULT_DATABASE_PASSWORD_SELECTOR.to_owned(),
                service: DEFAULT_SERVICE_PASSWORD_SELECTOR.to_owned(),
            },
            custom_service_config: DEFAULT_CUSTOM_SERVICE_CONFIG.to_owned(),
        }
    }
}

/// spec as submitted by a user, any field may be absent
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlacementApiSpecInput {
    pub service_user: Option<String>,
    pub database_instance: Option<String>,
    pub database_user: Option<String>,
    pub container_image: Option<String>,
    pub replicas: Option<i32>,
    pub secret: Option<String>,
    pub password_selectors: Option<PasswordSelectorInput>,
    pub node_selector: Option<BTreeMap<String, String>>,
    pub debug: Option<PlacementApiDebug>,
    pub preserve_jobs: Option<bool>,
    pub custom_service_config: Option<String>,
    pub default_config_overwrite: Option<BTreeMap<String, String>>,
    pub resources: Option<ResourceRequirements>,
    pub network_attachments: Option<Vec<String>>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PasswordSelectorInput {
    pub database: Option<String>,
    pub service: Option<String>,
}

impl PlacementApiSpecInput {
    /// fill absent fields, present fields are kept even when empty
    pub fn apply_defaults(self, defaults: &SpecDefaults) -> PlacementApiSpec {
        let selectors = self.password_selectors.unwrap_or_default();

        PlacementApiSpec {
            service_user: self
                .service_user
                .unwrap_or_else(|| defaults.service_user.clone()),
            database_instance: self.database_instance.unwrap_or_default(),
            database_user: self
                .database_user
                .unwrap_or_else(|| defaults.database_user.clone()),
            container_image: self
                .container_image
                .unwrap_or_else(|| defaults.container_image.clone()),
            replicas: self.replicas.unwrap_or(defaults.replicas),
            secret: self.secret.unwrap_or_default(),
            password_selectors: PasswordSelector {
                database: selectors
                    .database
                    .unwrap_or_else(|| defaults.password_selectors.database.clone()),
                service: selectors
                    .service
                    .unwrap_or_else(|| defaults.password_selectors.service.clone()),
            },
            node_selector: self.node_selector.unwrap_or_default(),
            debug: self.debug.unwrap_or_default(),
            preserve_jobs: self.preserve_jobs.unwrap_or(false),
            custom_service_config: self
                .custom_service_config
                .unwrap_or_else(|| defaults.custom_service_config.clone()),
            default_config_overwrite: self.default_config_overwrite.unwrap_or_default(),
            resources: self.resources.unwrap_or_default(),
            network_attachments: self.network_attachments.unwrap_or_default(),
        }
    }

    /// defaulting followed by validation; the only path from user input to a stored spec
    pub fn into_spec(self, defaults: &SpecDefaults) -> Result<PlacementApiSpec, ValidationError> {
        let spec = self.apply_defaults(defaults);
        spec.validate()?;
        Ok(spec)
    }
}
