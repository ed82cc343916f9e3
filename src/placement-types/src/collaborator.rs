//!
//! # Collaborators
//!
//! Interfaces of the external systems a reconciler consults. Their results
//! are folded into the status through the `observe_*` methods of
//! [`PlacementApiStatus`](crate::placement::PlacementApiStatus).
//!
use crate::placement::PlacementApiSpec;
use crate::CollaboratorError;

/// credential store holding the service passwords
pub trait CredentialStore {
    fn password(&self, secret: &str, key: &str) -> Result<String, CollaboratorError>;
}

/// database provisioner owning the database clusters
pub trait DatabaseProvisioner {
    fn resolve_hostname(&self, database_instance: &str) -> Result<String, CollaboratorError>;
}

/// identity service the placement service registers with
pub trait IdentityRegistry {
    fn register(&self, service: &ServiceMetadata) -> Result<String, CollaboratorError>;

    /// removing an unknown service id succeeds
    fn deregister(&self, service_id: &str) -> Result<(), CollaboratorError>;
}

pub const SERVICE_NAME: &str = "placement";
pub const SERVICE_TYPE: &str = "placement";
pub const SERVICE_DESCRIPTION: &str = "Placement Service";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMetadata {
    pub name: String,
    pub service_type: String,
    pub description: String,
    pub user: String,
    pub enabled: bool,
}

impl ServiceMetadata {
    pub fn for_spec(spec: &PlacementApiSpec) -> Self {
        Self {
            name: SERVICE_NAME.to_owned(),
            service_type: SERVICE_TYPE.to_owned(),
            description: SERVICE_DESCRIPTION.to_owned(),
            user: spec.service_user.clone(),
            enabled: true,
        }
    }
}

/// passwords selected from the spec's credential secret
#[derive(Clone, PartialEq, Eq)]
pub struct ServicePasswords {
    pub database: String,
    pub service: String,
}

impl std::fmt::Debug for ServicePasswords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServicePasswords").finish_non_exhaustive()
    }
}

impl ServicePasswords {
    pub fn resolve<C>(store: &C, spec: &PlacementApiSpec) -> Result<Self, CollaboratorError>
    where
        C: CredentialStore + ?Sized,
    {
        let selectors = &spec.password_selectors;
        Ok(Self {
            database: store.password(&spec.secret, &selectors.database)?,
            service: store.password(&spec.secret, &selectors.service)?,
        })
    }
}
