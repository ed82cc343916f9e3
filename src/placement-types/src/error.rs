use thiserror::Error;

/// Desired state rejected at write time. Never stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(
        "replicas {0} out of range [{min}, {max}]",
        min = crate::placement::MIN_REPLICAS,
        max = crate::placement::MAX_REPLICAS
    )]
    ReplicasOutOfRange(i32),
    #[error("required field '{0}' is missing or empty")]
    MissingField(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0} endpoint not found")]
pub struct EndpointNotFound(pub String);

/// Failures reported by external collaborators.
/// These are folded into condition records, never propagated past the status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("credential key '{key}' not found in secret '{secret}'")]
    CredentialNotFound { secret: String, key: String },
    #[error("database '{0}' unavailable")]
    DatabaseUnavailable(String),
    #[error("service registration failed: {0}")]
    RegistrationFailed(String),
}

impl CollaboratorError {
    /// machine readable reason code used on condition records
    pub fn reason(&self) -> &'static str {
        match self {
            Self::CredentialNotFound { .. } => "CredentialNotFound",
            Self::DatabaseUnavailable(_) => "DatabaseUnavailable",
            Self::RegistrationFailed(_) => "RegistrationFailed",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("kind '{0}' is not registered")]
    UnknownKind(String),
    #[error("kind '{kind}' is registered under '{expected}', not '{api_version}'")]
    ApiVersionMismatch {
        kind: String,
        api_version: String,
        expected: String,
    },
}
