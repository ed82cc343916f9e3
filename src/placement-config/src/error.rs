use serde_yaml::Error as SerdeYamlError;
use std::io::Error as IoError;
use thiserror::Error;

use placement_types::{RegistryError, ValidationError};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] IoError),
    #[error("Yaml error: {0}")]
    SerdeError(#[from] SerdeYamlError),
    #[error("Invalid spec: {0}")]
    Validation(#[from] ValidationError),
    #[error("Unsupported resource: {0}")]
    Registry(#[from] RegistryError),
    #[error("No home directory")]
    NoHomeDir,
}
