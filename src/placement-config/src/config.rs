use std::env;
use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use dirs::home_dir;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use placement_types::placement::{SpecDefaults, MAX_REPLICAS, MIN_REPLICAS};
use placement_types::ValidationError;

use crate::ConfigError;

pub const CONFIG_ENV: &str = "PLACEMENT_CONFIG";

/// operator wide settings
#[derive(Debug, Eq, PartialEq, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OperatorConfig {
    #[serde(skip)]
    pub path: Option<PathBuf>,
    /// values for fields absent from a submitted spec
    pub defaults: SpecDefaults,
}

impl OperatorConfig {
    /// `$HOME/.placement/config.yaml`
    pub fn home_path() -> Result<PathBuf, ConfigError> {
        let home_dir = home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home_dir.join(".placement").join("config.yaml"))
    }

    /// read from default home directory
    pub fn from_home() -> Result<Self, ConfigError> {
        Self::from_file(Self::home_path()?)
    }

    pub fn from_file<T: AsRef<Path>>(path: T) -> Result<Self, ConfigError> {
        let file = File::open(path.as_ref())?;
        let mut config: Self = serde_yaml::from_reader(file)?;
        config.validate()?;
        config.path = Some(path.as_ref().to_path_buf());
        debug!(path = %path.as_ref().display(), "loaded operator config");
        Ok(config)
    }

    /// explicit path, then `PLACEMENT_CONFIG`, then the home file if present,
    /// otherwise built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Ok(path) = env::var(CONFIG_ENV) {
            return Self::from_file(path);
        }
        match Self::home_path() {
            Ok(path) if path.exists() => Self::from_file(path),
            _ => {
                debug!("no operator config, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn to_file<T: AsRef<Path>>(&self, path: T) -> Result<(), ConfigError> {
        let file = File::create(path)?;
        Ok(serde_yaml::to_writer(file, self)?)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let replicas = self.defaults.replicas;
        if !(MIN_REPLICAS..=MAX_REPLICAS).contains(&replicas) {
            return Err(ValidationError::ReplicasOutOfRange(replicas));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use std::env::temp_dir;
    use std::path::Path;

    use placement_types::placement::{SpecDefaults, DEFAULT_CONTAINER_IMAGE};

    use super::OperatorConfig;
    use crate::ConfigError;

    #[test]
    fn test_decode_config() {
        let config = OperatorConfig::from_file("data/operator-config.yaml").expect("read");

        let defaults = &config.defaults;
        assert_eq!(
            defaults.container_image,
            "registry.local/openstack-placement-api:stable"
        );
        assert_eq!(defaults.replicas, 2);
        assert_eq!(defaults.password_selectors.database, "DbPassword");
        // absent keys keep the built-in defaults
        assert_eq!(defaults.service_user, "placement");
        assert_eq!(defaults.custom_service_config, "# add your customization here");
        assert!(config.path.is_some());
    }

    #[test]
    fn test_default_config() {
        let config = OperatorConfig::default();
        assert_eq!(config.defaults, SpecDefaults::default());
        assert_eq!(config.defaults.container_image, DEFAULT_CONTAINER_IMAGE);
    }

    #[test]
    fn test_explicit_path_wins() {
        let config =
            OperatorConfig::load(Some(Path::new("data/operator-config.yaml"))).expect("load");
        assert_eq!(config.defaults.replicas, 2);
    }

    #[test]
    fn test_missing_file() {
        let err = OperatorConfig::from_file("data/does-not-exist.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn test_config_round_trip() {
        //given
        let config = OperatorConfig {
            defaults: SpecDefaults {
                replicas: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let path = temp_dir().join("placement-operator-config-test.yaml");

        //when
        config.to_file(&path).expect("write");
        let read = OperatorConfig::from_file(&path).expect("read");

        //then
        assert_eq!(read.defaults, config.defaults);
        assert_eq!(read.path, Some(path));
    }

    #[test]
    fn test_reject_out_of_range_default_replicas() {
        let path = temp_dir().join("placement-operator-config-invalid.yaml");
        std::fs::write(&path, "defaults:\n  replicas: 64\n").expect("write");

        let err = OperatorConfig::from_file(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
