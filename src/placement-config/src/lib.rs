mod config;
mod error;
mod manifest;

pub use self::config::*;
pub use self::error::ConfigError;
pub use self::manifest::*;
