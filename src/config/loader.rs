//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::auth::{AccessControlList, AclError};
use crate::config::schema::{AclConfig, ServiceConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
    #[error("ACL error: {0}")]
    Acl(#[from] AclError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the ACL from whichever source the config names.
pub fn load_acl(config: &AclConfig) -> Result<AccessControlList, ConfigError> {
    let acl = match (&config.inline, &config.path) {
        (Some(json), _) => AccessControlList::from_json(json)?,
        (None, Some(path)) => AccessControlList::from_file(Path::new(path))?,
        (None, None) => return Err(ConfigError::Validation(vec![ValidationError::AclSource])),
    };

    if acl.is_empty() {
        tracing::warn!("ACL is empty, every call will be rejected");
    }
    Ok(acl)
}
