// rest_api/src/config.rs

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_REST_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_REST_API_PORT: u16 = 8082;
/// Looked up next to the working directory as `rest_api.toml`, `rest_api.yaml`, ...
pub const DEFAULT_CONFIG_BASENAME: &str = "rest_api";
pub const ENV_PREFIX: &str = "DIALYSIS";
/// HS256 wants at least 256 bits of key material.
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Role records exported from the settings screens, audited at startup.
    #[serde(default)]
    pub roles_file: Option<PathBuf>,
}

impl RestApiConfig {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            bail!("jwt_secret is not set (use {}_JWT_SECRET or the config file)", ENV_PREFIX);
        }
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            bail!("jwt_secret must be at least {} bytes", MIN_JWT_SECRET_LEN);
        }
        if self.host.trim().is_empty() {
            bail!("host must not be empty");
        }
        Ok(())
    }
}

/// Loads the REST API configuration: built-in defaults, then the config file,
/// then `DIALYSIS_*` environment variables.
///
/// An explicit `config_file` must exist; the default `rest_api.*` file is optional.
pub fn load_rest_api_config(config_file: Option<&Path>) -> Result<RestApiConfig> {
    let mut builder = Config::builder()
        .set_default("host", DEFAULT_REST_API_HOST)?
        .set_default("port", i64::from(DEFAULT_REST_API_PORT))?
        .set_default("jwt_secret", "")?;

    builder = match config_file {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false)),
    };
    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));

    let config: RestApiConfig = builder
        .build()
        .context("Failed to load REST API configuration")?
        .try_deserialize()
        .context("Failed to parse REST API configuration")?;
    config.validate()?;
    Ok(config)
}
