//! Application settings.
//!
//! Non-secret settings come from `config.toml` (every key optional, defaults
//! below). Credentials for the payment gateway, object storage and admin API
//! come only from the environment, which `main` populates from `.env` first.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Contents of config.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Public site origin used for gateway return/cancel URLs
    pub public_base_url: String,
    /// Database URL; `DATABASE_URL` takes precedence
    pub database_url: String,
    /// Payment gateway API origin
    pub payos_base_url: String,
    /// Object storage API origin
    pub cloudinary_base_url: String,
    /// Folder uploaded files are stored under
    pub upload_folder: String,
    /// Maximum accepted request body in bytes (base64 uploads are large)
    pub max_body_bytes: usize,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            payos_base_url: "https://api-merchant.payos.vn".to_string(),
            cloudinary_base_url: "https://api.cloudinary.com".to_string(),
            upload_folder: "nuoi_em".to_string(),
            max_body_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Payment gateway credentials
#[derive(Debug, Clone)]
pub struct PayOsCredentials {
    pub client_id: String,
    pub api_key: String,
    pub checksum_key: String,
}

/// Object storage credentials
#[derive(Debug, Clone)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Fully resolved settings
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub file: FileSettings,
    pub payos: PayOsCredentials,
    pub cloudinary: CloudinaryCredentials,
    /// Bearer token guarding the moderation endpoints
    pub admin_token: String,
}

/// Parses config.toml contents.
pub fn parse_file_settings(contents: &str) -> Result<FileSettings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `path`, falling back to defaults when the file does not exist.
pub fn load_file_settings<P: AsRef<Path>>(path: P) -> Result<FileSettings> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        info!("No config file at {:?}, using defaults", path_ref);
        return Ok(FileSettings::default());
    }
    debug!("Loading configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;
    parse_file_settings(&contents)
}

fn required_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config {
            message: format!("{name} must be set"),
        }),
    }
}

/// Resolves the complete configuration from `path` and the process environment.
pub fn load_app_configuration<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let mut file = load_file_settings(path)?;
    if let Ok(url) = std::env::var("DATABASE_URL") {
        file.database_url = url;
    }

    Ok(AppConfig {
        file,
        payos: PayOsCredentials {
            client_id: required_env("PAYOS_CLIENT_ID")?,
            api_key: required_env("PAYOS_API_KEY")?,
            checksum_key: required_env("PAYOS_CHECKSUM_KEY")?,
        },
        cloudinary: CloudinaryCredentials {
            cloud_name: required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: required_env("CLOUDINARY_API_KEY")?,
            api_secret: required_env("CLOUDINARY_API_SECRET")?,
        },
        admin_token: required_env("ADMIN_API_TOKEN")?,
    })
}
