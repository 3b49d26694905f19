//! Application configuration for fieldpress.
//!
//! User config lives at `~/.fieldpress/fieldpress.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{FieldpressError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "fieldpress.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".fieldpress";

// ---------------------------------------------------------------------------
// Config structs (matching fieldpress.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// CRM connection settings.
    #[serde(default)]
    pub crm: CrmConfig,

    /// Publish defaults.
    #[serde(default)]
    pub publish: PublishDefaults,
}

/// `[crm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrmConfig {
    /// OAuth token endpoint host (login server).
    #[serde(default = "default_login_url")]
    pub login_url: String,

    /// REST API version used for queries.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// CRM object holding the content records.
    #[serde(default = "default_object")]
    pub object: String,

    /// Names of the env vars holding credentials (never store values).
    #[serde(default = "default_client_id_env")]
    pub client_id_env: String,
    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,
    #[serde(default = "default_username_env")]
    pub username_env: String,
    #[serde(default = "default_password_env")]
    pub password_env: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            api_version: default_api_version(),
            object: default_object(),
            client_id_env: default_client_id_env(),
            client_secret_env: default_client_secret_env(),
            username_env: default_username_env(),
            password_env: default_password_env(),
            token_env: default_token_env(),
        }
    }
}

fn default_login_url() -> String {
    "https://login.salesforce.com".into()
}
fn default_api_version() -> String {
    "v59.0".into()
}
fn default_object() -> String {
    "Beautiful_Solution__c".into()
}
fn default_client_id_env() -> String {
    "FIELDPRESS_CLIENT_ID".into()
}
fn default_client_secret_env() -> String {
    "FIELDPRESS_CLIENT_SECRET".into()
}
fn default_username_env() -> String {
    "FIELDPRESS_USERNAME".into()
}
fn default_password_env() -> String {
    "FIELDPRESS_PASSWORD".into()
}
fn default_token_env() -> String {
    "FIELDPRESS_SECURITY_TOKEN".into()
}

/// `[publish]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishDefaults {
    /// Root directory the collection directories are written under.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Path of the raw-record snapshot cache.
    #[serde(default = "default_cache_file")]
    pub cache_file: String,
}

impl Default for PublishDefaults {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            cache_file: default_cache_file(),
        }
    }
}

fn default_output_dir() -> String {
    "site".into()
}
fn default_cache_file() -> String {
    "var/records.json".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.fieldpress/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| FieldpressError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.fieldpress/fieldpress.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| FieldpressError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        FieldpressError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| FieldpressError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| FieldpressError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| FieldpressError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that every CRM credential env var is set and non-empty.
/// Only needed for live runs; offline mode reads the snapshot cache.
pub fn validate_credentials(config: &AppConfig) -> Result<()> {
    let vars = [
        &config.crm.client_id_env,
        &config.crm.client_secret_env,
        &config.crm.username_env,
        &config.crm.password_env,
        &config.crm.token_env,
    ];

    let missing: Vec<&str> = vars
        .into_iter()
        .filter(|name| !std::env::var(name.as_str()).is_ok_and(|v| !v.is_empty()))
        .map(String::as_str)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FieldpressError::config(format!(
            "CRM credentials not found. Set the {} environment variable(s), \
             or run with --offline to use the snapshot cache.",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("output_dir"));
        assert!(toml_str.contains("FIELDPRESS_USERNAME"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.crm.api_version, "v59.0");
        assert_eq!(parsed.publish.output_dir, "site");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[publish]
output_dir = "/tmp/site"

[crm]
object = "Content_Item__c"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.publish.output_dir, "/tmp/site");
        assert_eq!(config.publish.cache_file, "var/records.json");
        assert_eq!(config.crm.object, "Content_Item__c");
        assert_eq!(config.crm.login_url, "https://login.salesforce.com");
    }

    #[test]
    fn credential_validation() {
        let mut config = AppConfig::default();
        // Use unique env var names to avoid interfering with other tests
        config.crm.username_env = "FP_TEST_NONEXISTENT_USER_12345".into();
        config.crm.password_env = "FP_TEST_NONEXISTENT_PASS_12345".into();
        let result = validate_credentials(&config);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("FP_TEST_NONEXISTENT_USER_12345")
        );
    }
}
