use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use statekit::{AwsSettings, DEFAULT_REGION, StaticCredentials};

use crate::cli::Cli;

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("tfstate-bootstrap"))
}

/// Get the default config file path
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

// ============================================================================
// Config File
// ============================================================================

/// Contents of config.toml. Every field is optional.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub aws: AwsSection,
    pub lock_table: LockTableSection,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AwsSection {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LockTableSection {
    pub name: Option<String>,
    pub read_capacity: Option<i64>,
    pub write_capacity: Option<i64>,
}

impl FileConfig {
    /// Load the config file.
    ///
    /// An explicitly given path must exist; a missing default file means
    /// "no config".
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = default_config_path()?;
                if !path.exists() {
                    log::debug!("No config file at {}", path.display());
                    return Ok(Self::default());
                }
                path
            }
        };

        log::debug!("Loading config from {}", path.display());
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Parse config.toml content
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

// ============================================================================
// Resolved Settings
// ============================================================================

/// Values given on the command line (or via environment variables).
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub table_name: Option<String>,
}

impl From<&Cli> for Overrides {
    fn from(cli: &Cli) -> Self {
        Self {
            region: cli.region.clone(),
            profile: cli.profile.clone(),
            endpoint_url: cli.endpoint_url.clone(),
            table_name: cli.table_name.clone(),
        }
    }
}

/// Everything needed to build a bootstrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub aws: AwsSettings,
    pub table_name: Option<String>,
    pub read_capacity: Option<i64>,
    pub write_capacity: Option<i64>,
}

impl Settings {
    /// Merge command line over config file over defaults.
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let FileConfig { aws, lock_table } = file;

        let region = overrides
            .region
            .or(aws.region)
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let credentials = match (aws.access_key_id, aws.secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
                access_key_id,
                secret_access_key,
                session_token: aws.session_token,
            }),
            (None, None) => None,
            _ => anyhow::bail!(
                "access_key_id and secret_access_key must be set together in [aws]"
            ),
        };

        for (name, value) in [
            ("read_capacity", lock_table.read_capacity),
            ("write_capacity", lock_table.write_capacity),
        ] {
            if let Some(units) = value
                && units < 1
            {
                anyhow::bail!("[lock_table] {name} must be at least 1, got {units}");
            }
        }

        Ok(Self {
            aws: AwsSettings {
                region,
                profile: overrides.profile.or(aws.profile),
                endpoint_url: overrides.endpoint_url.or(aws.endpoint_url),
                credentials,
            },
            table_name: overrides.table_name.or(lock_table.name),
            read_capacity: lock_table.read_capacity,
            write_capacity: lock_table.write_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
[aws]
region = "eu-west-1"
profile = "customers"
endpoint_url = "http://localhost:4566"

[lock_table]
name = "shared-lock"
read_capacity = 2
write_capacity = 3
"#;

    #[test]
    fn test_parse_empty() {
        assert_eq!(FileConfig::parse("").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_parse_full() {
        let config = FileConfig::parse(FULL).unwrap();
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.aws.profile.as_deref(), Some("customers"));
        assert_eq!(config.lock_table.name.as_deref(), Some("shared-lock"));
        assert_eq!(config.lock_table.read_capacity, Some(2));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        assert!(FileConfig::parse("[aws]\nregoin = \"eu-west-1\"\n").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, FULL).unwrap();

        let config = FileConfig::load(Some(&path)).unwrap();
        assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let dir = TempDir::new().unwrap();
        assert!(FileConfig::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(FileConfig::default(), Overrides::default()).unwrap();
        assert_eq!(settings.aws, AwsSettings::new("eu-central-1"));
        assert_eq!(settings.table_name, None);
        assert_eq!(settings.read_capacity, None);
    }

    #[test]
    fn test_resolve_file_values() {
        let file = FileConfig::parse(FULL).unwrap();
        let settings = Settings::resolve(file, Overrides::default()).unwrap();

        assert_eq!(settings.aws.region, "eu-west-1");
        assert_eq!(settings.aws.profile.as_deref(), Some("customers"));
        assert_eq!(settings.table_name.as_deref(), Some("shared-lock"));
        assert_eq!(settings.read_capacity, Some(2));
        assert_eq!(settings.write_capacity, Some(3));
    }

    #[test]
    fn test_resolve_overrides_win() {
        let file = FileConfig::parse(FULL).unwrap();
        let overrides = Overrides {
            region: Some("us-east-1".to_string()),
            profile: None,
            endpoint_url: None,
            table_name: Some("acme-lock".to_string()),
        };
        let settings = Settings::resolve(file, overrides).unwrap();

        assert_eq!(settings.aws.region, "us-east-1");
        assert_eq!(settings.aws.profile.as_deref(), Some("customers"));
        assert_eq!(settings.table_name.as_deref(), Some("acme-lock"));
    }

    #[test]
    fn test_resolve_static_credentials() {
        let file = FileConfig::parse(
            "[aws]\naccess_key_id = \"AKIATEST\"\nsecret_access_key = \"secret\"\n",
        )
        .unwrap();
        let settings = Settings::resolve(file, Overrides::default()).unwrap();
        let creds = settings.aws.credentials.unwrap();
        assert_eq!(creds.access_key_id, "AKIATEST");
        assert_eq!(creds.session_token, None);
    }

    #[test]
    fn test_resolve_partial_credentials() {
        let file = FileConfig::parse("[aws]\naccess_key_id = \"AKIATEST\"\n").unwrap();
        assert!(Settings::resolve(file, Overrides::default()).is_err());
    }

    #[test]
    fn test_resolve_rejects_zero_capacity() {
        let file = FileConfig::parse("[lock_table]\nread_capacity = 0\n").unwrap();
        assert!(Settings::resolve(file, Overrides::default()).is_err());
    }
}
