//! Client configuration loading.
//!
//! Reads `config.toml` and layers environment overrides on top. A missing
//! file yields defaults; a malformed one is an error so typos are not
//! silently ignored.

use regent_core::config::{ClientConfig, Credentials, TranscriptVerbosity};
use regent_core::error::{RegentError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const ENV_BASE_URL: &str = "REGENT_BASE_URL";
pub const ENV_TRANSCRIPT: &str = "REGENT_TRANSCRIPT";
pub const ENV_API_KEY: &str = "REGENT_API_KEY";
pub const ENV_MODEL: &str = "REGENT_MODEL";

/// Loads [`ClientConfig`] from one TOML file.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file only.
    ///
    /// # Errors
    ///
    /// Returns `RegentError::Io` when the file exists but cannot be read and
    /// `RegentError::Serialization` when it is not valid TOML.
    pub fn load_file(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "[ConfigService] {} not found, using defaults",
                self.path.display()
            );
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }

        Ok(toml::from_str(&content)?)
    }

    /// Reads the file, then applies process environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let config = self.load_file()?;
        apply_env_overrides(config, |name| std::env::var(name).ok())
    }
}

/// Applies `REGENT_BASE_URL` and `REGENT_TRANSCRIPT` from `lookup`.
///
/// # Errors
///
/// Returns `RegentError::Config` for an unknown transcript mode.
pub fn apply_env_overrides<F>(mut config: ClientConfig, lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
        config.base_url = base_url;
    }

    if let Some(mode) = lookup(ENV_TRANSCRIPT).filter(|v| !v.trim().is_empty()) {
        config.transcript = TranscriptVerbosity::from_str(mode.trim()).map_err(|_| {
            RegentError::config(format!(
                "{} must be 'quiet' or 'verbose', got '{}'",
                ENV_TRANSCRIPT, mode
            ))
        })?;
    }

    Ok(config)
}

/// Credentials taken from `REGENT_API_KEY` / `REGENT_MODEL`.
///
/// Used only when the durable store has none.
pub fn credentials_from_env<F>(lookup: F) -> Credentials
where
    F: Fn(&str) -> Option<String>,
{
    Credentials {
        api_key: lookup(ENV_API_KEY).unwrap_or_default(),
        model: lookup(ENV_MODEL).filter(|m| !m.trim().is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));
        assert_eq!(service.load_file().unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_file_values_are_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "base_url = \"https://regent.example/api\"\nskip_intro = true\n",
        )
        .unwrap();

        let config = ConfigService::new(path).load_file().unwrap();
        assert_eq!(config.base_url, "https://regent.example/api");
        assert!(config.skip_intro);
        assert_eq!(config.transcript, TranscriptVerbosity::Quiet);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "base_url = [").unwrap();

        let err = ConfigService::new(path).load_file().unwrap_err();
        assert!(matches!(err, RegentError::Serialization { .. }));
    }

    #[test]
    fn test_env_overrides_file() {
        let config = apply_env_overrides(
            ClientConfig::default(),
            env(&[(ENV_BASE_URL, "http://10.0.0.2/api"), (ENV_TRANSCRIPT, "Verbose")]),
        )
        .unwrap();
        assert_eq!(config.base_url, "http://10.0.0.2/api");
        assert_eq!(config.transcript, TranscriptVerbosity::Verbose);
    }

    #[test]
    fn test_unknown_transcript_mode_is_rejected() {
        let err = apply_env_overrides(ClientConfig::default(), env(&[(ENV_TRANSCRIPT, "loud")]))
            .unwrap_err();
        assert!(matches!(err, RegentError::Config(_)));
    }

    #[test]
    fn test_credentials_from_env() {
        let creds = credentials_from_env(env(&[(ENV_API_KEY, "sk-1"), (ENV_MODEL, "")]));
        assert!(creds.has_key());
        assert_eq!(creds.model, None);
    }
}
