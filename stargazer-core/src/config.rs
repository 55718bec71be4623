use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use crate::location::LocationSpec;

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const ENDPOINT_ENV: &str = "OPENWEATHER_BASE_URL";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_key = "..."
///
/// [location]
/// city = "Berlin,de"
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Forecast URL override; the public OpenWeather endpoint when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Location used when none is given on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationSpec>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "stargazer", "stargazer")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `OPENWEATHER_*` overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_env_pairs(std::env::vars())
    }

    pub fn with_env_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if let Some(key) = non_blank(&env, API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = non_blank(&env, ENDPOINT_ENV) {
            self.endpoint = Some(endpoint);
        }

        self
    }

    /// An explicitly passed key beats whatever the config holds.
    pub fn resolve_api_key(&self, explicit: Option<String>) -> Option<String> {
        explicit
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.api_key.clone())
    }

    /// Replace the API key and, if given, the default city.
    pub fn upsert(&mut self, api_key: String, city: Option<String>) {
        self.api_key = Some(api_key);

        if let Some(city) = city.filter(|c| !c.trim().is_empty()) {
            self.location = Some(LocationSpec::city(city));
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

fn non_blank(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_not_configured() {
        let cfg = Config::default();

        assert!(!cfg.is_configured());
        assert_eq!(cfg.resolve_api_key(None), None);
    }

    #[test]
    fn upsert_sets_key_and_default_city() {
        let mut cfg = Config::default();

        cfg.upsert("OPEN_KEY".into(), Some("Berlin,de".into()));

        assert!(cfg.is_configured());
        assert_eq!(cfg.api_key.as_deref(), Some("OPEN_KEY"));
        assert_eq!(cfg.location, Some(LocationSpec::city("Berlin,de")));
    }

    #[test]
    fn upsert_without_city_keeps_existing_location() {
        let mut cfg = Config {
            location: Some(LocationSpec::id(2950159)),
            ..Config::default()
        };

        cfg.upsert("NEW_KEY".into(), Some("  ".into()));

        assert_eq!(cfg.api_key.as_deref(), Some("NEW_KEY"));
        assert_eq!(cfg.location, Some(LocationSpec::id(2950159)));
    }

    #[test]
    fn explicit_key_beats_env_beats_file() {
        let cfg = Config {
            api_key: Some("FILE_KEY".into()),
            ..Config::default()
        };
        assert_eq!(cfg.resolve_api_key(None).as_deref(), Some("FILE_KEY"));

        let cfg = cfg.with_env_pairs([(API_KEY_ENV, "ENV_KEY")]);
        assert_eq!(cfg.resolve_api_key(None).as_deref(), Some("ENV_KEY"));
        assert_eq!(
            cfg.resolve_api_key(Some("FLAG_KEY".into())).as_deref(),
            Some("FLAG_KEY")
        );
        assert_eq!(cfg.resolve_api_key(Some(" ".into())).as_deref(), Some("ENV_KEY"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let cfg = Config {
            api_key: Some("FILE_KEY".into()),
            ..Config::default()
        }
        .with_env_pairs([(API_KEY_ENV, "  "), (ENDPOINT_ENV, "")]);

        assert_eq!(cfg.api_key.as_deref(), Some("FILE_KEY"));
        assert_eq!(cfg.endpoint, None);
    }

    #[test]
    fn endpoint_can_come_from_env() {
        let cfg = Config::default().with_env_pairs([(ENDPOINT_ENV, "http://localhost:9000/forecast")]);
        assert_eq!(cfg.endpoint.as_deref(), Some("http://localhost:9000/forecast"));
    }

    #[test]
    fn missing_file_loads_as_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = Config::load_from(&dir.path().join("absent.toml")).expect("load");

        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let cfg = Config {
            api_key: Some("KEY".into()),
            endpoint: None,
            location: Some(LocationSpec::coordinates(52.52, 13.41)),
        };
        cfg.save_to(&path).expect("save");

        assert_eq!(Config::load_from(&path).expect("load"), cfg);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        fs::write(&path, "api_key = [").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
