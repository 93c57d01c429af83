use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::summarize::{DEFAULT_ENDPOINT, DEFAULT_MODEL, SUMMARY_PROMPT};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub languages: Option<Vec<String>>,
    pub cache_capacity: Option<usize>,
    pub cache_ttl_secs: Option<u64>,
}

impl Config {
    /// Load config from ~/.config/ytsum/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsum")
        .join("config.toml")
}

/// Command-line values that take priority over the config file
#[derive(Debug, Default)]
pub struct Overrides {
    pub model: Option<String>,
    pub languages: Vec<String>,
    pub no_cache: bool,
}

/// Everything a run needs, resolved once at startup
#[derive(Clone)]
pub struct Settings {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
    pub languages: Vec<String>,
    pub prompt: String,
    pub cache_capacity: usize,
    pub cache_ttl: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            languages: vec!["en".to_string()],
            prompt: SUMMARY_PROMPT.to_string(),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            cache_ttl: None,
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("languages", &self.languages)
            .field("cache_capacity", &self.cache_capacity)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl Settings {
    /// Merge CLI overrides, the config file and the environment key.
    /// Fails with `MissingCredential` when no usable API key is found.
    pub fn resolve(config: &Config, overrides: Overrides, env_key: Option<String>) -> crate::Result<Self> {
        let defaults = Settings::default();
        let api_key = resolve_api_key(env_key, config.gemini_api_key.clone())?;

        let model = non_blank(overrides.model)
            .or_else(|| non_blank(config.model.clone()))
            .unwrap_or(defaults.model);

        let languages = if !overrides.languages.is_empty() {
            overrides.languages
        } else {
            config
                .languages
                .clone()
                .filter(|l| !l.is_empty())
                .unwrap_or(defaults.languages)
        };

        let cache_capacity = if overrides.no_cache {
            0
        } else {
            config.cache_capacity.unwrap_or(defaults.cache_capacity)
        };

        Ok(Self {
            api_key,
            model,
            endpoint: config.endpoint.clone().unwrap_or(defaults.endpoint),
            languages,
            prompt: defaults.prompt,
            cache_capacity,
            cache_ttl: config.cache_ttl_secs.map(Duration::from_secs),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Environment wins over the config file; blank values count as missing
pub fn resolve_api_key(env_key: Option<String>, file_key: Option<String>) -> crate::Result<String> {
    env_key
        .into_iter()
        .chain(file_key)
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
        .ok_or_else(|| {
            Error::MissingCredential(format!(
                "Gemini API key not found. Set {API_KEY_ENV} or add gemini_api_key to {}",
                config_path().display()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
gemini_api_key = "abc123"
model = "gemini-1.5-pro"
languages = ["en", "en-GB"]
cache_capacity = 4
cache_ttl_secs = 600
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(config.languages, Some(vec!["en".to_string(), "en-GB".to_string()]));
        assert_eq!(config.cache_capacity, Some(4));
        assert_eq!(config.cache_ttl_secs, Some(600));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.gemini_api_key.is_none());
        assert!(config.model.is_none());
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"model = "gemini-2.5-flash""#).unwrap();
        assert_eq!(config.model.as_deref(), Some("gemini-2.5-flash"));
        assert!(config.languages.is_none());
    }

    #[test]
    fn test_env_key_wins() {
        let key = resolve_api_key(Some("from-env".into()), Some("from-file".into())).unwrap();
        assert_eq!(key, "from-env");
    }

    #[test]
    fn test_blank_env_key_falls_back_to_file() {
        let key = resolve_api_key(Some("   ".into()), Some("from-file".into())).unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let err = resolve_api_key(None, None).unwrap_err();
        assert!(matches!(err, Error::MissingCredential(_)));
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_resolve_defaults() {
        let settings = Settings::resolve(&Config::default(), Overrides::default(), Some("k".into())).unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.languages, vec!["en".to_string()]);
        assert_eq!(settings.prompt, SUMMARY_PROMPT);
        assert_eq!(settings.cache_capacity, DEFAULT_CACHE_CAPACITY);
        assert!(settings.cache_ttl.is_none());
    }

    #[test]
    fn test_resolve_cli_beats_config() {
        let config = Config {
            model: Some("gemini-1.5-pro".into()),
            languages: Some(vec!["de".into()]),
            cache_capacity: Some(8),
            cache_ttl_secs: Some(60),
            ..Config::default()
        };
        let overrides = Overrides {
            model: Some("gemini-2.5-flash".into()),
            languages: vec!["en".into(), "en-US".into()],
            no_cache: true,
        };
        let settings = Settings::resolve(&config, overrides, Some("k".into())).unwrap();
        assert_eq!(settings.model, "gemini-2.5-flash");
        assert_eq!(settings.languages, vec!["en".to_string(), "en-US".to_string()]);
        assert_eq!(settings.cache_capacity, 0);
        assert_eq!(settings.cache_ttl, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_blank_cli_model_falls_back_to_config() {
        let config = Config {
            model: Some("gemini-1.5-pro".into()),
            ..Config::default()
        };
        let overrides = Overrides {
            model: Some("  ".into()),
            ..Overrides::default()
        };
        let settings = Settings::resolve(&config, overrides, Some("k".into())).unwrap();
        assert_eq!(settings.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = Settings {
            api_key: "super-secret".into(),
            ..Settings::default()
        };
        assert!(!format!("{settings:?}").contains("super-secret"));
    }
}
