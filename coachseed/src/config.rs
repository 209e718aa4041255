//! `coachseed.toml` settings.
//!
//! ```toml
//! [store]
//! url = "${REDIS_URL}"
//! prefix = "coach"
//! ```
//!
//! `${VAR}` references are expanded from the environment when the URL is read.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "coachseed.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_url")]
    pub url: String,
    /// Namespace for every key the tool writes.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            url: default_store_url(),
            prefix: default_prefix(),
        }
    }
}

fn default_store_url() -> String {
    "${REDIS_URL}".to_string()
}

fn default_prefix() -> String {
    "coach".to_string()
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must exist. Without one, `coachseed.toml` in the working
    /// directory is used when present, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Store URL with environment references expanded.
    pub fn store_url(&self) -> Result<String, ConfigError> {
        let url = expand_env(&self.store.url, |name| std::env::var(name).ok())?;
        if url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        Ok(url)
    }
}

/// Replace every `${NAME}` in `value` using `lookup`.
pub fn expand_env(value: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    let mut expanded = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        let name = &rest[start + 2..start + 2 + len];
        let resolved = lookup(name).ok_or_else(|| ConfigError::MissingEnv { name: name.to_string() })?;
        expanded.push_str(&rest[..start]);
        expanded.push_str(&resolved);
        rest = &rest[start + 3 + len..];
    }

    expanded.push_str(rest);
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "REDIS_HOST" => Some("cache.internal".to_string()),
            "REDIS_URL" => Some("redis://127.0.0.1:6379/".to_string()),
            _ => None,
        }
    }

    #[test]
    fn default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.store.url, "${REDIS_URL}");
        assert_eq!(settings.store.prefix, "coach");
    }

    #[test]
    fn expands_whole_and_embedded_references() {
        assert_eq!(expand_env("${REDIS_URL}", lookup).unwrap(), "redis://127.0.0.1:6379/");
        assert_eq!(
            expand_env("redis://${REDIS_HOST}:6380/1", lookup).unwrap(),
            "redis://cache.internal:6380/1"
        );
        assert_eq!(expand_env("redis://localhost/", lookup).unwrap(), "redis://localhost/");
    }

    #[test]
    fn missing_variable_is_an_error() {
        let err = expand_env("${COACHSEED_UNSET_VAR}", lookup).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv { name } if name == "COACHSEED_UNSET_VAR"));
    }

    #[test]
    fn unterminated_reference_is_kept_verbatim() {
        assert_eq!(expand_env("redis://${oops", lookup).unwrap(), "redis://${oops");
    }

    #[test]
    fn loads_file_with_partial_settings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nurl = \"redis://localhost:6379/\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.store.url, "redis://localhost:6379/");
        assert_eq!(settings.store.prefix, "coach");
        assert_eq!(settings.store_url().unwrap(), "redis://localhost:6379/");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store\nurl = 1").unwrap();
        assert!(matches!(
            Settings::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn empty_url_is_rejected() {
        let settings = Settings {
            store: StoreSettings {
                url: "  ".to_string(),
                prefix: "coach".to_string(),
            },
        };
        assert!(matches!(settings.store_url(), Err(ConfigError::EmptyUrl)));
    }
}
