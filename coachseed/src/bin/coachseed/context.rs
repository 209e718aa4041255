use anyhow::{Context, Result};
use coachseed::{RedisStore, Settings};
use std::path::Path;

use crate::output::OutputManager;
use crate::utils::redact_url;

/// Settings and store access for one CLI invocation
pub struct AppContext {
    pub settings: Settings,
    /// `--url` flag, takes precedence over the config file
    url_override: Option<String>,
}

impl AppContext {
    pub fn load(config_path: Option<&Path>, url_override: Option<String>) -> Result<Self> {
        let settings = Settings::load(config_path).context("Failed to load configuration")?;
        Ok(Self {
            settings,
            url_override,
        })
    }

    /// Get the store URL, expanding environment variables
    pub fn store_url(&self) -> Result<String> {
        match &self.url_override {
            Some(url) => Ok(url.clone()),
            None => self
                .settings
                .store_url()
                .context("Store URL is required (set REDIS_URL or [store].url)"),
        }
    }

    /// Open the store connection. It is closed when the returned store is dropped.
    pub async fn connect(&self, output: &OutputManager) -> Result<RedisStore> {
        let url = self.store_url()?;
        output.bullet(&format!("Redis: {}", redact_url(&url)));
        output.bullet(&format!("Prefix: {}", self.settings.store.prefix));

        output.progress("Connecting to Redis");
        let store = RedisStore::connect(&url, self.settings.store.prefix.clone())
            .await
            .context("Failed to connect to Redis");
        output.clear_line();

        let store = store?;
        output.success("Connected to Redis");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_url_override_wins() {
        let ctx = AppContext {
            settings: Settings::default(),
            url_override: Some("redis://override:6379/".to_string()),
        };
        assert_eq!(ctx.store_url().unwrap(), "redis://override:6379/");
    }

    #[test]
    fn test_config_file_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nurl = \"redis://from-file:6379/\"\nprefix = \"qa\"").unwrap();

        let ctx = AppContext::load(Some(file.path()), None).unwrap();
        assert_eq!(ctx.store_url().unwrap(), "redis://from-file:6379/");
        assert_eq!(ctx.settings.store.prefix, "qa");
    }

    #[test]
    fn test_missing_env_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nurl = \"${{COACHSEED_TEST_UNSET_URL}}\"").unwrap();

        let ctx = AppContext::load(Some(file.path()), None).unwrap();
        let err = ctx.store_url().unwrap_err();
        assert!(format!("{err:#}").contains("COACHSEED_TEST_UNSET_URL"));
    }
}
