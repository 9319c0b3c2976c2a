// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use orderdesk_app::{DEFAULT_PAGE_SIZE, GridOptions, hideable_column_key, validate_page_size};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

pub const APP_NAME: &str = "orderdesk";
const CONFIG_VERSION: i64 = 1;
const CONFIG_PATH_ENV: &str = "ORDERDESK_CONFIG_PATH";
const BASE_URL_ENV: &str = "ORDERDESK_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT: &str = "5s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub remote: Remote,
    #[serde(default)]
    pub grid: Grid,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            remote: Remote::default(),
            grid: Grid::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Remote {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Remote {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Grid {
    pub page_size: Option<usize>,
    pub hidden_columns: Option<Vec<String>>,
    pub dashboard: Option<bool>,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
            hidden_columns: Some(Vec::new()),
            dashboard: Some(true),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.validate(path)?;
            return Ok(config);
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [remote], [grid], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        let base_url = self.base_url();
        let parsed = Url::parse(&base_url).with_context(|| {
            format!(
                "remote.base_url {base_url:?} in {} is not a valid URL",
                path.display()
            )
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!(
                "remote.base_url in {} must use http or https, got {:?}",
                path.display(),
                parsed.scheme()
            );
        }

        if let Some(timeout) = &self.remote.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "remote.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(page_size) = self.grid.page_size {
            validate_page_size(page_size)
                .with_context(|| format!("grid.page_size in {}", path.display()))?;
        }

        for column in self.grid.hidden_columns.iter().flatten() {
            hideable_column_key(column)
                .with_context(|| format!("grid.hidden_columns in {}", path.display()))?;
        }

        EnvFilter::try_new(self.log_level()).with_context(|| {
            format!(
                "log.level {:?} in {} is not a valid filter; use error, warn, info, debug, or trace",
                self.log_level(),
                path.display()
            )
        })?;

        if let Some(file) = &self.log.file
            && !Path::new(file).is_absolute()
        {
            bail!(
                "log.file in {} must be an absolute path, got {file:?}",
                path.display()
            );
        }

        Ok(())
    }

    /// `[remote].base_url`, then `ORDERDESK_BASE_URL`, then the local default.
    pub fn base_url(&self) -> String {
        let configured = self
            .remote
            .base_url
            .clone()
            .or_else(|| env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        configured.trim().trim_end_matches('/').to_owned()
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.remote.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn grid_options(&self) -> GridOptions {
        GridOptions {
            page_size: self.grid.page_size,
            hidden_columns: self.grid.hidden_columns.clone().unwrap_or_default(),
        }
    }

    pub fn show_dashboard(&self) -> bool {
        self.grid.dashboard.unwrap_or(true)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let data_root = dirs::data_dir().ok_or_else(|| {
            anyhow!("cannot resolve data directory; set [log].file to an absolute path")
        })?;
        Ok(data_root.join(APP_NAME).join("orderdesk.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# orderdesk config\n# Place this file at: {}\n\nversion = 1\n\n[remote]\n# Falls back to {BASE_URL_ENV}, then {DEFAULT_BASE_URL}\nbase_url = \"{DEFAULT_BASE_URL}\"\ntimeout = \"{DEFAULT_TIMEOUT}\"\n\n[grid]\n# One of 10, 20, 30, 50, 100\npage_size = {DEFAULT_PAGE_SIZE}\n# Column keys: buyer, merchant, status, date, amount, actions\nhidden_columns = []\ndashboard = true\n\n[log]\nlevel = \"{DEFAULT_LOG_LEVEL}\"\n# Optional. Default is the platform data dir (for example ~/.local/share/orderdesk/orderdesk.log)\n# file = \"/absolute/path/orderdesk.log\"\n",
            path.display(),
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let invalid =
        || anyhow!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)");
    let (value, scale) = if let Some(value) = raw.strip_suffix("ms") {
        (value, Duration::from_millis(1))
    } else if let Some(value) = raw.strip_suffix('s') {
        (value, Duration::from_secs(1))
    } else if let Some(value) = raw.strip_suffix('m') {
        (value, Duration::from_secs(60))
    } else {
        return Err(invalid());
    };

    let count: u32 = value.trim().parse().map_err(|_| invalid())?;
    scale.checked_mul(count).ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::{BASE_URL_ENV, CONFIG_PATH_ENV, Config, parse_duration};
    use anyhow::Result;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};
    use std::time::Duration;

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert!(config.show_dashboard());
        assert_eq!(config.timeout()?, Duration::from_secs(5));
        assert_eq!(config.grid_options().page_size, Some(10));
        assert_eq!(config.log_level(), "info");
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[remote]\nbase_url=\"http://localhost:8000\"\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        let message = error.to_string();
        assert!(message.contains("version = 1"));
        assert!(message.contains("[remote], [grid], and [log]"));
        Ok(())
    }

    #[test]
    fn v1_config_parses() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[remote]\nbase_url = \"https://orders.example.com/api/\"\ntimeout = \"750ms\"\n[grid]\npage_size = 30\nhidden_columns = [\"merchant\"]\ndashboard = false\n[log]\nlevel = \"debug\"\n",
        )?;

        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "https://orders.example.com/api");
        assert_eq!(config.timeout()?, Duration::from_millis(750));
        let options = config.grid_options();
        assert_eq!(options.page_size, Some(30));
        assert_eq!(options.hidden_columns, vec!["merchant".to_owned()]);
        assert!(!config.show_dashboard());
        assert_eq!(config.log_level(), "debug");
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 2\n")?;
        let error = Config::load(&path).expect_err("v2 config should fail");
        assert!(error.to_string().contains("unsupported config version 2"));
        Ok(())
    }

    #[test]
    fn unsupported_page_size_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[grid]\npage_size = 25\n")?;
        let error = Config::load(&path).expect_err("page size 25 should fail");
        let message = format!("{error:#}");
        assert!(message.contains("grid.page_size"));
        assert!(message.contains("10, 20, 30, 50, 100"));
        Ok(())
    }

    #[test]
    fn hidden_columns_must_be_hideable() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[grid]\nhidden_columns = [\"id\"]\n")?;
        let error = Config::load(&path).expect_err("id cannot be hidden");
        assert!(format!("{error:#}").contains("column id cannot be hidden"));

        let (_temp, path) = write_config("version = 1\n[grid]\nhidden_columns = [\"colour\"]\n")?;
        let error = Config::load(&path).expect_err("unknown column");
        assert!(format!("{error:#}").contains("unknown column \"colour\""));
        Ok(())
    }

    #[test]
    fn non_http_base_url_is_rejected() -> Result<()> {
        let (_temp, path) =
            write_config("version = 1\n[remote]\nbase_url = \"ftp://orders.example.com\"\n")?;
        let error = Config::load(&path).expect_err("ftp base url should fail");
        assert!(error.to_string().contains("must use http or https"));
        Ok(())
    }

    #[test]
    fn relative_log_file_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nfile = \"orderdesk.log\"\n")?;
        let error = Config::load(&path).expect_err("relative log file should fail");
        assert!(error.to_string().contains("must be an absolute path"));
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(CONFIG_PATH_ENV, &override_path);
        }
        let resolved = Config::default_path()?;
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(CONFIG_PATH_ENV);
        }
        assert_eq!(resolved, override_path);
        Ok(())
    }

    #[test]
    fn base_url_env_applies_only_when_file_omits_it() -> Result<()> {
        let _guard = env_lock();
        let (_temp, without) = write_config("version = 1\n")?;
        let (_temp2, with) =
            write_config("version = 1\n[remote]\nbase_url = \"http://configured:9000\"\n")?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var(BASE_URL_ENV, "http://from-env:8080/");
        }
        let from_env = Config::load(&without)?.base_url();
        let from_file = Config::load(&with)?.base_url();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var(BASE_URL_ENV);
        }
        assert_eq!(from_env, "http://from-env:8080");
        assert_eq!(from_file, "http://configured:9000");
        Ok(())
    }

    #[test]
    fn timeout_parses_ms_seconds_and_minutes() -> Result<()> {
        assert_eq!(parse_duration("500ms")?, Duration::from_millis(500));
        assert_eq!(parse_duration("5s")?, Duration::from_secs(5));
        assert_eq!(parse_duration("2m")?, Duration::from_secs(120));
        Ok(())
    }

    #[test]
    fn timeout_rejects_invalid_and_zero_values() -> Result<()> {
        for raw in ["oops", "5h", "ms", "-1s", "1.5m"] {
            let error = parse_duration(raw).expect_err("invalid duration should fail");
            let message = error.to_string();
            assert!(message.contains("invalid duration"), "{raw}: {message}");
            assert!(message.contains("<N>ms"), "{raw}: {message}");
        }

        let (_temp, path) = write_config("version = 1\n[remote]\ntimeout = \"0s\"\n")?;
        let error = Config::load(&path).expect_err("zero timeout should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips_through_load() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[remote]"));
        assert!(example.contains("[grid]"));
        assert!(example.contains("[log]"));

        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.base_url(), "http://localhost:8000");
        Ok(())
    }
}
