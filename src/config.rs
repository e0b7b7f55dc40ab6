use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::render::DisplayZone;

const DEFAULT_ENV_PREFIX: &str = "CARES";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            username: String::new(),
            password: String::new(),
            user_agent: default_user_agent(),
            timeout: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    crate::blog::DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    format!("cares/{}", crate::VERSION)
}

fn default_timeout() -> Duration {
    Duration::from_secs(20)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default)]
    pub timezone: DisplayZone,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            timezone: DisplayZone::default(),
            placeholder: default_placeholder(),
        }
    }
}

fn default_locale() -> String {
    "en".into()
}

fn default_placeholder() -> String {
    crate::composer::DEFAULT_PLACEHOLDER.into()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_file")]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_file() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("cares").join("cares.log"))
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        if path.exists() {
            let from_file = read_config_file(path)?;
            cfg = merge_config(cfg, from_file);
        }
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = overlay_env(cfg, prefix);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.server.base_url.is_empty() {
        base.server.base_url = other.server.base_url;
    }
    if !other.server.username.is_empty() {
        base.server.username = other.server.username;
    }
    if !other.server.password.is_empty() {
        base.server.password = other.server.password;
    }
    if !other.server.user_agent.is_empty() {
        base.server.user_agent = other.server.user_agent;
    }
    if !other.server.timeout.is_zero() {
        base.server.timeout = other.server.timeout;
    }

    if !other.ui.locale.is_empty() {
        base.ui.locale = other.ui.locale;
    }
    base.ui.timezone = other.ui.timezone;
    if !other.ui.placeholder.is_empty() {
        base.ui.placeholder = other.ui.placeholder;
    }

    if !other.log.level.is_empty() {
        base.log.level = other.log.level;
    }
    if other.log.file.is_some() {
        base.log.file = other.log.file;
    }

    base
}

// Environment values apply on top of whatever the file set, key by key.
fn overlay_env(mut cfg: Config, prefix: &str) -> Config {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }
    cfg
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "server.base_url" => cfg.server.base_url = value,
        "server.username" => cfg.server.username = value,
        "server.password" => cfg.server.password = value,
        "server.user_agent" => cfg.server.user_agent = value,
        "server.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.server.timeout = duration;
            }
        }
        "ui.locale" => cfg.ui.locale = value,
        "ui.timezone" => {
            cfg.ui.timezone = match value.to_ascii_lowercase().as_str() {
                "utc" => DisplayZone::Utc,
                _ => DisplayZone::Local,
            };
        }
        "ui.placeholder" => cfg.ui.placeholder = value,
        "log.level" => cfg.log.level = value,
        "log.file" => cfg.log.file = Some(PathBuf::from(value)),
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("cares").join("config.yaml"))
}

pub fn save_server_credentials(
    path: Option<PathBuf>,
    username: &str,
    password: &str,
) -> Result<PathBuf> {
    let username = username.trim();

    anyhow::ensure!(
        !username.is_empty(),
        "config: server.username is required"
    );
    anyhow::ensure!(
        !username.contains(':'),
        "config: server.username must not contain ':'"
    );

    let path = if let Some(path) = path {
        path
    } else {
        default_config_path().context("config: unable to determine default config path")?
    };

    let mut cfg = if path.exists() {
        read_config_file(&path)?
    } else {
        Config::default()
    };

    cfg.server.username = username.to_string();
    cfg.server.password = password.to_string();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("config: failed to create directory {}", parent.display()))?;
    }

    let contents = serde_yaml::to_string(&cfg).context("config: failed to serialize config")?;
    fs::write(&path, contents)
        .with_context(|| format!("config: failed to write file {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    #[test]
    fn load_defaults_without_files() {
        let dir = tempdir().unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(dir.path().join("missing.yaml")),
            env_prefix: Some("CARES_TEST_DEFAULTS".into()),
        })
        .unwrap();
        assert_eq!(cfg.ui.locale, "en");
        assert_eq!(cfg.ui.placeholder, "new post");
        assert_eq!(cfg.server.base_url, crate::blog::DEFAULT_BASE_URL);
        assert_eq!(cfg.server.timeout, Duration::from_secs(20));
    }

    #[test]
    fn reads_yaml_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "server:\n  base_url: https://blog.example/\n  timeout: 5s\nui:\n  timezone: utc\n",
        )
        .unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("CARES_TEST_YAML".into()),
        })
        .unwrap();
        assert_eq!(cfg.server.base_url, "https://blog.example/");
        assert_eq!(cfg.server.timeout, Duration::from_secs(5));
        assert_eq!(cfg.ui.timezone, DisplayZone::Utc);
        assert_eq!(cfg.ui.locale, "en");
    }

    #[test]
    fn save_credentials_creates_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        save_server_credentials(Some(path.clone()), " writer ", "secret").unwrap();
        let saved = read_config_file(&path).unwrap();
        assert_eq!(saved.server.username, "writer");
        assert_eq!(saved.server.password, "secret");
    }

    #[test]
    fn save_credentials_rejects_colon() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(save_server_credentials(Some(path), "a:b", "x").is_err());
    }

    #[test]
    fn env_overrides() {
        env::set_var("CARES_TEST_ENV_UI__LOCALE", "en-GB");
        env::set_var("CARES_TEST_ENV_SERVER__TIMEOUT", "2m");
        let dir = tempdir().unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(dir.path().join("missing.yaml")),
            env_prefix: Some("CARES_TEST_ENV".into()),
        })
        .unwrap();
        assert_eq!(cfg.ui.locale, "en-GB");
        assert_eq!(cfg.server.timeout, Duration::from_secs(120));
        env::remove_var("CARES_TEST_ENV_UI__LOCALE");
        env::remove_var("CARES_TEST_ENV_SERVER__TIMEOUT");
    }
}
