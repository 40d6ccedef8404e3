use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{defaults, env_keys};
use crate::error::ConfigError;

#[derive(Clone, Debug, Deserialize)]
pub struct SheetConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_tab")]
    pub tab: String,
    /// Labels that must all appear in the header row (case-insensitive).
    #[serde(default = "default_required_headers")]
    pub required_headers: Vec<String>,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            tab: default_tab(),
            required_headers: default_required_headers(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_op_timeout_secs")]
    pub op_timeout_secs: u64,
    pub snapshot_path: Option<PathBuf>,
    pub audit_log_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            op_timeout_secs: default_store_op_timeout_secs(),
            snapshot_path: None,
            audit_log_path: None,
        }
    }
}

#[derive(Clone, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    /// Override for tests and self-hosted Bot API servers.
    pub api_base: Option<String>,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sheet: SheetConfig,
    #[serde(default)]
    pub store: StoreConfig,
    pub telegram: Option<TelegramConfig>,
    #[serde(default = "default_notify_timeout_secs")]
    pub notify_timeout_secs: u64,
    /// Six-field cron expression (with seconds) for scheduled runs.
    pub schedule: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet: SheetConfig::default(),
            store: StoreConfig::default(),
            telegram: None,
            notify_timeout_secs: default_notify_timeout_secs(),
            schedule: None,
        }
    }
}

fn default_tab() -> String {
    defaults::SHEET_TAB.to_string()
}

fn default_required_headers() -> Vec<String> {
    defaults::REQUIRED_HEADERS.iter().map(|s| s.to_string()).collect()
}

fn default_fetch_timeout_secs() -> u64 {
    defaults::FETCH_TIMEOUT_SECS
}

fn default_store_op_timeout_secs() -> u64 {
    defaults::STORE_OP_TIMEOUT_SECS
}

fn default_notify_timeout_secs() -> u64 {
    defaults::NOTIFY_TIMEOUT_SECS
}

impl AppConfig {
    /// Read `path` (if present), apply environment overrides, validate.
    ///
    /// A missing file is allowed so that container deployments can configure
    /// everything through the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Self::from_yaml_str(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Environment wins over the file. Telegram needs both variables or neither.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(env_keys::SHEET_URL) {
            self.sheet.url = url;
        }
        if let Some(tab) = get(env_keys::SHEET_TAB) {
            self.sheet.tab = tab;
        }
        if let Some(path) = get(env_keys::SIGNAL_SNAPSHOT_PATH) {
            self.store.snapshot_path = Some(PathBuf::from(path));
        }
        if let Some(path) = get(env_keys::AUDIT_LOG_PATH) {
            self.store.audit_log_path = Some(PathBuf::from(path));
        }

        match (get(env_keys::TELEGRAM_BOT_TOKEN), get(env_keys::TELEGRAM_CHAT_ID)) {
            (Some(bot_token), Some(chat_id)) => {
                let api_base = self.telegram.as_ref().and_then(|t| t.api_base.clone());
                self.telegram = Some(TelegramConfig {
                    bot_token,
                    chat_id,
                    api_base,
                });
            }
            (Some(_), None) => {
                return Err(ConfigError::Invalid(format!(
                    "{} is set but {} is missing",
                    env_keys::TELEGRAM_BOT_TOKEN,
                    env_keys::TELEGRAM_CHAT_ID
                )))
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid(format!(
                    "{} is set but {} is missing",
                    env_keys::TELEGRAM_CHAT_ID,
                    env_keys::TELEGRAM_BOT_TOKEN
                )))
            }
            (None, None) => {}
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sheet.url.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "sheet.url is empty (set it in the config file or {})",
                env_keys::SHEET_URL
            )));
        }

        let parsed = url::Url::parse(&self.sheet.url)
            .map_err(|e| ConfigError::Invalid(format!("sheet.url is not a valid URL: {}", e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "sheet.url must be http(s), got '{}'",
                parsed.scheme()
            )));
        }

        if self.sheet.required_headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "sheet.required_headers must name at least one label".to_string(),
            ));
        }

        if self.sheet.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("sheet.fetch_timeout_secs must be > 0".to_string()));
        }
        if self.store.op_timeout_secs == 0 {
            return Err(ConfigError::Invalid("store.op_timeout_secs must be > 0".to_string()));
        }
        if self.notify_timeout_secs == 0 {
            return Err(ConfigError::Invalid("notify_timeout_secs must be > 0".to_string()));
        }

        if let Some(tg) = &self.telegram {
            if tg.bot_token.trim().is_empty() || tg.chat_id.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "telegram.bot_token and telegram.chat_id must both be set".to_string(),
                ));
            }
        }

        if let Some(schedule) = &self.schedule {
            let fields = schedule.split_whitespace().count();
            if !(6..=7).contains(&fields) {
                return Err(ConfigError::Invalid(format!(
                    "schedule '{}' must be a 6 or 7 field cron expression (seconds first)",
                    schedule
                )));
            }
        }

        Ok(())
    }
}
