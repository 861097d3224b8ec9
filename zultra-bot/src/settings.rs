//! Environment-sourced settings, validated once at load, plus a reloadable
//! store handing out cheap `Arc` snapshots.

use std::collections::HashSet;
use std::env;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::{info, warn};
use zultra_core::{BotError, PermissionTier, Result};

pub const DEFAULT_RATE_LIMIT_MESSAGES: usize = 30;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const MAX_RATE_LIMIT_MESSAGES: usize = 1000;
const MAX_RATE_LIMIT_WINDOW_SECS: u64 = 3600;
const MIN_TOKEN_SECRET_LEN: usize = 30;

const DEFAULT_SPAM_KEYWORDS: [&str; 5] = ["spam", "scam", "bitcoin", "crypto", "investment"];

/// Deployment environment name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Testing,
}

impl Environment {
    fn parse(value: &str) -> Result<Self> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "testing" => Ok(Self::Testing),
            other => Err(BotError::Config(format!("unknown ENVIRONMENT: {}", other))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Testing => "testing",
        }
    }
}

/// Process configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub encryption_key: Option<String>,
    pub environment: Environment,
    pub rate_limit_messages: usize,
    pub rate_limit_window_secs: u64,
    pub spam_keywords: Vec<String>,
    pub owner_ids: HashSet<i64>,
    pub admin_ids: HashSet<i64>,
    pub webhook_host: String,
    pub webhook_port: u16,
    pub webhook_path: String,
    pub webhook_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub log_file: Option<String>,
}

impl Settings {
    /// Loads and validates settings. If `token` is provided it overrides
    /// `BOT_TOKEN`.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token.or_else(|| env::var("BOT_TOKEN").ok()) {
            Some(token) => token,
            None => return Err(BotError::Config("BOT_TOKEN not set".to_string())),
        };
        validate_token(&bot_token)?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:zultra.db".to_string());
        let redis_url = env::var("REDIS_URL").ok();
        let encryption_key = env::var("ENCRYPTION_KEY").ok();
        let environment = Environment::parse(
            &env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        )?;

        let rate_limit_messages =
            parse_env_number("RATE_LIMIT_MESSAGES", DEFAULT_RATE_LIMIT_MESSAGES)?;
        if rate_limit_messages == 0 || rate_limit_messages > MAX_RATE_LIMIT_MESSAGES {
            return Err(BotError::Config(format!(
                "RATE_LIMIT_MESSAGES must be between 1 and {}",
                MAX_RATE_LIMIT_MESSAGES
            )));
        }
        let rate_limit_window_secs =
            parse_env_number("RATE_LIMIT_WINDOW", DEFAULT_RATE_LIMIT_WINDOW_SECS)?;
        if rate_limit_window_secs == 0 || rate_limit_window_secs > MAX_RATE_LIMIT_WINDOW_SECS {
            return Err(BotError::Config(format!(
                "RATE_LIMIT_WINDOW must be between 1 and {} seconds",
                MAX_RATE_LIMIT_WINDOW_SECS
            )));
        }

        let spam_keywords = parse_keywords(env::var("SPAM_KEYWORDS").ok());
        let owner_ids = parse_id_list(&env::var("OWNER_IDS").unwrap_or_default());
        let admin_ids = parse_id_list(&env::var("ADMIN_IDS").unwrap_or_default());

        let webhook_host = env::var("WEBHOOK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let webhook_port = parse_env_number("WEBHOOK_PORT", 8443u16)?;
        let webhook_path = env::var("WEBHOOK_PATH").unwrap_or_else(|_| "/webhook".to_string());
        if !webhook_path.starts_with('/') {
            return Err(BotError::Config(format!(
                "WEBHOOK_PATH must start with '/': {}",
                webhook_path
            )));
        }
        let webhook_url = env::var("WEBHOOK_URL").ok();

        let openai_api_key = env::var("OPENAI_API_KEY").ok();
        let gemini_api_key = env::var("GEMINI_API_KEY").ok();
        let log_file = env::var("LOG_FILE").ok();

        Ok(Self {
            bot_token,
            database_url,
            redis_url,
            encryption_key,
            environment,
            rate_limit_messages,
            rate_limit_window_secs,
            spam_keywords,
            owner_ids,
            admin_ids,
            webhook_host,
            webhook_port,
            webhook_path,
            webhook_url,
            openai_api_key,
            gemini_api_key,
            log_file,
        })
    }

    pub fn is_owner(&self, user_id: i64) -> bool {
        self.owner_ids.contains(&user_id)
    }

    /// Owners count as admins.
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.is_owner(user_id) || self.admin_ids.contains(&user_id)
    }

    pub fn tier_for(&self, user_id: i64) -> PermissionTier {
        if self.is_owner(user_id) {
            PermissionTier::Owner
        } else if self.admin_ids.contains(&user_id) {
            PermissionTier::Admin
        } else {
            PermissionTier::User
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }
}

/// Telegram tokens are `<numeric id>:<secret>`.
fn validate_token(token: &str) -> Result<()> {
    let ok = token.split_once(':').is_some_and(|(id, secret)| {
        !id.is_empty()
            && id.chars().all(|c| c.is_ascii_digit())
            && secret.len() >= MIN_TOKEN_SECRET_LEN
    });
    if ok {
        Ok(())
    } else {
        Err(BotError::Config(
            "BOT_TOKEN does not look like a Telegram bot token".to_string(),
        ))
    }
}

fn parse_env_number<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| BotError::Config(format!("{} is not a valid number: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

/// Lenient comma-separated id parse; non-numeric entries are dropped.
fn parse_id_list(raw: &str) -> HashSet<i64> {
    raw.split(',')
        .filter_map(|part| part.trim().parse::<i64>().ok())
        .collect()
}

/// Comma-separated keywords, lowercased; the stock denylist when unset or
/// empty.
fn parse_keywords(raw: Option<String>) -> Vec<String> {
    let parsed: Vec<String> = raw
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if parsed.is_empty() {
        DEFAULT_SPAM_KEYWORDS
            .iter()
            .map(|keyword| keyword.to_string())
            .collect()
    } else {
        parsed
    }
}

/// Shared, reloadable settings. Readers take an `Arc<Settings>` snapshot;
/// `reload` swaps the snapshot only when the fresh load validates.
pub struct SettingsStore {
    current: RwLock<Arc<Settings>>,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            current: RwLock::new(Arc::new(settings)),
        }
    }

    pub fn current(&self) -> Arc<Settings> {
        self.current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Re-runs the environment load. A failed reload keeps the previous
    /// settings active and returns the validation error.
    pub fn reload(&self) -> Result<Arc<Settings>> {
        match Settings::load(None) {
            Ok(fresh) => {
                let fresh = Arc::new(fresh);
                *self.current.write().unwrap_or_else(|e| e.into_inner()) = fresh.clone();
                info!("Settings reloaded");
                Ok(fresh)
            }
            Err(e) => {
                warn!(error = %e, "Settings reload failed; keeping previous settings");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const TEST_TOKEN: &str = "123456789:AAH-abcdefghijklmnopqrstuvwxyz123456";

    fn clear_env() {
        for name in [
            "BOT_TOKEN",
            "DATABASE_URL",
            "REDIS_URL",
            "ENCRYPTION_KEY",
            "ENVIRONMENT",
            "RATE_LIMIT_MESSAGES",
            "RATE_LIMIT_WINDOW",
            "SPAM_KEYWORDS",
            "OWNER_IDS",
            "ADMIN_IDS",
            "WEBHOOK_HOST",
            "WEBHOOK_PORT",
            "WEBHOOK_PATH",
            "WEBHOOK_URL",
            "OPENAI_API_KEY",
            "GEMINI_API_KEY",
            "LOG_FILE",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    #[serial]
    fn test_load_with_defaults() {
        clear_env();
        env::set_var("BOT_TOKEN", TEST_TOKEN);

        let settings = Settings::load(None).expect("Failed to load settings");
        assert_eq!(settings.bot_token, TEST_TOKEN);
        assert_eq!(settings.database_url, "sqlite:zultra.db");
        assert_eq!(settings.environment, Environment::Development);
        assert_eq!(settings.rate_limit_messages, 30);
        assert_eq!(settings.rate_limit_window_secs, 60);
        assert_eq!(
            settings.spam_keywords,
            vec!["spam", "scam", "bitcoin", "crypto", "investment"]
        );
        assert!(settings.owner_ids.is_empty());
        assert!(settings.admin_ids.is_empty());
        assert_eq!(settings.webhook_host, "0.0.0.0");
        assert_eq!(settings.webhook_port, 8443);
        assert_eq!(settings.webhook_path, "/webhook");
        assert!(settings.webhook_url.is_none());
        assert!(settings.redis_url.is_none());
    }

    #[test]
    #[serial]
    fn test_token_shape_is_validated() {
        clear_env();

        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        env::set_var("BOT_TOKEN", "not-a-token");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        // Non-numeric id part.
        env::set_var("BOT_TOKEN", "12ab:AAH-abcdefghijklmnopqrstuvwxyz123456");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        // Secret too short.
        env::set_var("BOT_TOKEN", "123456789:short");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        env::set_var("BOT_TOKEN", TEST_TOKEN);
        assert!(Settings::load(None).is_ok());
    }

    #[test]
    #[serial]
    fn test_webhook_path_must_be_rooted() {
        clear_env();
        env::set_var("BOT_TOKEN", TEST_TOKEN);

        env::set_var("WEBHOOK_PATH", "webhook");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        env::set_var("WEBHOOK_PATH", "/hooks/telegram");
        let settings = Settings::load(None).expect("Failed to load settings");
        assert_eq!(settings.webhook_path, "/hooks/telegram");
    }

    #[test]
    #[serial]
    fn test_cli_token_overrides_env() {
        clear_env();
        env::set_var("BOT_TOKEN", "123456789:short");

        let settings =
            Settings::load(Some(TEST_TOKEN.to_string())).expect("Failed to load settings");
        assert_eq!(settings.bot_token, TEST_TOKEN);
    }

    #[test]
    #[serial]
    fn test_id_lists_drop_non_numeric_entries() {
        clear_env();
        env::set_var("BOT_TOKEN", TEST_TOKEN);
        env::set_var("OWNER_IDS", "123, abc, 456,,");
        env::set_var("ADMIN_IDS", "789");

        let settings = Settings::load(None).expect("Failed to load settings");
        assert_eq!(settings.owner_ids, HashSet::from([123, 456]));
        assert_eq!(settings.admin_ids, HashSet::from([789]));
        assert!(settings.is_owner(123));
        assert!(settings.is_admin(123));
        assert!(settings.is_admin(789));
        assert!(!settings.is_admin(42));
        assert_eq!(settings.tier_for(123), PermissionTier::Owner);
        assert_eq!(settings.tier_for(789), PermissionTier::Admin);
        assert_eq!(settings.tier_for(42), PermissionTier::User);
    }

    #[test]
    #[serial]
    fn test_rate_limit_bounds() {
        clear_env();
        env::set_var("BOT_TOKEN", TEST_TOKEN);

        env::set_var("RATE_LIMIT_MESSAGES", "0");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        env::set_var("RATE_LIMIT_MESSAGES", "2000");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        env::set_var("RATE_LIMIT_MESSAGES", "abc");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        env::set_var("RATE_LIMIT_MESSAGES", "10");
        env::set_var("RATE_LIMIT_WINDOW", "4000");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        env::set_var("RATE_LIMIT_WINDOW", "120");
        let settings = Settings::load(None).expect("Failed to load settings");
        assert_eq!(settings.rate_limit_messages, 10);
        assert_eq!(settings.rate_limit_window(), Duration::from_secs(120));
    }

    #[test]
    #[serial]
    fn test_keywords_are_lowercased_and_trimmed() {
        clear_env();
        env::set_var("BOT_TOKEN", TEST_TOKEN);
        env::set_var("SPAM_KEYWORDS", " Bitcoin , SCAM ,,");

        let settings = Settings::load(None).expect("Failed to load settings");
        assert_eq!(settings.spam_keywords, vec!["bitcoin", "scam"]);
    }

    #[test]
    #[serial]
    fn test_unknown_environment_is_rejected() {
        clear_env();
        env::set_var("BOT_TOKEN", TEST_TOKEN);
        env::set_var("ENVIRONMENT", "staging");
        assert!(matches!(Settings::load(None), Err(BotError::Config(_))));

        env::set_var("ENVIRONMENT", "production");
        let settings = Settings::load(None).expect("Failed to load settings");
        assert_eq!(settings.environment, Environment::Production);
    }

    #[test]
    #[serial]
    fn test_store_keeps_previous_settings_on_failed_reload() {
        clear_env();
        env::set_var("BOT_TOKEN", TEST_TOKEN);

        let initial = Settings::load(None).expect("Failed to load settings");
        let store = SettingsStore::new(initial);
        assert_eq!(store.current().environment, Environment::Development);

        env::set_var("ENVIRONMENT", "bogus");
        assert!(store.reload().is_err());
        assert_eq!(store.current().environment, Environment::Development);

        env::set_var("ENVIRONMENT", "testing");
        store.reload().expect("Failed to reload settings");
        assert_eq!(store.current().environment, Environment::Testing);
    }
}
