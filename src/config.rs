use std::{path::{Path, PathBuf}, time::Duration};

use anyhow::Context;
use chrono::NaiveTime;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{
    delivery::DEFAULT_MAX_SEGMENT_LEN,
    keywords::{DEFAULT_KEYWORD_COUNT, DEFAULT_SKILL_COUNT},
    page_scrapers::companies::DEFAULT_SCRAPERS,
    schedule::DEFAULT_POLL_INTERVAL,
};

pub(crate) const CONFIG_PATH: &str = "config.toml";
pub(crate) const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
const DAILY_AT_FORMAT: &str = "%H:%M";


/// Where the daily report is posted.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TelegramConfig {
    /// The token given by BotFather. Overridden by `TELEGRAM_BOT_TOKEN` when set.
    #[validate(length(min = 1))]
    pub(crate) bot_token: String,
    /// A `@channelusername` or numeric chat id. The bot must be allowed to post there.
    #[validate(length(min = 1))]
    pub(crate) channel_id: String,
    #[serde(default = "default_parse_mode")]
    pub(crate) parse_mode: String,
}


/// Settings read from `config.toml`. Everything but `telegram` has a default.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct Config {
    #[serde(default = "default_log_level")]
    pub(crate) log_level: String,
    /// Local time of the daily run, as `HH:MM`
    #[serde(default = "default_daily_at")]
    #[validate(custom = "validate_daily_at")]
    pub(crate) daily_at: String,
    #[serde(default = "default_poll_interval_secs")]
    #[validate(range(min = 1))]
    pub(crate) poll_interval_secs: u64,
    /// Applies to every HTTP request, scraping and delivery alike
    #[serde(default = "default_http_timeout_secs")]
    #[validate(range(min = 1))]
    pub(crate) http_timeout_secs: u64,
    #[serde(default = "default_max_segment_len")]
    #[validate(range(min = 1))]
    pub(crate) max_segment_len: usize,
    #[serde(default = "default_keywords_per_job")]
    #[validate(range(min = 1))]
    pub(crate) keywords_per_job: usize,
    #[serde(default = "default_skills_per_job")]
    #[validate(range(min = 1))]
    pub(crate) skills_per_job: usize,
    /// Replaces the bundled English stopwords, one word per line
    #[serde(default)]
    pub(crate) stopwords_path: Option<PathBuf>,
    #[serde(default = "default_enabled_scrapers")]
    #[validate(custom = "validate_scrapers")]
    pub(crate) enabled_scrapers: Vec<String>,
    #[validate]
    pub(crate) telegram: TelegramConfig,
}


fn default_parse_mode() -> String {
    "Markdown".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_daily_at() -> String {
    "09:00".to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_max_segment_len() -> usize {
    DEFAULT_MAX_SEGMENT_LEN
}

fn default_keywords_per_job() -> usize {
    DEFAULT_KEYWORD_COUNT
}

fn default_skills_per_job() -> usize {
    DEFAULT_SKILL_COUNT
}

fn default_enabled_scrapers() -> Vec<String> {
    DEFAULT_SCRAPERS.iter().map(|s| s.to_string()).collect()
}


fn validate_daily_at(daily_at: &str) -> Result<(), ValidationError> {
    NaiveTime::parse_from_str(daily_at, DAILY_AT_FORMAT)
        .map(|_| ())
        .map_err(|_| ValidationError::new("daily_at must be HH:MM"))
}

fn validate_scrapers(scrapers: &[String]) -> Result<(), ValidationError> {
    if scrapers.iter().all(|s| DEFAULT_SCRAPERS.contains(&s.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown scraper name"))
    }
}


impl Config {
    /// Reads and validates the config file, applying environment overrides.
    pub(crate) fn load(path: &Path) -> anyhow::Result<Self> {
        let config = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let mut config: Config = toml::from_str(&config)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if let Ok(bot_token) = std::env::var(BOT_TOKEN_ENV) {
            config.telegram.bot_token = bot_token;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    pub(crate) fn daily_at(&self) -> anyhow::Result<NaiveTime> {
        NaiveTime::parse_from_str(&self.daily_at, DAILY_AT_FORMAT)
            .with_context(|| format!("daily_at {:?} must be HH:MM", self.daily_at))
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub(crate) fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [telegram]
        bot_token = "123:abc"
        channel_id = "@itjobs"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config: Config = toml::from_str(MINIMAL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.daily_at().unwrap(), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.http_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_segment_len, 4000);
        assert_eq!(config.keywords_per_job, 5);
        assert_eq!(config.skills_per_job, 5);
        assert_eq!(config.enabled_scrapers, DEFAULT_SCRAPERS);
        assert_eq!(config.telegram.parse_mode, "Markdown");
        assert!(config.stopwords_path.is_none());
    }

    #[test]
    fn full_config_is_read() {
        let config: Config = toml::from_str(r#"
            log_level = "debug"
            daily_at = "18:30"
            poll_interval_secs = 30
            max_segment_len = 2000
            stopwords_path = "stopwords.txt"
            enabled_scrapers = ["tcs", "lti"]

            [telegram]
            bot_token = "123:abc"
            channel_id = "-1001234567890"
            parse_mode = "HTML"
        "#).unwrap();
        config.validate().unwrap();

        assert_eq!(config.daily_at().unwrap(), NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.max_segment_len, 2000);
        assert_eq!(config.stopwords_path, Some(PathBuf::from("stopwords.txt")));
        assert_eq!(config.enabled_scrapers, ["tcs", "lti"]);
        assert_eq!(config.telegram.parse_mode, "HTML");
    }

    #[test]
    fn rejects_bad_values() {
        for bad in [
            "daily_at = \"9am\"",
            "daily_at = \"25:00\"",
            "max_segment_len = 0",
            "poll_interval_secs = 0",
            "enabled_scrapers = [\"tcs\", \"google\"]",
        ] {
            let config: Config = toml::from_str(&format!("{bad}\n{MINIMAL}")).unwrap();
            assert!(config.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn rejects_empty_telegram_settings() {
        let config: Config = toml::from_str(r#"
            [telegram]
            bot_token = ""
            channel_id = "@itjobs"
        "#).unwrap();
        assert!(config.validate().is_err());
    }

    // The only test touching TELEGRAM_BOT_TOKEN, so nothing races on it
    #[test]
    fn load_reads_the_file_and_applies_the_token_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_PATH);
        std::fs::write(&path, r#"
            daily_at = "07:45"

            [telegram]
            bot_token = ""
            channel_id = "@itjobs"
        "#).unwrap();

        std::env::set_var(BOT_TOKEN_ENV, "999:from-env");
        let loaded = Config::load(&path);
        std::env::set_var(BOT_TOKEN_ENV, "");
        let empty_token = Config::load(&path);
        std::env::remove_var(BOT_TOKEN_ENV);

        let config = loaded.unwrap();
        assert_eq!(config.telegram.bot_token, "999:from-env");
        assert_eq!(config.daily_at().unwrap(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());

        let err = empty_token.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid configuration"), "{err:#}");

        let missing = dir.path().join("missing.toml");
        let err = Config::load(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.toml"), "{err}");

        std::fs::write(&path, "daily_at = ").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"), "{err}");
    }

    #[test]
    fn missing_telegram_section_fails_to_parse() {
        assert!(toml::from_str::<Config>("daily_at = \"09:00\"").is_err());
    }
}
