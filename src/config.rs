use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::pr::WeeksBack;

const CONFIG_FILE: &str = ".weekly-updates.toml";

const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api";
const DEFAULT_CLAUDE_API_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-haiku-latest";

const DEFAULT_WEEKS_BACK: u8 = 2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Missing required setting: set {0} or add it to .weekly-updates.toml")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Weeks must be between 1 and {max} (got {weeks})")]
    WeeksOutOfRange { weeks: u8, max: u8 },
}

/// Top-level configuration loaded from .weekly-updates.toml.
///
/// Every field is optional in the file. Values missing from the file fall
/// back to the matching environment variable when they are read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub slack: SlackConfig,

    #[serde(default)]
    pub claude: ClaudeConfig,

    #[serde(default)]
    pub weeks: WeeksConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// Personal access token. Falls back to GITHUB_TOKEN.
    pub token: Option<String>,
    /// Login whose pull requests are tracked. Falls back to GITHUB_USERNAME.
    pub username: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlackConfig {
    /// Bot user OAuth token (xoxb-...). Falls back to SLACK_BOT_TOKEN.
    pub bot_token: Option<String>,
    /// Channel that receives every message. Falls back to SLACK_CHANNEL_ID.
    pub channel_id: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClaudeConfig {
    /// Optional; without it the executive summary always uses the fallback.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeeksConfig {
    pub default_back: Option<u8>,
    pub max_back: Option<u8>,
}

impl Config {
    /// Load configuration from .weekly-updates.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn github_token(&self) -> Result<String, ConfigError> {
        required(&self.github.token, "GITHUB_TOKEN")
    }

    pub fn github_username(&self) -> Result<String, ConfigError> {
        required(&self.github.username, "GITHUB_USERNAME")
    }

    pub fn github_api_url(&self) -> String {
        self.github
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
    }

    pub fn slack_bot_token(&self) -> Result<String, ConfigError> {
        required(&self.slack.bot_token, "SLACK_BOT_TOKEN")
    }

    pub fn slack_channel_id(&self) -> Result<String, ConfigError> {
        required(&self.slack.channel_id, "SLACK_CHANNEL_ID")
    }

    pub fn slack_api_url(&self) -> String {
        self.slack
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SLACK_API_URL.to_string())
    }

    /// Empty keys count as absent, matching a blank CLAUDE_API_KEY= line.
    pub fn claude_api_key(&self) -> Option<String> {
        optional(&self.claude.api_key, "CLAUDE_API_KEY").filter(|key| !key.trim().is_empty())
    }

    pub fn claude_model(&self) -> String {
        self.claude
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.to_string())
    }

    pub fn claude_api_url(&self) -> String {
        self.claude
            .api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_CLAUDE_API_URL.to_string())
    }

    pub fn default_weeks_back(&self) -> Result<u8, ConfigError> {
        Ok(numeric(self.weeks.default_back, "DEFAULT_WEEKS_BACK")?.unwrap_or(DEFAULT_WEEKS_BACK))
    }

    /// Configured maximum, clamped into `1..=WeeksBack::MAX`.
    pub fn max_weeks_back(&self) -> Result<u8, ConfigError> {
        let max = numeric(self.weeks.max_back, "MAX_WEEKS_BACK")?.unwrap_or(WeeksBack::MAX);
        Ok(max.clamp(WeeksBack::MIN, WeeksBack::MAX))
    }

    /// Apply the configured default to an optional CLI value and reject
    /// anything outside `1..=max_weeks_back()`.
    pub fn resolve_weeks(&self, requested: Option<u8>) -> Result<WeeksBack, ConfigError> {
        let weeks = match requested {
            Some(weeks) => weeks,
            None => self.default_weeks_back()?,
        };
        let max = self.max_weeks_back()?;
        if weeks > max {
            return Err(ConfigError::WeeksOutOfRange { weeks, max });
        }
        WeeksBack::new(weeks).ok_or(ConfigError::WeeksOutOfRange { weeks, max })
    }
}

fn optional(value: &Option<String>, env_key: &str) -> Option<String> {
    value.clone().or_else(|| std::env::var(env_key).ok())
}

fn required(value: &Option<String>, env_key: &'static str) -> Result<String, ConfigError> {
    optional(value, env_key)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(env_key))
}

fn numeric(value: Option<u8>, env_key: &'static str) -> Result<Option<u8>, ConfigError> {
    if value.is_some() {
        return Ok(value);
    }
    match std::env::var(env_key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key: env_key, value: raw }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_weeks(default_back: u8, max_back: u8) -> Config {
        Config {
            weeks: WeeksConfig {
                default_back: Some(default_back),
                max_back: Some(max_back),
            },
            ..Config::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.github.token.is_none());
        assert!(config.slack.channel_id.is_none());
        assert!(config.claude.model.is_none());
        assert_eq!(config.claude_model(), DEFAULT_CLAUDE_MODEL);
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[github]
token = "ghp_test"
username = "alice"

[slack]
bot_token = "xoxb-test"
channel_id = "C123"

[weeks]
default_back = 1
max_back = 3
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.github_token().unwrap(), "ghp_test");
        assert_eq!(config.github_username().unwrap(), "alice");
        assert_eq!(config.slack_bot_token().unwrap(), "xoxb-test");
        assert_eq!(config.slack_channel_id().unwrap(), "C123");
        assert_eq!(config.default_weeks_back().unwrap(), 1);
        assert_eq!(config.max_weeks_back().unwrap(), 3);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("weekly_updates_config_test.toml");
        std::fs::write(&path, "[github]\napi_url = \"http://localhost:9999\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.github_api_url(), "http://localhost:9999");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_from_rejects_bad_toml() {
        let path = std::env::temp_dir().join("weekly_updates_bad_config_test.toml");
        std::fs::write(&path, "[github\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_max_weeks_is_clamped_to_hard_bound() {
        assert_eq!(with_weeks(2, 10).max_weeks_back().unwrap(), 4);
        assert_eq!(with_weeks(2, 0).max_weeks_back().unwrap(), 1);
    }

    #[test]
    fn test_resolve_weeks_uses_default() {
        let weeks = with_weeks(3, 4).resolve_weeks(None).unwrap();
        assert_eq!(weeks.get(), 3);
    }

    #[test]
    fn test_resolve_weeks_accepts_bounds() {
        let config = with_weeks(2, 4);
        assert_eq!(config.resolve_weeks(Some(1)).unwrap().get(), 1);
        assert_eq!(config.resolve_weeks(Some(4)).unwrap().get(), 4);
    }

    #[test]
    fn test_resolve_weeks_rejects_out_of_range() {
        let config = with_weeks(2, 4);
        assert!(matches!(
            config.resolve_weeks(Some(0)),
            Err(ConfigError::WeeksOutOfRange { weeks: 0, max: 4 })
        ));
        assert!(matches!(
            config.resolve_weeks(Some(5)),
            Err(ConfigError::WeeksOutOfRange { weeks: 5, max: 4 })
        ));
    }

    #[test]
    fn test_resolve_weeks_respects_configured_max() {
        let config = with_weeks(1, 2);
        assert!(config.resolve_weeks(Some(3)).is_err());
    }

    #[test]
    fn test_blank_claude_key_is_treated_as_absent() {
        let config = Config {
            claude: ClaudeConfig {
                api_key: Some("   ".to_string()),
                ..ClaudeConfig::default()
            },
            ..Config::default()
        };
        assert!(config.claude_api_key().is_none());
    }
}
