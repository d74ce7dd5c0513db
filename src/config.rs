use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub zulip: ZulipSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub cron: CronSettings,
    #[serde(default)]
    pub messages: MessageSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZulipSettings {
    pub api_url: String,
    pub bot_email: String,
    #[serde(default)]
    pub api_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSettings {
    /// JSON file with an array of profiles loaded at startup
    pub seed_path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchingSettings {
    /// Search worker threads, defaults to available parallelism
    pub workers: Option<usize>,
    /// Depth expanded up front before handing subtrees to workers
    pub split_depth: Option<usize>,
    /// Seconds the daily run lets the search go on
    pub budget_secs: Option<u64>,
}

impl MatchingSettings {
    pub fn budget(&self) -> Duration {
        Duration::from_secs(self.budget_secs.unwrap_or(DEFAULT_MATCH_BUDGET_SECS))
    }
}

const DEFAULT_MATCH_BUDGET_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct CronSettings {
    #[serde(default = "default_require_header")]
    pub require_header: bool,
}

impl Default for CronSettings {
    fn default() -> Self {
        Self {
            require_header: default_require_header(),
        }
    }
}

fn default_require_header() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct MessageSettings {
    #[serde(default = "default_matched_message")]
    pub matched: String,
    #[serde(default = "default_odd_one_out_message")]
    pub odd_one_out: String,
    #[serde(default = "default_solo_message")]
    pub solo: String,
}

impl Default for MessageSettings {
    fn default() -> Self {
        Self {
            matched: default_matched_message(),
            odd_one_out: default_odd_one_out_message(),
            solo: default_solo_message(),
        }
    }
}

fn default_matched_message() -> String {
    "Hi there! You've been matched for a mock interview today. Say hello and find a time that works for both of you.".to_string()
}
fn default_odd_one_out_message() -> String {
    "Hi! An odd number of people signed up to pair today, so you didn't get a match. Sorry about that, try again tomorrow!".to_string()
}
fn default_solo_message() -> String {
    "Good morning! Here's your daily practice question reminder. Happy solving!".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl LoggingSettings {
    /// Human-readable multi-line output instead of the default format
    pub fn is_pretty(&self) -> bool {
        self.format.eq_ignore_ascii_case("pretty")
    }
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Environment variables (prefixed with PAIRBOT__, e.g.
    ///    PAIRBOT__LOGGING__LEVEL)
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // Local overrides for development
            .add_source(File::with_name("config/local").required(false))
            // e.g., PAIRBOT__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("PAIRBOT")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }
}

/// Apply well-known environment variables on top of the layered config
///
/// `ZULIP_API_KEY` keeps the bot password out of config files.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(api_key) = env::var("ZULIP_API_KEY") {
        builder = builder.set_override("zulip.api_key", api_key)?;
    }
    if let Ok(seed_path) = env::var("PAIRBOT_SEED_PATH") {
        builder = builder.set_override("store.seed_path", seed_path)?;
    }

    builder.build()
}
