//! Configuration management for clipmirror.
//!
//! Configuration is read from `~/.config/clipmirror/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

pub mod interval;

pub use interval::{format_interval, parse_interval};

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The feed platform allows one request every two seconds.
pub const MIN_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poller: PollerConfig,
    pub workers: WorkerConfig,
    pub store: StoreConfig,
    pub http: HttpConfig,
    pub reddit: RedditConfig,
    pub twitter: TwitterConfig,
    pub streamable: StreamableConfig,
    pub reply: ReplyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Seconds to sleep between sweeps
    pub interval_secs: u64,
    /// How many of the newest items to pull per feed
    pub items_per_feed: usize,
    pub feeds: Vec<String>,
    /// Feeds where the bot's reply is distinguished and stickied
    pub pin_feeds: Vec<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_INTERVAL_SECS,
            items_per_feed: 25,
            feeds: default_feeds(),
            pin_feeds: vec!["pacefalmd".to_string(), "hockey".to_string()],
        }
    }
}

impl PollerConfig {
    /// Sleep between sweeps, never below the platform rate limit
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(MIN_INTERVAL_SECS))
    }
}

fn default_feeds() -> Vec<String> {
    [
        "pacefalmd",
        "hockey",
        // pacific
        "anaheimducks",
        "coyotes",
        "calgaryflames",
        "edmontonoilers",
        "losangeleskings",
        "sanjosesharks",
        "canucks",
        // central
        "coloradoavalanche",
        "dallasstars",
        "wildhockey",
        "predators",
        "stlouisblues",
        "winnipegjets",
        // atlantic
        "bostonbruins",
        "sabres",
        "detroitredwings",
        "floridapanthers",
        "habs",
        "ottawasenators",
        "tampabaylightning",
        "leafs",
        // metro
        "canes",
        "bluejackets",
        "devils",
        "newyorkislanders",
        "rangers",
        "flyers",
        "penguins",
        "caps",
        "HalifaxMooseheads",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub count: usize,
    pub queue_capacity: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            count: 10,
            queue_capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database path (None = platform data dir)
    pub path: Option<PathBuf>,
    pub namespace: String,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            namespace: crate::store::sqlite::DEFAULT_NAMESPACE.to_string(),
            busy_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: concat!("clipmirror/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
    pub auth_url: String,
    pub api_url: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            user_agent: "linux:io.pacefalm.converter_bot:1.0.4 (by /u/pacefalmd)".to_string(),
            auth_url: "https://www.reddit.com/api/v1/access_token".to_string(),
            api_url: "https://oauth.reddit.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub bearer_token: String,
    pub api_url: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            bearer_token: String::new(),
            api_url: "https://api.twitter.com/1.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StreamableConfig {
    pub username: String,
    pub password: String,
    pub api_url: String,
    pub share_url: String,
}

impl Default for StreamableConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            api_url: "https://api.streamable.com".to_string(),
            share_url: "https://streamable.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    pub footer: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            footer: "^^^issues? ^^^contact ^^^/u/pacefalmd".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also write logs to this file
    pub file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from `path`, or the default path when `None`.
    ///
    /// If the default config file doesn't exist, creates one with comments.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            if path.is_some() {
                return Err(ConfigError::Io {
                    path: config_path,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
                });
            }
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/clipmirror/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("clipmirror").join("config.toml"))
    }

    /// Get the default database path: `<data_dir>/clipmirror/seen.db`
    pub fn default_db_path() -> Result<PathBuf, ConfigError> {
        let data_dir = dirs::data_dir().ok_or(ConfigError::NoConfigDir)?;
        let dir = data_dir.join("clipmirror");
        fs::create_dir_all(&dir).map_err(|e| ConfigError::Io {
            path: dir.clone(),
            source: e,
        })?;
        Ok(dir.join("seen.db"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poller.feeds.is_empty() {
            return Err(ConfigError::Invalid("poller.feeds must not be empty".into()));
        }
        if self.poller.items_per_feed == 0 {
            return Err(ConfigError::Invalid(
                "poller.items_per_feed must be at least 1".into(),
            ));
        }
        if self.workers.count == 0 {
            return Err(ConfigError::Invalid("workers.count must be at least 1".into()));
        }
        if self.workers.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "workers.queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# clipmirror configuration
#
# Credentials are left blank; fill them in before running `clipmirror run`.

[poller]
# Seconds between sweeps (minimum 2, the feed platform's rate limit)
interval_secs = 30

# Newest items fetched per feed each sweep
items_per_feed = 25

# Replies in these feeds are distinguished and stickied
pin_feeds = ["pacefalmd", "hockey"]

# Feeds to watch. Omit to use the built-in list.
# feeds = ["hockey", "leafs"]

[workers]
# Items processed concurrently
count = 10

# Items waiting for a worker before the poller blocks
queue_capacity = 1024

[store]
# path = "/var/lib/clipmirror/seen.db"
namespace = "async-convertor_bot"
busy_timeout_ms = 5000

[http]
# Per-request timeout for every outbound call
timeout_secs = 10

[reddit]
client_id = ""
client_secret = ""
username = ""
password = ""

[twitter]
bearer_token = ""

[streamable]
username = ""
password = ""

[reply]
footer = "^^^issues? ^^^contact ^^^/u/pacefalmd"

[logging]
# file = "/var/log/clipmirror.log"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
