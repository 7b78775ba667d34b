//! 환경 변수 설정 모듈.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes the environment by loading the .env file.
fn init_env() {
    INIT.call_once(|| {
        if let Err(e) = dotenvy::dotenv() {
            tracing::debug!("No .env file loaded: {e}");
        }
    });
}

/// Retrieves an environment variable by key.
///
/// If the variable is not set, returns the provided default value.
/// If no default is provided and the variable is not set, returns an empty string.
#[must_use]
pub fn get_env(key: &str, default: Option<&str>) -> String {
    init_env();
    env::var(key).unwrap_or_else(|_| default.unwrap_or("").to_string())
}

/// Retrieves an environment variable as a parsed type.
#[must_use]
pub fn get_env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    init_env();
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Splits a comma separated list, dropping blank entries.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Application configuration loaded from environment variables.
///
/// The three command line flags (`--http`, `--debug`, `--hour`) are merged in
/// by [`AppConfig::with_cli`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Server settings
    pub http_binding: String,
    pub debug: bool,

    // API authentication (empty disables the check)
    pub api_key: String,

    // Data service
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout_secs: u64,

    // Radar generation
    pub radar_hour: String,
    pub github_access_token: String,
    pub github_api_url: String,
    pub radar_repo: String,
    pub radar_mention: String,

    // Email subsystem
    pub allowed_senders: Vec<String>,
    pub from_email: String,
    pub aws_region: String,
    pub inbox_channel_buffer: usize,

    // Sentry settings
    pub sentry_dsn: String,
    pub sentry_traces_sample_rate: f32,
}

impl AppConfig {
    /// Creates a new `AppConfig` from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            http_binding: get_env("RADAR_HTTP", Some(":8291")),
            debug: get_env_parsed("DEBUG", false),

            api_key: get_env("API_KEY", None),

            database_url: get_env("RADAR_DATABASE_URL", Some("sqlite://radar.db?mode=rwc")),
            db_max_connections: get_env_parsed("DB_MAX_CONNECTIONS", 5),
            db_acquire_timeout_secs: get_env_parsed("DB_ACQUIRE_TIMEOUT_SECS", 10),

            radar_hour: get_env("RADAR_HOUR", Some("03")),
            github_access_token: get_env("GITHUB_ACCESS_TOKEN", None),
            github_api_url: get_env("GITHUB_API_URL", Some("https://api.github.com")),
            radar_repo: get_env("RADAR_REPO", None),
            radar_mention: get_env("RADAR_MENTION", None),

            allowed_senders: split_list(&get_env("RADAR_ALLOWED_SENDERS", None)),
            from_email: get_env("RADAR_FROM_EMAIL", None),
            aws_region: get_env("AWS_REGION", Some("us-east-1")),
            inbox_channel_buffer: get_env_parsed("INBOX_CHANNEL_BUFFER", 100),

            sentry_dsn: get_env("SENTRY_DSN", None),
            sentry_traces_sample_rate: get_env_parsed("SENTRY_TRACES_SAMPLE_RATE", 0.1),
        }
    }

    /// Overrides the flag-backed settings with parsed command line values.
    #[must_use]
    pub fn with_cli(mut self, cli: &super::Cli) -> Self {
        self.http_binding.clone_from(&cli.http);
        self.debug = cli.debug;
        self.radar_hour.clone_from(&cli.hour);
        self
    }
}
