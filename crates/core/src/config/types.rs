use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub teardown: TeardownConfig,
    #[serde(default)]
    pub aws: AwsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Pacing and polling for the teardown sequence.
///
/// The delays are a courtesy towards the Organizations API rate limits,
/// not a correctness requirement.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TeardownConfig {
    /// Pause after each delegated administrator deregistration (milliseconds).
    #[serde(default = "default_deregister_delay")]
    pub deregister_delay_ms: u64,

    /// Pause after each account close request (milliseconds).
    #[serde(default = "default_close_delay")]
    pub close_delay_ms: u64,

    /// Pause between suspension polling rounds (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Maximum number of suspension polling rounds.
    #[serde(default = "default_max_poll_attempts")]
    pub max_poll_attempts: u32,

    /// List everything but issue no deregister or close calls.
    #[serde(default)]
    pub dry_run: bool,
}

impl TeardownConfig {
    pub fn deregister_delay(&self) -> Duration {
        Duration::from_millis(self.deregister_delay_ms)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for TeardownConfig {
    fn default() -> Self {
        Self {
            deregister_delay_ms: default_deregister_delay(),
            close_delay_ms: default_close_delay(),
            poll_interval_ms: default_poll_interval(),
            max_poll_attempts: default_max_poll_attempts(),
            dry_run: false,
        }
    }
}

fn default_deregister_delay() -> u64 {
    2000 // 2 seconds
}

fn default_close_delay() -> u64 {
    15000 // 15 seconds
}

fn default_poll_interval() -> u64 {
    30000 // 30 seconds
}

fn default_max_poll_attempts() -> u32 {
    20
}

/// AWS SDK client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AwsConfig {
    /// Region override. Falls back to the SDK default provider chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Named profile from the shared config files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(default)]
    pub retry_mode: RetryMode,
    /// Total attempts per request, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            retry_mode: RetryMode::default(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

/// Retry strategy handed to the SDK client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    /// Standard retries plus client-side rate limiting.
    #[default]
    Adaptive,
    Standard,
}

/// Console output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Color-code status lines by severity.
    #[serde(default = "default_color")]
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: default_color(),
        }
    }
}

fn default_color() -> bool {
    true
}
