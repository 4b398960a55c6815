use chrono::TimeDelta;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub streaming: StreamingConfig,
    pub schedule: ScheduleServiceConfig,
    pub recorder: RecorderServiceConfig,
    pub broadcast: BroadcastConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub http_port: u16,
    /// Fixed SRT ingest port the input listener binds for every reservation.
    pub srt_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 10300,
            // Same number as HTTP is fine: SRT listens on UDP.
            srt_port: 10300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// How long issued credentials stay valid before the input listener
    /// gives up waiting for the inbound connection.
    pub timeout_seconds: u64,
    /// Half-width of the window around "now" searched for event instances.
    pub window_minutes: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            window_minutes: 60,
        }
    }
}

impl StreamingConfig {
    #[must_use]
    pub fn timeout(&self) -> TimeDelta {
        TimeDelta::seconds(self.timeout_seconds.min(i64::MAX as u64) as i64)
    }

    #[must_use]
    pub fn window(&self) -> TimeDelta {
        TimeDelta::minutes(self.window_minutes.min(i64::MAX as u64) as i64)
    }
}

/// Location of the external schedule service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleServiceConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub connect_timeout_seconds: u64,
}

impl Default for ScheduleServiceConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 10500,
            connect_timeout_seconds: 10,
        }
    }
}

impl ScheduleServiceConfig {
    /// Base URL of the schedule service HTTP API.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Location of the external recording service. The host doubles as the
/// target of the recording sink when a reservation requests recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderServiceConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub connect_timeout_seconds: u64,
}

impl Default for RecorderServiceConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 10700,
            connect_timeout_seconds: 10,
        }
    }
}

impl RecorderServiceConfig {
    /// Base URL of the recording service HTTP API.
    #[must_use]
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Target of the live-broadcast sink every pipeline fans out to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub host: String,
    pub port: u16,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 10100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Load configuration from multiple sources with priority:
    /// 1. Environment variables (highest priority)
    /// 2. Config file (if provided)
    /// 3. Defaults (lowest priority)
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Load config file if provided
        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::with_name(path));
            }
        }

        // Override with environment variables (AIRLOCK_SERVER_HOST, etc.)
        builder = builder.add_source(
            Environment::with_prefix("AIRLOCK")
                .separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Load from environment variables only (for Docker/K8s)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Load from file path
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Self::load(Some(path))
    }

    /// Check for misconfigurations worth failing fast on.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.server.host.is_empty() {
            errors.push("server.host must not be empty".to_string());
        }
        if self.streaming.timeout_seconds == 0 {
            errors.push("streaming.timeout_seconds must be greater than zero".to_string());
        }
        if self.streaming.window_minutes == 0 {
            errors.push("streaming.window_minutes must be greater than zero".to_string());
        }
        if self.schedule.host.is_empty() {
            errors.push("schedule.host must not be empty".to_string());
        }
        if self.recorder.host.is_empty() {
            errors.push("recorder.host must not be empty".to_string());
        }
        if self.broadcast.host.is_empty() {
            errors.push("broadcast.host must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Get HTTP address
    #[must_use]
    pub fn http_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.http_port)
    }

    /// Get the SRT ingest address the input listener binds.
    #[must_use]
    pub fn srt_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.srt_port)
    }

    /// Get the SRT address of the live-broadcast sink.
    #[must_use]
    pub fn broadcast_address(&self) -> String {
        format!("{}:{}", self.broadcast.host, self.broadcast.port)
    }
}
