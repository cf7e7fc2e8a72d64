//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, Local};
use quill_infra::{DEFAULT_STORAGE_KEY, SchedulerConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory for the durable post slot. In-memory storage when unset.
    pub data_dir: Option<PathBuf>,
    pub pipeline: PipelineConfig,
}

/// Settings of the submission and promotion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub storage_key: String,
    /// Offset zone-less input is read in and display timestamps are rendered in.
    pub zone: FixedOffset,
    pub scheduler: SchedulerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            zone: *Local::now().offset(),
            scheduler: SchedulerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            data_dir: env::var("QUILL_DATA_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            pipeline: PipelineConfig::from_env(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let zone = match env::var("QUILL_UTC_OFFSET") {
            Ok(raw) => parse_offset(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Invalid QUILL_UTC_OFFSET, using local offset");
                *Local::now().offset()
            }),
            Err(_) => *Local::now().offset(),
        };

        Self {
            storage_key: env::var("QUILL_STORAGE_KEY")
                .unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string()),
            zone,
            scheduler: SchedulerConfig::from_env(),
        }
    }
}

/// Parse `+HH:MM`, `-HH:MM` or `Z`.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    DateTime::parse_from_rfc3339(&format!("2000-01-01T00:00:00{}", raw.trim()))
        .ok()
        .map(|at| *at.offset())
}
