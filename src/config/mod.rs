pub mod cli;
pub mod toml_config;

pub use self::toml_config::TomlConfig;

use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    self, validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_MIN_FOLLOWERS: i64 = 1_000;
pub const DEFAULT_MAX_FOLLOWERS: i64 = 10_000_000_000;
pub const DEFAULT_MAX_SCAN_DEPTH: usize = 3;
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 10 * 1024 * 1024;

/// Everything the pipeline stages key on. Passed into `process` explicitly so
/// the pipeline stays pure and testable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Inclusive follower-count acceptance bounds.
    pub min_followers: i64,
    pub max_followers: i64,
    /// Recursion bound for the structure scan. Correctness constant: caps
    /// cost on pathological nesting.
    pub max_scan_depth: usize,
    /// Key the well-formed exports put the record array under.
    pub primary_key: String,
    /// Sub-object holding platform info (handle, bio, region).
    pub info_key: String,
    /// Sub-object holding statistics, and the performance object inside it.
    pub stats_key: String,
    pub performance_key: String,
    /// Sub-object holding pricing data.
    pub pricing_key: String,
    /// Required identifier field; records without it are dropped.
    pub id_field: String,
    /// Field names whose presence marks an element as a creator record.
    pub recognized_fields: Vec<String>,
    pub profile_url_prefix: String,
    /// Sentinel display name for records without a handle.
    pub unknown_name: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            min_followers: DEFAULT_MIN_FOLLOWERS,
            max_followers: DEFAULT_MAX_FOLLOWERS,
            max_scan_depth: DEFAULT_MAX_SCAN_DEPTH,
            primary_key: "creators".to_string(),
            info_key: "creatorTTInfo".to_string(),
            stats_key: "statisticData".to_string(),
            performance_key: "overallPerformance".to_string(),
            pricing_key: "esData".to_string(),
            id_field: "aioCreatorID".to_string(),
            recognized_fields: vec![
                "aioCreatorID".to_string(),
                "creatorTTInfo".to_string(),
                "statisticData".to_string(),
                "nickName".to_string(),
                "handleName".to_string(),
                "bio".to_string(),
                "followerCount".to_string(),
                "name".to_string(),
                "username".to_string(),
                "followers".to_string(),
                "id".to_string(),
            ],
            profile_url_prefix: "https://www.tiktok.com/@".to_string(),
            unknown_name: "unknown".to_string(),
        }
    }
}

impl ParserConfig {
    pub fn with_bounds(min_followers: i64, max_followers: i64) -> Self {
        Self {
            min_followers,
            max_followers,
            ..Self::default()
        }
    }
}

impl Validate for ParserConfig {
    fn validate(&self) -> Result<()> {
        if self.min_followers > self.max_followers {
            return Err(crate::utils::error::ImportError::InvalidConfigValueError {
                field: "min_followers".to_string(),
                value: self.min_followers.to_string(),
                reason: format!("must not exceed max_followers ({})", self.max_followers),
            });
        }
        validate_positive_number("max_scan_depth", self.max_scan_depth, 1)?;
        validate_non_empty_string("primary_key", &self.primary_key)?;
        validate_non_empty_string("id_field", &self.id_field)?;
        validate_url("profile_url_prefix", &self.profile_url_prefix)?;
        if self.recognized_fields.is_empty() {
            return Err(crate::utils::error::ImportError::ConfigError {
                message: "recognized_fields cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "creator-etl")]
#[command(about = "Recovers and normalizes creator records from messy JSON exports")]
pub struct CliConfig {
    #[arg(long, help = "Path to the JSON export to ingest")]
    pub input: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "tsv,json")]
    pub formats: Vec<String>,

    #[arg(long, default_value_t = DEFAULT_MIN_FOLLOWERS)]
    pub min_followers: i64,

    #[arg(long, default_value_t = DEFAULT_MAX_FOLLOWERS)]
    pub max_followers: i64,

    #[arg(long, help = "Bundle outputs into a timestamped zip archive")]
    pub bundle: bool,

    #[arg(long, help = "Count records whose id was already seen in this run")]
    pub dedup: bool,

    #[arg(long, default_value_t = DEFAULT_MAX_INPUT_BYTES, help = "Maximum input size in bytes")]
    pub max_input_bytes: u64,

    #[arg(long, help = "Path to a TOML config file (overrides other flags)")]
    pub config: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.formats
    }

    fn bundle_outputs(&self) -> bool {
        self.bundle
    }

    fn count_duplicates(&self) -> bool {
        self.dedup
    }

    fn max_input_bytes(&self) -> u64 {
        self.max_input_bytes
    }

    fn parser_config(&self) -> ParserConfig {
        ParserConfig::with_bounds(self.min_followers, self.max_followers)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("formats", &self.formats)?;
        self.parser_config().validate()
    }
}
