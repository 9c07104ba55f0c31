use crate::config::{
    ParserConfig, DEFAULT_MAX_FOLLOWERS, DEFAULT_MAX_INPUT_BYTES, DEFAULT_MAX_SCAN_DEPTH,
    DEFAULT_MIN_FOLLOWERS,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineMeta,
    pub input: InputConfig,
    pub filter: Option<FilterConfig>,
    pub scan: Option<ScanConfig>,
    pub load: LoadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineMeta {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub max_bytes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    pub min_followers: Option<i64>,
    pub max_followers: Option<i64>,
    pub count_duplicates: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub max_depth: Option<usize>,
    pub primary_key: Option<String>,
    pub recognized_fields: Option<Vec<String>>,
    pub profile_url_prefix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub bundle: Option<bool>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values; unknown
    /// variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.load.output_formats
    }

    fn bundle_outputs(&self) -> bool {
        self.load.bundle.unwrap_or(false)
    }

    fn count_duplicates(&self) -> bool {
        self.filter
            .as_ref()
            .and_then(|f| f.count_duplicates)
            .unwrap_or(false)
    }

    fn max_input_bytes(&self) -> u64 {
        self.input.max_bytes.unwrap_or(DEFAULT_MAX_INPUT_BYTES)
    }

    fn parser_config(&self) -> ParserConfig {
        let mut config = ParserConfig::default();
        if let Some(filter) = &self.filter {
            config.min_followers = filter.min_followers.unwrap_or(DEFAULT_MIN_FOLLOWERS);
            config.max_followers = filter.max_followers.unwrap_or(DEFAULT_MAX_FOLLOWERS);
        }
        if let Some(scan) = &self.scan {
            config.max_scan_depth = scan.max_depth.unwrap_or(DEFAULT_MAX_SCAN_DEPTH);
            if let Some(primary_key) = &scan.primary_key {
                config.primary_key = primary_key.clone();
            }
            if let Some(fields) = &scan.recognized_fields {
                config.recognized_fields = fields.clone();
            }
            if let Some(prefix) = &scan.profile_url_prefix {
                config.profile_url_prefix = prefix.clone();
            }
        }
        config
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;
        self.parser_config().validate()
    }
}
