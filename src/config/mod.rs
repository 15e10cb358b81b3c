pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    invalid, validate_api_base, validate_model_name, validate_output_dir, Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_OUTPUT_PATH: &str = "./reports";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 120;
pub const DEFAULT_WRAP_WIDTH: usize = 72;
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];
pub const MAX_TIMEOUT_SECONDS: u64 = 600;
pub const WRAP_WIDTH_RANGE: std::ops::RangeInclusive<usize> = 40..=200;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Serialize, Deserialize, Parser)]
#[command(name = "ziwei-reader")]
#[command(about = "Upload a Zi Wei Dou Shu chart image and read the AI interpretation")]
pub struct CliConfig {
    /// Chart image to analyze right away
    pub image: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    #[arg(long)]
    pub api_base: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    /// Overrides GEMINI_API_KEY / GOOGLE_API_KEY
    #[arg(long, hide = true)]
    pub api_key: Option<String>,

    /// Directory the report is written to
    #[arg(short, long)]
    pub output_path: Option<String>,

    /// Request timeout in seconds, 0 disables it
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(long)]
    pub wrap_width: Option<usize>,

    /// Write the report as soon as the analysis succeeds, then exit
    #[arg(long)]
    pub save_report: bool,

    /// Print the request that would be sent without calling the service
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// 合併命令列、設定檔與環境變數後的最終設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    pub api_base: String,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub output_path: String,
    pub timeout_seconds: u64,
    pub wrap_width: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            wrap_width: DEFAULT_WRAP_WIDTH,
        }
    }
}

impl ReaderConfig {
    /// 套用設定檔，再以環境變數補上 API 金鑰
    pub fn from_toml(toml: &TomlConfig, env_lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_base: toml.analysis.api_base.clone().unwrap_or(defaults.api_base),
            model: toml.analysis.model.clone().unwrap_or(defaults.model),
            api_key: toml
                .api_key()
                .map(str::to_string)
                .or_else(|| api_key_from_env(&env_lookup)),
            output_path: toml.report.output_path.clone().unwrap_or(defaults.output_path),
            timeout_seconds: toml
                .analysis
                .timeout_seconds
                .unwrap_or(defaults.timeout_seconds),
            wrap_width: toml.display.wrap_width.unwrap_or(defaults.wrap_width),
        }
    }

    /// 命令列參數優先於設定檔
    #[cfg(feature = "cli")]
    pub fn from_cli(
        cli: &CliConfig,
        toml: &TomlConfig,
        env_lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let base = Self::from_toml(toml, env_lookup);
        Self {
            api_base: cli.api_base.clone().unwrap_or(base.api_base),
            model: cli.model.clone().unwrap_or(base.model),
            api_key: cli
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty())
                .or(base.api_key),
            output_path: cli.output_path.clone().unwrap_or(base.output_path),
            timeout_seconds: cli.timeout_seconds.unwrap_or(base.timeout_seconds),
            wrap_width: cli.wrap_width.unwrap_or(base.wrap_width),
        }
    }
}

fn api_key_from_env(env_lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| env_lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

impl Validate for ReaderConfig {
    fn validate(&self) -> Result<()> {
        validate_api_base(&self.api_base)?;
        validate_model_name(&self.model)?;
        validate_output_dir(&self.output_path)?;

        // 0 表示不設逾時
        if self.timeout_seconds > MAX_TIMEOUT_SECONDS {
            return Err(invalid(
                "timeout_seconds",
                self.timeout_seconds,
                format!("Timeout cannot exceed {} seconds", MAX_TIMEOUT_SECONDS),
            ));
        }
        if !WRAP_WIDTH_RANGE.contains(&self.wrap_width) {
            return Err(invalid(
                "wrap_width",
                self.wrap_width,
                format!(
                    "Wrap width must be between {} and {} columns",
                    WRAP_WIDTH_RANGE.start(),
                    WRAP_WIDTH_RANGE.end()
                ),
            ));
        }
        Ok(())
    }
}

impl ConfigProvider for ReaderConfig {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn request_timeout(&self) -> Option<Duration> {
        (self.timeout_seconds > 0).then(|| Duration::from_secs(self.timeout_seconds))
    }
}
