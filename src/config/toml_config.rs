use crate::utils::error::{ReaderError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 設定檔，所有段落皆可省略
///
/// ```toml
/// [analysis]
/// api_base = "https://generativelanguage.googleapis.com/v1beta"
/// model = "gemini-3-flash-preview"
/// api_key = "${GEMINI_API_KEY}"
/// timeout_seconds = 120
///
/// [report]
/// output_path = "./reports"
///
/// [display]
/// wrap_width = 72
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub analysis: AnalysisSection,
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub display: DisplaySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub api_base: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// 0 表示不設逾時
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSection {
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplaySection {
    pub wrap_width: Option<usize>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ReaderError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ReaderError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEMINI_API_KEY})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReaderError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 未被替換的 `${VAR}` 視為沒有設定
    pub fn api_key(&self) -> Option<&str> {
        self.analysis
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && !key.starts_with("${"))
    }
}
