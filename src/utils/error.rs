use thiserror::Error;

/// 面向使用者的通用分析失敗訊息
pub const ANALYSIS_FAILED_MESSAGE: &str = "分析过程中发生错误，请重试。";

/// 外部 AI 服務呼叫的失敗分類
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("API key is not configured (set GEMINI_API_KEY or GOOGLE_API_KEY)")]
    MissingApiKey,

    #[error("Transport failure: {0}")]
    Transport(reqwest::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Service { status: u16, body: String },

    #[error("Malformed analysis document: {message}")]
    Malformed { message: String },

    #[error("Service returned an empty analysis document")]
    EmptyResponse,
}

impl From<reqwest::Error> for AnalysisError {
    /// 丟掉請求 URL，連線錯誤的訊息裡不留端點細節
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}

impl AnalysisError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// 所有分析失敗對使用者一律顯示同一則訊息，細節只進日誌
    pub fn user_message(&self) -> &'static str {
        ANALYSIS_FAILED_MESSAGE
    }
}

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Chart analysis failed: {0}")]
    AnalysisError(#[from] AnalysisError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration value: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Cannot {action} while {state}")]
    InvalidTransition { state: String, action: String },

    #[error("No analysis result available to export")]
    NoResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    State,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReaderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReaderError::AnalysisError(AnalysisError::MissingApiKey) => ErrorCategory::Configuration,
            ReaderError::AnalysisError(AnalysisError::Transport(_))
            | ReaderError::AnalysisError(AnalysisError::Service { .. }) => ErrorCategory::Network,
            ReaderError::AnalysisError(_) | ReaderError::SerializationError(_) => ErrorCategory::Data,
            ReaderError::ConfigError { .. }
            | ReaderError::MissingConfigError { .. }
            | ReaderError::InvalidConfigValueError { .. }
            | ReaderError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            ReaderError::InvalidTransition { .. } | ReaderError::NoResult => ErrorCategory::State,
            ReaderError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::State => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReaderError::AnalysisError(AnalysisError::MissingApiKey) => {
                "未配置 API 密钥，无法进行解析。".to_string()
            }
            ReaderError::AnalysisError(e) => e.user_message().to_string(),
            ReaderError::IoError(e) => format!("文件读写失败：{}", e),
            ReaderError::SerializationError(_) => "数据处理失败。".to_string(),
            ReaderError::InvalidTransition { .. } => "当前状态下无法执行该操作。".to_string(),
            ReaderError::NoResult => "尚无解读结果，无法下载报告。".to_string(),
            other => format!("配置错误：{}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => "检查 GEMINI_API_KEY 环境变量与配置文件内容",
            ErrorCategory::Network => "检查网络连接后重新上传命盘截图",
            ErrorCategory::Data => "换一张更清晰的命盘截图后重试",
            ErrorCategory::State => "等待当前解析完成，或先重新开始",
            ErrorCategory::System => "确认输出目录可写、图片路径存在",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
