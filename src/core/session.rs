//! 畫面生命週期狀態機：Idle → Analyzing → (Result | Error)，Reset 回到 Idle。
//!
//! `transition` 是純函式，不做 IO；`ChartReader` 負責讀檔與呼叫分析服務，再把結果
//! 以事件送進來。

use crate::domain::model::{ChartAnalysis, ImagePayload};
use crate::utils::error::{ReaderError, Result};
use std::fmt;

/// 分析失敗但沒有附帶訊息時使用
pub const FALLBACK_ERROR_MESSAGE: &str = "解析失败";
pub const FILE_READ_ERROR_MESSAGE: &str = "无法读取命盘图片，请重新选择。";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    Idle,
    Analyzing,
    Result,
    Error,
}

impl fmt::Display for AppStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppStatus::Idle => "Idle",
            AppStatus::Analyzing => "Analyzing",
            AppStatus::Result => "Result",
            AppStatus::Error => "Error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    FileSelected(ImagePayload),
    FileReadFailed(String),
    AnalysisSucceeded { ticket: u64, analysis: ChartAnalysis },
    AnalysisFailed { ticket: u64, message: Option<String> },
    Reset,
}

impl SessionEvent {
    fn action(&self) -> &'static str {
        match self {
            SessionEvent::FileSelected(_) => "select a file",
            SessionEvent::FileReadFailed(_) => "report a file read failure",
            SessionEvent::AnalysisSucceeded { .. } => "complete an analysis",
            SessionEvent::AnalysisFailed { .. } => "fail an analysis",
            SessionEvent::Reset => "reset",
        }
    }
}

/// 畫面所需的全部狀態。analysis / error / preview 只由狀態機改寫。
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub status: AppStatus,
    pub analysis: Option<ChartAnalysis>,
    pub error: Option<String>,
    pub preview: Option<ImagePayload>,
    /// 目前（或最近一次）分析請求的編號
    pub ticket: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            status: AppStatus::Idle,
            analysis: None,
            error: None,
            preview: None,
            ticket: 0,
        }
    }
}

impl AppState {
    pub fn is_busy(&self) -> bool {
        self.status == AppStatus::Analyzing
    }

    /// 除了請求編號以外是否與初始狀態相同
    pub fn is_pristine(&self) -> bool {
        self.status == AppStatus::Idle
            && self.analysis.is_none()
            && self.error.is_none()
            && self.preview.is_none()
    }
}

fn rejected(state: &AppState, event: &SessionEvent) -> ReaderError {
    ReaderError::InvalidTransition {
        state: state.status.to_string(),
        action: event.action().to_string(),
    }
}

/// 計算下一個狀態。不合法的事件回傳 `InvalidTransition`，過期的完成事件則原樣忽略。
pub fn transition(state: &AppState, event: SessionEvent) -> Result<AppState> {
    match (state.status, event) {
        (AppStatus::Idle | AppStatus::Error, SessionEvent::FileSelected(image)) => Ok(AppState {
            status: AppStatus::Analyzing,
            analysis: None,
            error: None,
            preview: Some(image),
            ticket: state.ticket + 1,
        }),
        (AppStatus::Idle | AppStatus::Error, SessionEvent::FileReadFailed(message)) => Ok(AppState {
            status: AppStatus::Error,
            analysis: None,
            error: Some(non_blank_or(message, FILE_READ_ERROR_MESSAGE)),
            preview: None,
            ticket: state.ticket,
        }),
        (AppStatus::Analyzing, SessionEvent::AnalysisSucceeded { ticket, analysis }) => {
            if ticket != state.ticket {
                tracing::debug!("Discarding stale analysis result #{}", ticket);
                return Ok(state.clone());
            }
            Ok(AppState {
                status: AppStatus::Result,
                analysis: Some(analysis),
                error: None,
                ..state.clone()
            })
        }
        (AppStatus::Analyzing, SessionEvent::AnalysisFailed { ticket, message }) => {
            if ticket != state.ticket {
                tracing::debug!("Discarding stale analysis failure #{}", ticket);
                return Ok(state.clone());
            }
            Ok(AppState {
                status: AppStatus::Error,
                analysis: None,
                error: Some(non_blank_or(message.unwrap_or_default(), FALLBACK_ERROR_MESSAGE)),
                ..state.clone()
            })
        }
        (AppStatus::Result | AppStatus::Error | AppStatus::Idle, SessionEvent::Reset) => Ok(AppState {
            ticket: state.ticket,
            ..AppState::default()
        }),
        (_, event) => Err(rejected(state, &event)),
    }
}

fn non_blank_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
