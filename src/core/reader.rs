use crate::core::report::{format_report, report_filename};
use crate::core::session::{transition, AppState, AppStatus, SessionEvent};
use crate::core::{ChartAnalyzer, ImagePayload, ImageSource, Storage};
use crate::utils::error::{ReaderError, Result};
use chrono::Local;
use tokio::sync::mpsc::UnboundedSender;

/// 持有唯一的 `AppState`，串起讀檔、分析與報告匯出。
///
/// 所有會改變狀態的方法都取 `&mut self`，同一時間最多只有一個分析在進行。
pub struct ChartReader<A: ChartAnalyzer, S: ImageSource + Storage> {
    analyzer: A,
    storage: S,
    state: AppState,
    status_listener: Option<UnboundedSender<AppStatus>>,
}

impl<A: ChartAnalyzer, S: ImageSource + Storage> ChartReader<A, S> {
    pub fn new(analyzer: A, storage: S) -> Self {
        Self {
            analyzer,
            storage,
            state: AppState::default(),
            status_listener: None,
        }
    }

    /// 每次狀態切換都會送出新的狀態
    pub fn with_status_listener(mut self, listener: UnboundedSender<AppStatus>) -> Self {
        self.status_listener = Some(listener);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }

    fn apply(&mut self, event: SessionEvent) -> Result<()> {
        let next = transition(&self.state, event)?;
        let previous = self.state.status;
        self.state = next;

        if previous != self.state.status {
            tracing::info!("State: {} -> {}", previous, self.state.status);
            if let Some(listener) = &self.status_listener {
                // 接收端已關閉時不影響流程
                let _ = listener.send(self.state.status);
            }
        }
        Ok(())
    }

    fn ensure_can_select(&self) -> Result<()> {
        match self.state.status {
            AppStatus::Idle | AppStatus::Error => Ok(()),
            other => Err(ReaderError::InvalidTransition {
                state: other.to_string(),
                action: "select a file".to_string(),
            }),
        }
    }

    /// 讀取圖片後立即進行分析。讀檔失敗會進入 Error 狀態而不是回傳錯誤。
    pub async fn select_file(&mut self, path: &str) -> Result<&AppState> {
        self.ensure_can_select()?;

        match self.storage.load_image(path).await {
            Ok(image) => self.analyze_image(image).await,
            Err(e) => {
                tracing::warn!("Failed to read chart image '{}': {}", path, e);
                self.apply(SessionEvent::FileReadFailed(String::new()))?;
                Ok(&self.state)
            }
        }
    }

    pub async fn analyze_image(&mut self, image: ImagePayload) -> Result<&AppState> {
        self.apply(SessionEvent::FileSelected(image.clone()))?;
        let ticket = self.state.ticket;

        let event = match self.analyzer.analyze(&image).await {
            Ok(analysis) => {
                tracing::info!(
                    "Analysis #{} completed: {} decade cycles, {} yearly cycles, {} palaces",
                    ticket,
                    analysis.decade_cycles.len(),
                    analysis.yearly_cycles.len(),
                    analysis.palaces.len()
                );
                SessionEvent::AnalysisSucceeded { ticket, analysis }
            }
            Err(e) => {
                tracing::error!("Analysis #{} failed: {}", ticket, e);
                SessionEvent::AnalysisFailed {
                    ticket,
                    message: Some(e.user_message().to_string()),
                }
            }
        };

        self.apply(event)?;
        Ok(&self.state)
    }

    pub fn reset(&mut self) -> Result<&AppState> {
        self.apply(SessionEvent::Reset)?;
        Ok(&self.state)
    }

    /// 只有在 Result 狀態下可以匯出，回傳寫入的路徑
    pub async fn download_report(&self) -> Result<String> {
        let analysis = match (self.state.status, &self.state.analysis) {
            (AppStatus::Result, Some(analysis)) => analysis,
            _ => return Err(ReaderError::NoResult),
        };

        let filename = report_filename(Local::now().date_naive());
        let report = format_report(analysis);
        tracing::debug!("Writing report ({} bytes) as {}", report.len(), filename);

        self.storage.write_file(&filename, report.as_bytes()).await
    }
}
