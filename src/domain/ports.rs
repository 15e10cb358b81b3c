use crate::domain::model::{ChartAnalysis, ImagePayload};
use crate::utils::error::{AnalysisError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// 單次外部分析呼叫：送出圖片，取回完整的結構化解析或失敗
#[async_trait]
pub trait ChartAnalyzer: Send + Sync {
    async fn analyze(&self, image: &ImagePayload) -> std::result::Result<ChartAnalysis, AnalysisError>;
}

pub trait ImageSource: Send + Sync {
    fn load_image(&self, path: &str) -> impl std::future::Future<Output = Result<ImagePayload>> + Send;
}

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn model(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    /// None 表示不設逾時
    fn request_timeout(&self) -> Option<Duration>;
}
