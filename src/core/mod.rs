pub mod analyzer;
pub mod prompt;
pub mod reader;
pub mod report;
pub mod session;

pub use crate::domain::model::{ChartAnalysis, ImagePayload};
pub use crate::domain::ports::{ChartAnalyzer, ConfigProvider, ImageSource, Storage};
pub use crate::utils::error::Result;
