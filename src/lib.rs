pub mod config;
pub mod core;
pub mod domain;
pub mod ui;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig, ReaderConfig};
pub use crate::core::session::{AppState, AppStatus};
pub use crate::core::{analyzer::GeminiAnalyzer, reader::ChartReader, report::format_report};
pub use crate::domain::model::{
    ChartAnalysis, DecadeCycle, ImagePayload, PalaceData, PersonalInfo, YearlyCycle,
};
pub use crate::utils::error::{AnalysisError, ReaderError, Result};
