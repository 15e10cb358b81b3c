use anyhow::Result;
use httpmock::prelude::*;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc::unbounded_channel;
use ziwei_reader::core::report::{report_filename, TIMESTAMP_PREFIX};
use ziwei_reader::core::session::FALLBACK_ERROR_MESSAGE;
use ziwei_reader::utils::error::ANALYSIS_FAILED_MESSAGE;
use ziwei_reader::{AppStatus, ChartReader, GeminiAnalyzer, LocalStorage, ReaderConfig};

const GENERATE_PATH: &str = "/v1beta/models/gemini-flash-test:generateContent";

fn config_for(server: &MockServer, output_path: &str) -> ReaderConfig {
    ReaderConfig {
        api_base: server.url("/v1beta"),
        model: "gemini-flash-test".to_string(),
        api_key: Some("integration-key".to_string()),
        output_path: output_path.to_string(),
        timeout_seconds: 10,
        ..ReaderConfig::default()
    }
}

fn write_chart(dir: &Path) -> String {
    let image_path = dir.join("chart.png");
    std::fs::write(&image_path, [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]).unwrap();
    image_path.to_string_lossy().into_owned()
}

fn gemini_reply(document: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": document.to_string() }] }
        }]
    })
}

#[tokio::test]
async fn test_end_to_end_analysis_and_report_export() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let output_path = temp_dir.path().join("reports").to_string_lossy().into_owned();
    let image_path = write_chart(temp_dir.path());

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path(GENERATE_PATH)
            .header("x-goog-api-key", "integration-key")
            .body_contains("\"mimeType\":\"image/png\"")
            .body_contains("\"required\":[\"personalInfo\"");
        then.status(200).json_body(gemini_reply(serde_json::json!({
            "personalInfo": {"birthDate": "1992-02-02", "gender": "女", "mingZhu": "禄存", "shenZhu": "文昌"},
            "summary": "机月同梁格",
            "fortuneCycle": "早年辛劳，中年发达",
            "decadeCycles": [
                {"period": "14-23岁", "palaceName": "兄弟宫", "summary": "求学顺利"},
                {"period": "24-33岁", "palaceName": "夫妻宫", "summary": "感情稳定"}
            ],
            "yearlyCycles": [
                {"year": "2025 乙巳年", "summary": "变动之年", "keyPoints": ["A", "B", "C"]}
            ],
            "palaces": [
                {"name": "命宫", "mainStars": ["天机", "太阴"], "minorStars": ["文曲"], "interpretation": "聪慧细腻"}
            ],
            "careerAdvice": "宜从事策划",
            "wealthAdvice": "稳健理财",
            "relationshipAdvice": "以诚相待"
        })));
    });

    let (tx, mut rx) = unbounded_channel();
    let config = config_for(&server, &output_path);
    let analyzer = GeminiAnalyzer::new(config)?;
    let mut reader =
        ChartReader::new(analyzer, LocalStorage::new(output_path.clone())).with_status_listener(tx);

    assert_eq!(reader.state().status, AppStatus::Idle);
    let state = reader.select_file(&image_path).await?;
    api_mock.assert();

    assert_eq!(state.status, AppStatus::Result);
    assert!(state.error.is_none());
    assert_eq!(state.preview.as_ref().unwrap().byte_len, 8);
    let analysis = state.analysis.as_ref().unwrap();
    assert_eq!(analysis.decade_cycles[0].period, "14-23岁");
    assert_eq!(analysis.decade_cycles[1].period, "24-33岁");

    assert_eq!(rx.recv().await, Some(AppStatus::Analyzing));
    assert_eq!(rx.recv().await, Some(AppStatus::Result));

    let saved = reader.download_report().await?;
    let expected_name = report_filename(chrono::Local::now().date_naive());
    assert!(saved.ends_with(&expected_name));

    let report = std::fs::read_to_string(Path::new(&output_path).join(&expected_name))?;
    assert!(report.contains("要点：A、B、C"));
    assert!(report.contains("周期：14-23岁（兄弟宫）"));
    assert!(report.contains("主要星曜：天机、太阴"));
    assert!(report.lines().last().unwrap().starts_with(TIMESTAMP_PREFIX));

    let reset = reader.reset()?;
    assert!(reset.is_pristine());
    assert_eq!(rx.recv().await, Some(AppStatus::Idle));
    Ok(())
}

#[tokio::test]
async fn test_service_failure_yields_error_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let image_path = write_chart(temp_dir.path());

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(500).body("backend exploded");
    });

    let config = config_for(&server, temp_dir.path().to_str().unwrap());
    let mut reader = ChartReader::new(
        GeminiAnalyzer::new(config)?,
        LocalStorage::new(temp_dir.path().to_string_lossy().into_owned()),
    );

    let state = reader.select_file(&image_path).await?;

    // 失敗不重試
    api_mock.assert_hits(1);
    assert_eq!(state.status, AppStatus::Error);
    assert_eq!(state.error.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
    assert_ne!(state.error.as_deref(), Some(FALLBACK_ERROR_MESSAGE));
    assert!(state.analysis.is_none());
    assert!(reader.download_report().await.is_err());

    // 從 Error 可以直接重新上傳
    let retry = reader.select_file(&image_path).await?;
    assert_eq!(retry.status, AppStatus::Error);
    api_mock.assert_hits(2);

    assert!(reader.reset()?.is_pristine());
    Ok(())
}

#[tokio::test]
async fn test_request_timeout_yields_error_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let image_path = write_chart(temp_dir.path());

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(gemini_reply(serde_json::json!({"summary": "来得太迟"})));
    });

    let output_path = temp_dir.path().to_string_lossy().into_owned();
    let config = ReaderConfig {
        timeout_seconds: 1,
        ..config_for(&server, &output_path)
    };
    let mut reader = ChartReader::new(GeminiAnalyzer::new(config)?, LocalStorage::new(output_path));

    let state = reader.select_file(&image_path).await?;

    api_mock.assert_hits(1);
    assert_eq!(state.status, AppStatus::Error);
    assert_eq!(state.error.as_deref(), Some(ANALYSIS_FAILED_MESSAGE));
    assert!(state.analysis.is_none());
    Ok(())
}

#[tokio::test]
async fn test_sparse_response_is_normalized() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let image_path = write_chart(temp_dir.path());

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(GENERATE_PATH);
        then.status(200).json_body(gemini_reply(serde_json::json!({
            "personalInfo": {"gender": "男"},
            "summary": "命宫无主星",
            "yearlyCycles": null
        })));
    });

    let output_path = temp_dir.path().to_string_lossy().into_owned();
    let mut reader = ChartReader::new(
        GeminiAnalyzer::new(config_for(&server, &output_path))?,
        LocalStorage::new(output_path.clone()),
    );

    let state = reader.select_file(&image_path).await?;
    assert_eq!(state.status, AppStatus::Result);

    let analysis = state.analysis.as_ref().unwrap();
    assert!(analysis.decade_cycles.is_empty());
    assert!(analysis.yearly_cycles.is_empty());
    assert!(analysis.palaces.is_empty());

    let saved = reader.download_report().await?;
    let report = std::fs::read_to_string(saved)?;
    assert!(report.contains("生日：未知"));
    assert!(report.contains("性别：男"));
    assert!(report.contains("【十年大运解读】\n【流年运势解读】"));
    Ok(())
}

#[tokio::test]
async fn test_unreadable_file_routes_to_error_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST);
        then.status(200);
    });

    let output_path = temp_dir.path().to_string_lossy().into_owned();
    let mut reader = ChartReader::new(
        GeminiAnalyzer::new(config_for(&server, &output_path))?,
        LocalStorage::new(output_path.clone()),
    );

    let missing = temp_dir.path().join("nope.png");
    let state = reader.select_file(missing.to_str().unwrap()).await?;

    assert_eq!(state.status, AppStatus::Error);
    assert!(state.error.is_some());
    assert!(state.preview.is_none());
    api_mock.assert_hits(0);
    Ok(())
}
