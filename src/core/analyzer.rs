use crate::core::prompt::{response_schema, SYSTEM_INSTRUCTION, USER_PROMPT};
use crate::core::{ChartAnalysis, ChartAnalyzer, ConfigProvider, ImagePayload};
use crate::utils::error::{AnalysisError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

const MAX_LOGGED_BODY_CHARS: usize = 500;

/// 金鑰放在標頭而不是 URL，避免出現在錯誤訊息與日誌裡
pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// 第一個候選回應中所有文字片段串接起來
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Google Gemini `generateContent` 的命盤解析客戶端。每次呼叫只送出一次請求，不重試。
pub struct GeminiAnalyzer<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> GeminiAnalyzer<C> {
    pub fn new(config: C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(AnalysisError::from)?;
        Ok(Self { config, client })
    }

    pub fn endpoint(&self) -> String {
        let model = self.config.model().trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        };
        format!(
            "{}/{}:generateContent",
            self.config.api_base().trim_end_matches('/'),
            model_path
        )
    }

    /// 組出實際送出的請求內容（不發送），`--dry-run` 也用這個
    pub fn describe_request(&self, image: &ImagePayload) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            },
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": image.mime_type,
                            "data": image.transmit_data()
                        }
                    },
                    { "text": USER_PROMPT }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema()
            }
        })
    }
}

#[async_trait::async_trait]
impl<C: ConfigProvider> ChartAnalyzer for GeminiAnalyzer<C> {
    async fn analyze(&self, image: &ImagePayload) -> std::result::Result<ChartAnalysis, AnalysisError> {
        let api_key = self
            .config
            .api_key()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AnalysisError::MissingApiKey)?;

        let endpoint = self.endpoint();
        tracing::debug!(
            "Sending chart image ({} bytes, {}) to {}",
            image.byte_len,
            image.mime_type,
            endpoint
        );

        let response = self
            .client
            .post(&endpoint)
            .header(API_KEY_HEADER, api_key)
            .json(&self.describe_request(image))
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Analysis response status: {}", status);

        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(
                "Analysis request rejected with HTTP {}: {}",
                status,
                truncate(&body, MAX_LOGGED_BODY_CHARS)
            );
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                body: truncate(&body, MAX_LOGGED_BODY_CHARS),
            });
        }

        let envelope: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            AnalysisError::malformed(format!("unexpected response envelope: {}", e))
        })?;

        parse_analysis(&envelope.text())
    }
}

/// 將模型輸出的文字解析成 `ChartAnalysis`。空文件視為失敗，不做部分結果。
pub fn parse_analysis(text: &str) -> std::result::Result<ChartAnalysis, AnalysisError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| AnalysisError::malformed(format!("not valid JSON: {}", e)))?;

    match &value {
        Value::Null => return Err(AnalysisError::EmptyResponse),
        Value::Object(map) if map.is_empty() => return Err(AnalysisError::EmptyResponse),
        Value::Object(_) => {}
        other => {
            return Err(AnalysisError::malformed(format!(
                "expected a JSON object, got {}",
                json_kind(other)
            )))
        }
    }

    serde_json::from_value(value)
        .map_err(|e| AnalysisError::malformed(format!("schema mismatch: {}", e)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    value.chars().take(max_chars).collect::<String>() + "…"
}
