use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// 外部服務的回應不可完全信任：欄位缺少或為 null 時一律回退為預設值
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub birth_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gender: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ming_zhu: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub shen_zhu: String,
}

/// 十年大運
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecadeCycle {
    /// 例如 "32-41岁"
    #[serde(default, deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub palace_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
}

/// 流年
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyCycle {
    /// 例如 "2024 甲辰年"
    #[serde(default, deserialize_with = "null_as_default")]
    pub year: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PalaceData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub main_stars: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub minor_stars: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub interpretation: String,
}

/// 一次完整解析的結果。整體一次建立，之後不再修改；新的解析直接取代舊的。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub personal_info: PersonalInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fortune_cycle: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub decade_cycles: Vec<DecadeCycle>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub yearly_cycles: Vec<YearlyCycle>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub palaces: Vec<PalaceData>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub career_advice: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub wealth_advice: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relationship_advice: String,
}

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// base64 編碼後的命盤圖片，同時作為畫面上的預覽
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
    pub byte_len: usize,
}

impl ImagePayload {
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
            byte_len: bytes.len(),
        }
    }

    /// 接受純 base64 或 `data:<mime>;base64,<data>` 形式
    pub fn from_encoded(encoded: &str) -> Self {
        let trimmed = encoded.trim();
        let mime_type = trimmed
            .strip_prefix("data:")
            .and_then(|rest| rest.split([';', ',']).next())
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        let data = strip_data_uri(trimmed).to_string();
        let byte_len = BASE64.decode(data.as_bytes()).map(|b| b.len()).unwrap_or(0);
        Self {
            mime_type,
            data,
            byte_len,
        }
    }

    /// 傳送前使用的資料，永遠不帶 data URI 前綴
    pub fn transmit_data(&self) -> &str {
        strip_data_uri(&self.data)
    }
}

/// 去掉 data URI 前綴；沒有逗號或逗號後為空時原樣返回
pub fn strip_data_uri(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, data)) if !data.is_empty() => data,
        _ => encoded,
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sequences_default_to_empty() {
        let analysis: ChartAnalysis = serde_json::from_str(r#"{"summary": "紫府同宫"}"#).unwrap();

        assert_eq!(analysis.summary, "紫府同宫");
        assert!(analysis.decade_cycles.is_empty());
        assert!(analysis.yearly_cycles.is_empty());
        assert!(analysis.palaces.is_empty());
        assert_eq!(analysis.personal_info, PersonalInfo::default());
    }

    #[test]
    fn test_null_fields_default() {
        let json = serde_json::json!({
            "personalInfo": {"birthDate": null, "gender": "男"},
            "decadeCycles": null,
            "yearlyCycles": [{"year": "2025 乙巳年", "keyPoints": null}],
            "palaces": [{"name": "命宫", "mainStars": null}],
            "careerAdvice": null
        });
        let analysis: ChartAnalysis = serde_json::from_value(json).unwrap();

        assert_eq!(analysis.personal_info.birth_date, "");
        assert_eq!(analysis.personal_info.gender, "男");
        assert!(analysis.decade_cycles.is_empty());
        assert!(analysis.yearly_cycles[0].key_points.is_empty());
        assert!(analysis.palaces[0].main_stars.is_empty());
        assert!(analysis.palaces[0].minor_stars.is_empty());
        assert_eq!(analysis.career_advice, "");
    }

    #[test]
    fn test_sequence_order_preserved() {
        let json = serde_json::json!({
            "decadeCycles": [
                {"period": "2-11岁", "palaceName": "命宫", "summary": "a"},
                {"period": "12-21岁", "palaceName": "父母宫", "summary": "b"},
                {"period": "2-11岁", "palaceName": "命宫", "summary": "a"}
            ]
        });
        let analysis: ChartAnalysis = serde_json::from_value(json).unwrap();
        let periods: Vec<&str> = analysis.decade_cycles.iter().map(|d| d.period.as_str()).collect();

        assert_eq!(periods, vec!["2-11岁", "12-21岁", "2-11岁"]);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let result: std::result::Result<ChartAnalysis, _> =
            serde_json::from_str(r#"{"palaces": "命宫"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_image_payload_from_data_uri() {
        let payload = ImagePayload::from_encoded("data:image/jpeg;base64,aGVsbG8=");
        assert_eq!(payload.mime_type, "image/jpeg");
        assert_eq!(payload.data, "aGVsbG8=");
        assert_eq!(payload.byte_len, 5);
        assert_eq!(payload.transmit_data(), "aGVsbG8=");
    }

    #[test]
    fn test_image_payload_from_raw_base64() {
        let payload = ImagePayload::from_encoded("aGVsbG8=");
        assert_eq!(payload.mime_type, DEFAULT_IMAGE_MIME);
        assert_eq!(payload.transmit_data(), "aGVsbG8=");
    }

    #[test]
    fn test_image_payload_from_bytes() {
        let payload = ImagePayload::from_bytes(b"hello", "image/webp");
        assert_eq!(payload.data, "aGVsbG8=");
        assert_eq!(payload.byte_len, 5);
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("chart.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("chart.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("chart.bmp")), None);
        assert_eq!(mime_for_path(Path::new("chart")), None);
    }
}
