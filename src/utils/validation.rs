use crate::utils::error::{ReaderError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub(crate) fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> ReaderError {
    ReaderError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 服務根網址：之後會直接接上 `/models/...`，所以不能帶 query 或 fragment
pub fn validate_api_base(value: &str) -> Result<()> {
    let url = Url::parse(value.trim())
        .map_err(|e| invalid("api_base", value, format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            "api_base",
            value,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid("api_base", value, "URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            "api_base",
            value,
            "URL must not carry a query or fragment",
        ));
    }
    Ok(())
}

/// 模型名稱會成為路徑的一段，`:generateContent` 前不能再有冒號或空白
pub fn validate_model_name(value: &str) -> Result<()> {
    let name = value.trim();
    let bare = name.strip_prefix("models/").unwrap_or(name);

    if bare.is_empty() {
        return Err(invalid("model", value, "Model name cannot be empty"));
    }
    if bare
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, ':' | '/' | '?' | '#'))
    {
        return Err(invalid(
            "model",
            value,
            "Model name cannot contain whitespace, ':', '/', '?' or '#'",
        ));
    }
    Ok(())
}

pub fn validate_output_dir(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid("output_path", value, "Report directory cannot be empty"));
    }
    if value.contains('\0') {
        return Err(invalid("output_path", value, "Path contains null bytes"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_api_base() {
        assert!(validate_api_base("https://generativelanguage.googleapis.com/v1beta").is_ok());
        assert!(validate_api_base("http://127.0.0.1:8080").is_ok());
        assert!(validate_api_base("").is_err());
        assert!(validate_api_base("invalid-url").is_err());
        assert!(validate_api_base("ftp://example.com").is_err());
        assert!(validate_api_base("https://example.com/v1beta?key=abc").is_err());
    }

    #[test]
    fn test_validate_model_name() {
        assert!(validate_model_name("gemini-3-flash-preview").is_ok());
        assert!(validate_model_name("models/gemini-2.5-pro").is_ok());
        assert!(validate_model_name("   ").is_err());
        assert!(validate_model_name("models/").is_err());
        assert!(validate_model_name("gemini pro").is_err());
        assert!(validate_model_name("gemini:streamGenerateContent").is_err());
    }

    #[test]
    fn test_validate_output_dir() {
        assert!(validate_output_dir("./reports").is_ok());
        assert!(validate_output_dir("").is_err());
        assert!(validate_output_dir("bad\0path").is_err());
    }

    #[test]
    fn test_errors_name_the_field() {
        let err = validate_model_name("a b").unwrap_err();
        assert!(err.to_string().contains("model"));
        assert!(matches!(err, ReaderError::InvalidConfigValueError { .. }));
    }
}
