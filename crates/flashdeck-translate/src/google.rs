//! Google Cloud Translation (v2) client

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TranslateError};
use crate::request::{Translation, TranslationRequest};
use crate::Translator;

/// Public v2 endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Option<ApiData>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    #[serde(default)]
    translations: Vec<ApiTranslation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiTranslation {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

/// Translator backed by the Google Translate v2 REST API.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GoogleTranslator {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Send requests to `endpoint` instead of the public API (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Translator for GoogleTranslator {
    async fn translate(&self, request: &TranslationRequest) -> Result<Translation> {
        request.validate()?;

        let body = ApiRequest {
            q: &request.text,
            source: &request.source_language,
            target: &request.target_language,
            format: "text",
        };

        debug!(
            source = %request.source_language,
            target = %request.target_language,
            "requesting translation"
        );
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        parse_response(status, &text)
    }
}

/// Interpret a v2 response body. An `error` object wins over the status
/// code; a body without `data.translations[0]` is a failure.
fn parse_response(status: StatusCode, body: &str) -> Result<Translation> {
    let parsed: ApiResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(%status, error = %e, "unreadable translation response");
            return Err(TranslateError::Failed(format!(
                "unexpected response ({}): {}",
                status, e
            )));
        }
    };

    if let Some(error) = parsed.error {
        warn!(%status, message = %error.message, "translation API error");
        return Err(TranslateError::Failed(error.message));
    }
    if !status.is_success() {
        return Err(TranslateError::Failed(format!("HTTP {}", status)));
    }

    parsed
        .data
        .and_then(|data| data.translations.into_iter().next())
        .map(|t| Translation {
            translated_text: t.translated_text,
        })
        .ok_or_else(|| TranslateError::Failed("response contained no translation".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success() {
        let body = r#"{"data":{"translations":[{"translatedText":"hello"}]}}"#;
        let translation = parse_response(StatusCode::OK, body).unwrap();
        assert_eq!(translation.translated_text, "hello");
    }

    #[test]
    fn test_parse_api_error_message() {
        let body = r#"{"error":{"code":400,"message":"API key not valid."}}"#;
        let err = parse_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert!(matches!(err, TranslateError::Failed(ref m) if m == "API key not valid."));
    }

    #[test]
    fn test_parse_empty_translations() {
        let body = r#"{"data":{"translations":[]}}"#;
        assert!(matches!(
            parse_response(StatusCode::OK, body),
            Err(TranslateError::Failed(_))
        ));
    }

    #[test]
    fn test_parse_non_json_body() {
        assert!(matches!(
            parse_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"),
            Err(TranslateError::Failed(_))
        ));
    }

    #[test]
    fn test_parse_status_without_error_object() {
        let err = parse_response(StatusCode::INTERNAL_SERVER_ERROR, "{}").unwrap_err();
        assert_eq!(err.to_string(), "translation failed: HTTP 500 Internal Server Error");
    }
}
