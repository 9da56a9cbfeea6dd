//! Chat-completions client for the review model.
//!
//! Speaks the Azure-style contract: `POST {endpoint}?api-version=...`
//! with the key in an `api-key` header and a JSON body of
//! `{max_tokens, messages}`. No sampling parameters are sent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ModelConfig;
use crate::constants;
use crate::models::prompt::ChatMessage;
use crate::models::{ModelReview, Prompt};

use super::{CompletionProvider, ProviderError};

/// Maximum length of reply text to include in parse error messages.
const PARSE_ERROR_PREVIEW_LEN: usize = 2000;

#[derive(Serialize)]
struct ChatRequest<'a> {
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ReplyMessage {
    content: Option<String>,
}

/// HTTP client for the completion endpoint.
pub struct ChatCompletionsClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    max_tokens: u32,
}

impl ChatCompletionsClient {
    /// Create a client from validated model settings.
    pub fn new(config: &ModelConfig) -> Result<Self, ProviderError> {
        let endpoint = config.endpoint.trim().to_string();
        if endpoint.is_empty() {
            return Err(ProviderError::NotConfigured("no completion endpoint set".into()));
        }
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::NotConfigured("no completion API key set".into()))?;

        let http = reqwest::Client::builder()
            .user_agent(constants::USER_AGENT)
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            api_key,
            api_version: config.api_version.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Send the prompt and return the trimmed reply text.
    async fn complete(&self, prompt: &Prompt) -> Result<String, ProviderError> {
        let body = ChatRequest {
            max_tokens: self.max_tokens,
            messages: prompt.messages(),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("api-version", self.api_version.as_str())])
            .header(constants::API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ApiError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(ProviderError::ApiError(format!("HTTP {status}: {text}")));
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("invalid completion body: {e}")))?;

        Ok(reply_text(reply))
    }
}

/// Content of the first choice, trimmed; `[]` when absent.
fn reply_text(reply: ChatResponse) -> String {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "[]".to_string())
}

#[async_trait]
impl CompletionProvider for ChatCompletionsClient {
    async fn review(&self, prompt: &Prompt) -> Result<Vec<ModelReview>, ProviderError> {
        let text = self.complete(prompt).await?;
        debug!(bytes = text.len(), "completion reply received");
        parse_review_response(&text)
    }
}

/// Decode the model's reply into review entries.
///
/// Accepts a bare JSON array, a `{"reviews": [...]}` wrapper, or either of
/// those inside a Markdown code fence. Text that contains no JSON is a
/// [`ProviderError::ParseError`]; JSON of the wrong shape is a
/// [`ProviderError::SchemaError`].
pub fn parse_review_response(response: &str) -> Result<Vec<ModelReview>, ProviderError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let mut shape_error: Option<String> = None;

    for candidate in extract_json_candidates(trimmed) {
        let Ok(value) = serde_json::from_str::<serde_json::Value>(&candidate) else {
            continue;
        };

        let entries = match value.get("reviews") {
            Some(inner) if value.is_object() => inner.clone(),
            _ => value,
        };

        match serde_json::from_value::<Vec<ModelReview>>(entries) {
            Ok(reviews) => return Ok(reviews),
            Err(e) => {
                shape_error.get_or_insert_with(|| e.to_string());
            }
        }
    }

    match shape_error {
        Some(e) => Err(ProviderError::SchemaError(e)),
        None => Err(ProviderError::ParseError(format!(
            "reply is not JSON: {}",
            preview(response)
        ))),
    }
}

fn preview(text: &str) -> &str {
    if text.len() <= PARSE_ERROR_PREVIEW_LEN {
        return text;
    }
    let mut end = PARSE_ERROR_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Regex for extracting content inside markdown code fences.
///
/// The closing ``` must appear at the start of a line so that fences
/// embedded inside JSON string values (code suggestions) do not end the match.
static FENCE_RE: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").expect("fence regex is valid")
});

/// Extract candidate JSON strings from a reply.
///
/// Returns the text itself, the span from the first `[` to the last `]`,
/// the spans from each `[` that opens a line to the last `]`, and the
/// content of any Markdown code fences, in that order.
fn extract_json_candidates(text: &str) -> Vec<String> {
    let mut candidates = vec![text.to_string()];

    if let Some(end) = text.rfind(']') {
        if let Some(start) = text.find('[').filter(|&start| start < end) {
            candidates.push(text[start..=end].to_string());
        }

        // Prose before the array may itself contain brackets
        let mut offset = 0;
        for line in text.split_inclusive('\n') {
            let indent = line.len() - line.trim_start().len();
            let start = offset + indent;
            if line.trim_start().starts_with('[') && start < end {
                let span = text[start..=end].to_string();
                if !candidates.contains(&span) {
                    candidates.push(span);
                }
            }
            offset += line.len();
        }
    }

    for cap in FENCE_RE.captures_iter(text) {
        if let Some(inner) = cap.get(1) {
            let inner = inner.as_str().trim();
            if !inner.is_empty() {
                candidates.push(inner.to_string());
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_config() -> ModelConfig {
        ModelConfig {
            endpoint: "https://models.example.com/chat/completions".to_string(),
            api_key: Some("key".to_string()),
            ..ModelConfig::default()
        }
    }

    #[test]
    fn parse_json_array() {
        let reviews = parse_review_response(
            r#"[{"lineNumber": 3, "reviewComment": "Unchecked index."},
                {"lineNumber": "9", "reviewComment": "Lock held across await."}]"#,
        )
        .unwrap();
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].line_number, 3);
        assert_eq!(reviews[1].line_number, 9);
        assert_eq!(reviews[1].review_comment, "Lock held across await.");
    }

    #[test]
    fn parse_empty_array() {
        assert!(parse_review_response("[]").unwrap().is_empty());
    }

    #[test]
    fn parse_whitespace_only() {
        assert!(parse_review_response("  \n ").unwrap().is_empty());
    }

    #[test]
    fn parse_reviews_wrapper() {
        let reviews = parse_review_response(
            r#"{"reviews": [{"lineNumber": 1, "reviewComment": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(reviews.len(), 1);
    }

    #[test]
    fn parse_markdown_fenced_json() {
        let response = "Here you go:\n```json\n[{\"lineNumber\": 4, \"reviewComment\": \"y\"}]\n```";
        let reviews = parse_review_response(response).unwrap();
        assert_eq!(reviews[0].line_number, 4);
    }

    #[test]
    fn parse_array_after_bracketed_prose() {
        let response = "Sure [see below]:\n[{\"lineNumber\": 5, \"reviewComment\": \"z\"}]";
        let reviews = parse_review_response(response).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].line_number, 5);
    }

    #[test]
    fn extract_json_candidates_includes_line_start_arrays() {
        let candidates = extract_json_candidates("See [1]:\n  [2]");
        assert_eq!(candidates[1], "[1]:\n  [2]");
        assert_eq!(candidates[2], "[2]");
    }

    #[test]
    fn prose_is_a_parse_error() {
        let err = parse_review_response("Looks good to me!").unwrap_err();
        assert!(matches!(err, ProviderError::ParseError(_)), "got: {err}");
    }

    #[test]
    fn wrong_shape_is_a_schema_error() {
        let err = parse_review_response(r#"[{"line": 3, "comment": "x"}]"#).unwrap_err();
        assert!(matches!(err, ProviderError::SchemaError(_)), "got: {err}");

        let err = parse_review_response(r#"{"verdict": "ok"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::SchemaError(_)), "got: {err}");
    }

    #[test]
    fn extract_json_candidates_returns_raw_first() {
        let candidates = extract_json_candidates("text [1] more");
        assert_eq!(candidates[0], "text [1] more");
        assert_eq!(candidates[1], "[1]");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let long = "é".repeat(PARSE_ERROR_PREVIEW_LEN);
        let cut = preview(&long);
        assert!(cut.len() <= PARSE_ERROR_PREVIEW_LEN);
    }

    #[test]
    fn reply_text_uses_first_choice() {
        let reply: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  [1]  "}},
                            {"message": {"content": "ignored"}}]}"#,
        )
        .unwrap();
        assert_eq!(reply_text(reply), "[1]");
    }

    #[test]
    fn reply_text_defaults_to_empty_array() {
        let reply: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(reply_text(reply), "[]");

        let reply: ChatResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(reply_text(reply), "[]");
    }

    #[test]
    fn request_body_shape() {
        let prompt = Prompt {
            system: "s".to_string(),
            output_format: "f".to_string(),
            user: "u".to_string(),
        };
        let body = ChatRequest {
            max_tokens: 700,
            messages: prompt.messages(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 700);
        assert_eq!(json["messages"].as_array().unwrap().len(), 3);
        assert_eq!(json["messages"][2]["role"], "user");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn new_requires_endpoint_and_key() {
        assert!(ChatCompletionsClient::new(&model_config()).is_ok());

        let mut config = model_config();
        config.endpoint = String::new();
        assert!(matches!(
            ChatCompletionsClient::new(&config),
            Err(ProviderError::NotConfigured(_))
        ));

        let mut config = model_config();
        config.api_key = Some(String::new());
        assert!(matches!(
            ChatCompletionsClient::new(&config),
            Err(ProviderError::NotConfigured(_))
        ));
    }
}
