//! Perplexity chat completion client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use clubhouse_shared::LlmConfig;

use super::error::AskError;

/// Maximum question length, in characters.
pub const MAX_QUESTION_LEN: usize = 1000;

const SYSTEM_PROMPT: &str = "You are a professional golf caddie with extensive knowledge of golf course strategy. \
Provide specific advice for the hole described by the user. \
Include recommendations for tee shot direction, club selection, approach strategy, and green reading. \
Consider any weather conditions or player tendencies mentioned. \
Keep your response concise but thorough, focusing on practical advice. \
Respond in Japanese only.";

const MAX_ERROR_BODY: usize = 512;

/// Token accounting reported by the provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenUsage {
    /// Tokens in the prompt.
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens in the answer.
    #[serde(default)]
    pub completion_tokens: u32,
    /// Sum of both.
    #[serde(default)]
    pub total_tokens: u32,
}

/// An answer from the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Answer text.
    pub text: String,
    /// Token usage.
    pub usage: TokenUsage,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: String,
}

/// Check a question before sending it upstream.
///
/// Returns the trimmed question.
///
/// # Errors
///
/// Returns [`AskError::Validation`] when empty or longer than
/// [`MAX_QUESTION_LEN`] characters.
pub fn validate_question(question: &str) -> Result<&str, AskError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AskError::Validation("question is required".to_string()));
    }
    if question.chars().count() > MAX_QUESTION_LEN {
        return Err(AskError::Validation(format!(
            "question must be at most {MAX_QUESTION_LEN} characters"
        )));
    }
    Ok(question)
}

fn parse_completion(body: &[u8]) -> Result<Answer, AskError> {
    let response: ChatResponse =
        serde_json::from_slice(body).map_err(|e| AskError::Malformed(e.to_string()))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AskError::Malformed("response has no choices".to_string()))?;

    Ok(Answer {
        text: choice.message.content,
        usage: response.usage,
    })
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

/// Client for an OpenAI-compatible chat completion endpoint.
///
/// Built once at startup and shared through application state.
#[derive(Debug, Clone)]
pub struct PerplexityClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl PerplexityClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AskError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: LlmConfig) -> Result<Self, AskError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AskError::Transport(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Whether an API key is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Model name sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'))
    }

    /// Ask one question.
    ///
    /// # Errors
    ///
    /// Returns an error if the question is invalid, no key is configured, or
    /// the provider call fails in any way.
    pub async fn ask(&self, question: &str) -> Result<Answer, AskError> {
        let question = validate_question(question)?;
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => key,
            _ => return Err(AskError::NotConfigured),
        };

        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: question,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(AskError::Status {
                status: status.as_u16(),
                body: truncate(&String::from_utf8_lossy(&body)),
            });
        }

        parse_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   \n")]
    fn test_blank_question_rejected(#[case] question: &str) {
        let err = validate_question(question).unwrap_err();
        assert_eq!(err.to_string(), "question is required");
    }

    #[test]
    fn test_question_length_limit() {
        let max = "あ".repeat(MAX_QUESTION_LEN);
        assert_eq!(validate_question(&max).unwrap(), max);

        let over = "a".repeat(MAX_QUESTION_LEN + 1);
        assert!(matches!(
            validate_question(&over),
            Err(AskError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_completion() {
        let body = br#"{
            "id": "abc",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Aim left of the bunker."}}],
            "usage": {"prompt_tokens": 90, "completion_tokens": 12, "total_tokens": 102}
        }"#;

        let answer = parse_completion(body).unwrap();
        assert_eq!(answer.text, "Aim left of the bunker.");
        assert_eq!(answer.usage.total_tokens, 102);
        assert_eq!(answer.usage.prompt_tokens, 90);
    }

    #[test]
    fn test_parse_completion_without_usage() {
        let body = br#"{"choices": [{"message": {"content": "Hybrid."}}]}"#;
        let answer = parse_completion(body).unwrap();
        assert_eq!(answer.usage, TokenUsage::default());
    }

    #[rstest]
    #[case(br#"{"choices": []}"#.as_slice())]
    #[case(b"<html>bad gateway</html>".as_slice())]
    #[case(br#"{"error": "nope"}"#.as_slice())]
    fn test_parse_completion_malformed(#[case] body: &[u8]) {
        assert!(matches!(parse_completion(body), Err(AskError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_ask_without_key_is_not_configured() {
        let client = PerplexityClient::new(LlmConfig::default()).unwrap();
        assert!(!client.is_configured());
        assert!(matches!(
            client.ask("Driver or 3-wood on a 280 yard par 4?").await,
            Err(AskError::NotConfigured)
        ));
        assert!(matches!(client.ask(" ").await, Err(AskError::Validation(_))));
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = LlmConfig {
            api_url: "https://api.perplexity.ai/".into(),
            ..LlmConfig::default()
        };
        let client = PerplexityClient::new(config).unwrap();
        assert_eq!(client.endpoint(), "https://api.perplexity.ai/chat/completions");
        assert_eq!(client.model(), "sonar-pro");
    }
}
