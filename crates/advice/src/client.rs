use crate::hint::{Hint, MAX_SUGGESTED};
use buildspace_common::AdviceConfig;
use serde_json::{Value, json};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum AdviceError {
    #[error("no API key configured")]
    MissingCredentials,
    #[error("request failed with HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<ureq::Error> for AdviceError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => AdviceError::Status(code),
            ureq::Error::Transport(t) => AdviceError::Transport(t.to_string()),
        }
    }
}

/// Anything that can produce a hint for a theme.
pub trait HintSource: Send + Sync {
    fn fetch(&self, theme: &str) -> Result<Hint, AdviceError>;
}

/// Ask `source` for a hint. Never fails: every error is logged and replaced by
/// [`Hint::fallback`].
pub fn request_hint(source: &dyn HintSource, theme: &str) -> Hint {
    match source.fetch(theme) {
        Ok(hint) => {
            tracing::info!(%theme, title = %hint.title, "hint received");
            hint
        }
        Err(e) => {
            tracing::warn!(%theme, "advice request failed, using fallback: {e}");
            Hint::fallback()
        }
    }
}

/// Gemini `generateContent` client with a structured JSON response.
pub struct GeminiClient {
    agent: ureq::Agent,
    url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(config: &AdviceConfig, api_key: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build();
        Self {
            agent,
            url: format!(
                "{}/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    /// Read the key from the configured variable, then `API_KEY`.
    pub fn from_env(config: &AdviceConfig) -> Self {
        let key = std::env::var(&config.api_key_env)
            .or_else(|_| std::env::var("API_KEY"))
            .ok();
        Self::new(config, key)
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }
}

impl HintSource for GeminiClient {
    fn fetch(&self, theme: &str) -> Result<Hint, AdviceError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(AdviceError::MissingCredentials)?;
        tracing::debug!(%theme, url = %self.url, "requesting hint");
        let response: Value = self
            .agent
            .post(&self.url)
            .set("x-goog-api-key", key)
            .send_json(request_body(theme))?
            .into_json()
            .map_err(|e| AdviceError::Transport(e.to_string()))?;
        parse_response(&response)
    }
}

fn prompt(theme: &str) -> String {
    format!(
        "Give me a creative building idea for a Minecraft-style game. The theme is: {theme}. \
         Include a catchy title, a short description, and a list of 3-4 suggested materials \
         (e.g., wood, cobblestone, glass, dirt, log, grass)."
    )
}

fn request_body(theme: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt(theme) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "description": { "type": "STRING" },
                    "suggestedMaterials": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" }
                    }
                },
                "required": ["title", "description", "suggestedMaterials"]
            }
        }
    })
}

/// Extract the hint from a `generateContent` response body.
pub fn parse_response(body: &Value) -> Result<Hint, AdviceError> {
    let text = body
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .ok_or_else(|| AdviceError::Malformed("no candidate text".into()))?;
    parse_hint_text(text)
}

/// Parse the model's JSON text into a hint, enforcing the material count.
pub fn parse_hint_text(text: &str) -> Result<Hint, AdviceError> {
    let mut hint: Hint = serde_json::from_str(text.trim())
        .map_err(|e| AdviceError::Malformed(e.to_string()))?;
    if hint.suggested_materials.is_empty() {
        return Err(AdviceError::Malformed("no suggested materials".into()));
    }
    hint.suggested_materials.truncate(MAX_SUGGESTED);
    Ok(hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl HintSource for Failing {
        fn fetch(&self, _theme: &str) -> Result<Hint, AdviceError> {
            Err(AdviceError::Transport("connection refused".into()))
        }
    }

    #[test]
    fn missing_credentials_yields_fallback() {
        let client = GeminiClient::new(&AdviceConfig::default(), None);
        assert!(!client.has_credentials());
        assert_eq!(request_hint(&client, "anything").title, "Simple Cabin");

        let blank = GeminiClient::new(&AdviceConfig::default(), Some("  ".into()));
        assert!(matches!(
            blank.fetch("anything"),
            Err(AdviceError::MissingCredentials)
        ));
    }

    #[test]
    fn transport_failure_yields_fallback() {
        assert_eq!(request_hint(&Failing, "Sky Castle"), Hint::fallback());
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let config = AdviceConfig {
            endpoint: "https://example.test/v1/models/".into(),
            model: "m1".into(),
            ..AdviceConfig::default()
        };
        let client = GeminiClient::new(&config, Some("k".into()));
        assert_eq!(client.url, "https://example.test/v1/models/m1:generateContent");
    }

    #[test]
    fn request_carries_theme_and_schema() {
        let body = request_body("Sky Castle");
        let text = body
            .pointer("/contents/0/parts/0/text")
            .and_then(Value::as_str)
            .unwrap();
        assert!(text.contains("Sky Castle"));
        assert_eq!(
            body.pointer("/generationConfig/responseSchema/required/2"),
            Some(&json!("suggestedMaterials"))
        );
    }

    #[test]
    fn parses_candidate_text() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{
                    "text": " {\"title\":\"Glass Spire\",\"description\":\"Shiny.\",\"suggestedMaterials\":[\"glass\",\"log\",\"wood\",\"dirt\",\"grass\"]} "
                }]}
            }]
        });
        let hint = parse_response(&body).unwrap();
        assert_eq!(hint.title, "Glass Spire");
        assert_eq!(hint.suggested_materials.len(), MAX_SUGGESTED);
    }

    #[test]
    fn malformed_bodies_are_rejected() {
        assert!(matches!(
            parse_response(&json!({ "candidates": [] })),
            Err(AdviceError::Malformed(_))
        ));
        assert!(matches!(
            parse_hint_text("not json"),
            Err(AdviceError::Malformed(_))
        ));
        assert!(matches!(
            parse_hint_text(r#"{"title":"t","description":"d","suggestedMaterials":[]}"#),
            Err(AdviceError::Malformed(_))
        ));
    }
}
