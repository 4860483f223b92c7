use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Upstream model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl GeminiConfig {
    /// Read `GOOGLE_API_KEY`, `GEMINI_MODEL`, `GEMINI_BASE_URL` and
    /// `CRICAI_REQUEST_TIMEOUT_SECS` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GOOGLE_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow::anyhow!("Missing GOOGLE_API_KEY in environment variables"))?;

        let timeout_secs = match lookup("CRICAI_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid CRICAI_REQUEST_TIMEOUT_SECS: {}", raw))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model: lookup("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs,
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

/// Anything that turns a prompt into free-form text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    system_instruction: Option<String>,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self> {
        Self::with_timeout(api_key, model, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            api_key,
            system_instruction: None,
            client,
        })
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let client = Self::with_timeout(
            config.api_key.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(client.with_base_url(config.base_url.as_str()))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: self.system_instruction.as_deref().map(|text| Content {
                role: None,
                parts: vec![RequestPart { text }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);

        let response = self.client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini request failed: {} {}", status, body.trim());
        }

        let gemini_response: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        response_text(gemini_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Text of the first candidate, parts joined.
fn response_text(response: GenerateResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "unspecified".to_string());
        anyhow::bail!("Gemini returned no candidates (block reason: {})", reason);
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|p| p.text)
        .collect();

    if text.is_empty() {
        anyhow::bail!(
            "Gemini candidate has no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unspecified")
        );
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::{HeaderMap, StatusCode}, routing::post};
    use serde_json::{Value, json};

    fn client() -> GeminiClient {
        GeminiClient::new("test-key".to_string(), "gemini-test".to_string())
            .unwrap()
            .with_system_instruction("Be a cricket statistician.")
    }

    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = GeminiConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.to_string(), "Missing GOOGLE_API_KEY in environment variables");

        let err = GeminiConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "  ")])).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_config_defaults_and_overrides() {
        let config = GeminiConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "k")])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);

        let config = GeminiConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "k"),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("CRICAI_REQUEST_TIMEOUT_SECS", "15"),
        ]))
        .unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout_secs, 15);

        let err = GeminiConfig::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "k"),
            ("CRICAI_REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("CRICAI_REQUEST_TIMEOUT_SECS"));
    }

    #[test]
    fn test_config_reads_dotenv_contents() {
        let contents = "# local settings\nGOOGLE_API_KEY=from-dotenv\nGEMINI_MODEL=\"gemini-1.5-pro\"\n";
        let vars: std::collections::HashMap<String, String> = dotenvy::from_read_iter(contents.as_bytes())
            .collect::<Result<_, _>>()
            .unwrap();

        let config = GeminiConfig::from_lookup(|key| vars.get(key).cloned()).unwrap();
        assert_eq!(config.api_key, "from-dotenv");
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_config_never_serializes_key() {
        let config = GeminiConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "secret")])).unwrap();
        let value = serde_json::to_value(&config).unwrap();
        assert!(value.get("api_key").is_none());
    }

    #[test]
    fn test_request_body_shape() {
        let client = client();
        let body = serde_json::to_value(client.build_request("Virat Kohli")).unwrap();
        assert_eq!(
            body,
            json!({
                "systemInstruction": {"parts": [{"text": "Be a cricket statistician."}]},
                "contents": [{"role": "user", "parts": [{"text": "Virat Kohli"}]}]
            })
        );
    }

    #[test]
    fn test_endpoint_uses_model() {
        let client = client().with_base_url("http://localhost:9999/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:9999/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"parts": [{"text": "```json\n{\"a\""}, {"text": ": 1}\n```"}]},
                "finishReason": "STOP"
            }]
        }))
        .unwrap();
        assert_eq!(response_text(response).unwrap(), "```json\n{\"a\": 1}\n```");
    }

    #[test]
    fn test_blocked_prompt_is_an_error() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();
        let err = response_text(response).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[tokio::test]
    async fn test_generate_against_stub() {
        let router = Router::new().route(
            "/v1beta/models/gemini-test:generateContent",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers.get("x-goog-api-key").unwrap(), "test-key");
                let name = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default().to_string();
                Json(json!({
                    "candidates": [{"content": {"parts": [{"text": format!("{{\"name\": \"{}\"}}", name)}]}}]
                }))
            }),
        );
        let base_url = spawn_stub(router).await;

        let text = client().with_base_url(base_url).generate("Jasprit Bumrah").await.unwrap();
        assert_eq!(text, r#"{"name": "Jasprit Bumrah"}"#);
    }

    #[tokio::test]
    async fn test_generate_reports_status() {
        let router = Router::new().route(
            "/v1beta/models/gemini-test:generateContent",
            post(|| async { (StatusCode::FORBIDDEN, "API key not valid") }),
        );
        let base_url = spawn_stub(router).await;

        let err = client().with_base_url(base_url).generate("Joe Root").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("403"));
        assert!(message.contains("API key not valid"));
    }
}
