use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::ExtractionError;
use crate::json::{JsonExtractor, Record, SpanStrategy};
use crate::llm::TextGenerator;
use crate::prompt;

#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("{0:#}")]
    Model(anyhow::Error),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

impl AnalyzeError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzeError::Model(_) => "model",
            AnalyzeError::Extraction(e) => e.kind(),
        }
    }
}

/// Asks the model about a player and decodes the stats record from its reply.
pub struct StatsAnalyzer {
    model: Arc<dyn TextGenerator>,
    extractor: JsonExtractor,
}

impl StatsAnalyzer {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self {
            model,
            extractor: JsonExtractor::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: SpanStrategy) -> Self {
        self.extractor = JsonExtractor::new(strategy);
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub async fn analyze(&self, player_name: &str) -> Result<Record, AnalyzeError> {
        let started = Instant::now();
        let user_prompt = prompt::build_user_prompt(player_name);
        info!(player = %user_prompt, model = self.model_name(), "Requesting player stats");

        let reply = self.model
            .generate(&user_prompt)
            .await
            .map_err(AnalyzeError::Model)?;
        let reply = reply.trim();
        tracing::debug!(player = %user_prompt, reply_len = reply.len(), "Model replied");

        let record = self.extractor.extract(reply)?;

        info!(
            player = %user_prompt,
            keys = record.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Player stats decoded"
        );
        Ok(record)
    }

    /// Like [`analyze`](Self::analyze), but a failure is folded into
    /// `{"error": "..."}`. The error itself is handed back alongside for
    /// callers that count failures.
    pub async fn player_stats(&self, player_name: &str) -> (Value, Option<AnalyzeError>) {
        match self.analyze(player_name).await {
            Ok(record) => (Value::Object(record), None),
            Err(e) => {
                warn!(player = %player_name.trim(), kind = e.kind(), error = %e, "Player stats failed");
                (json!({ "error": error_message(&e) }), Some(e))
            }
        }
    }
}

pub fn error_message(e: &AnalyzeError) -> String {
    format!("Failed to generate or parse response: {}", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned replies and remembers the prompts it saw.
    struct FakeModel {
        reply: Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(text.to_string()), prompts: Mutex::new(Vec::new()) })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self { reply: Err(message.to_string()), prompts: Mutex::new(Vec::new()) })
        }
    }

    #[async_trait]
    impl TextGenerator for FakeModel {
        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.reply.clone().map_err(anyhow::Error::msg)
        }

        fn model_name(&self) -> &str {
            "fake"
        }
    }

    #[tokio::test]
    async fn test_analyze_decodes_fenced_reply() {
        let model = FakeModel::replying("\n```json\n{\"player_profile\": {\"name\": \"Virat Kohli\"}}\n```\n");
        let analyzer = StatsAnalyzer::new(model.clone());

        let record = analyzer.analyze("  Virat Kohli ").await.unwrap();
        assert_eq!(record["player_profile"]["name"], json!("Virat Kohli"));
        assert_eq!(*model.prompts.lock().unwrap(), vec!["Virat Kohli".to_string()]);
    }

    #[tokio::test]
    async fn test_player_stats_folds_not_found() {
        let analyzer = StatsAnalyzer::new(FakeModel::replying("I don't know that player."));
        let (value, failure) = analyzer.player_stats("Nobody").await;
        assert_eq!(failure.map(|e| e.kind()), Some("not_found"));
        assert_eq!(
            value,
            json!({"error": "Failed to generate or parse response: No JSON found in response"})
        );
    }

    #[tokio::test]
    async fn test_player_stats_folds_model_error() {
        let analyzer = StatsAnalyzer::new(FakeModel::failing("quota exhausted"));
        let (value, failure) = analyzer.player_stats("Kane Williamson").await;
        assert_eq!(failure.map(|e| e.kind()), Some("model"));
        assert_eq!(
            value,
            json!({"error": "Failed to generate or parse response: quota exhausted"})
        );
    }

    #[tokio::test]
    async fn test_player_stats_passes_record_through() {
        let analyzer = StatsAnalyzer::new(FakeModel::replying("{\"note\": \"All data is accurate up to January 2025.\"}"));
        let (value, failure) = analyzer.player_stats("Ben Stokes").await;
        assert!(failure.is_none());
        assert_eq!(value, json!({"note": "All data is accurate up to January 2025."}));
    }

    #[tokio::test]
    async fn test_analyze_error_kinds() {
        let analyzer = StatsAnalyzer::new(FakeModel::replying("{\"summary\": \"cut off"));
        let err = analyzer.analyze("Steve Smith").await.unwrap_err();
        assert_eq!(err.kind(), "not_found");

        let analyzer = StatsAnalyzer::new(FakeModel::replying("{\"summary\": }"));
        let err = analyzer.analyze("Steve Smith").await.unwrap_err();
        assert_eq!(err.kind(), "parse_failure");
    }

    #[tokio::test]
    async fn test_strategy_is_applied() {
        let reply = "{\"player_info\": {\"role\": \"bowler\"}} and also {\"extra\": true}";
        let greedy = StatsAnalyzer::new(FakeModel::replying(reply));
        assert!(greedy.analyze("Rashid Khan").await.is_err());

        let balanced = StatsAnalyzer::new(FakeModel::replying(reply)).with_strategy(SpanStrategy::Balanced);
        let record = balanced.analyze("Rashid Khan").await.unwrap();
        assert_eq!(record["player_info"]["role"], json!("bowler"));
    }
}
