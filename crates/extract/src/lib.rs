pub mod analyzer;
pub mod error;
pub mod escape;
pub mod json;
pub mod llm;
pub mod prompt;

pub use analyzer::{AnalyzeError, StatsAnalyzer};
pub use error::{ExtractionError, UnescapeError};
pub use escape::unescape;
pub use json::{JsonExtractor, Record, SpanStrategy, extract, locate_candidate};
pub use llm::{GeminiClient, GeminiConfig, TextGenerator};

use std::path::PathBuf;
use std::sync::Arc;

/// Load a `.env` file from the working directory or one of its parents.
/// Variables already present in the environment keep their values.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Analyzer backed by Gemini with the stats system prompt installed.
pub fn gemini_analyzer(client: GeminiClient, strategy: SpanStrategy) -> StatsAnalyzer {
    let client = client.with_system_instruction(prompt::SYSTEM_PROMPT);
    StatsAnalyzer::new(Arc::new(client)).with_strategy(strategy)
}
