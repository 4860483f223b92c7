use anyhow::Result;
use clap::Parser;
use extract::analyzer::error_message;
use extract::{AnalyzeError, GeminiClient, GeminiConfig, Record, SpanStrategy, gemini_analyzer};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Ask the model for a cricketer's career stats and print the decoded JSON.
#[derive(Parser)]
#[command(name = "player_stats", version)]
struct Args {
    /// Player to look up
    #[arg(default_value = "Virat Kohli")]
    player_name: String,

    /// Span picked when the reply has no fenced json block
    #[arg(long, default_value = "greedy")]
    strategy: SpanStrategy,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    extract::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = GeminiConfig::from_env()?;
    let analyzer = gemini_analyzer(GeminiClient::from_config(&config)?, args.strategy);

    match render(analyzer.analyze(&args.player_name).await)? {
        Ok(json) => {
            println!("{}", json);
            Ok(ExitCode::SUCCESS)
        }
        Err(message) => {
            eprintln!("{}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Pretty JSON for stdout, or the error line for stderr.
fn render(outcome: Result<Record, AnalyzeError>) -> Result<Result<String, String>> {
    match outcome {
        Ok(record) => Ok(Ok(serde_json::to_string_pretty(&record)?)),
        Err(e) => Ok(Err(error_message(&e))),
    }
}
