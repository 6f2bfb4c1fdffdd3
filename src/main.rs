use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use log::warn;
use std::path::PathBuf;
use std::sync::Arc;

use rag_tutor::config::Settings;
use rag_tutor::pipeline::RagSession;
use rag_tutor::providers::OpenAiProvider;

/// Retrieval-augmented study assistant.
///
/// Diagnostics go to stderr; the query result, when present, is the only
/// thing written to stdout, as one JSON object.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Process documents in the data directory
    #[arg(long)]
    process: bool,

    /// Specific file to process
    #[arg(long)]
    file: Option<PathBuf>,

    /// Query to ask the assistant
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    // Configuration errors stop everything before any pipeline work.
    let settings = Settings::from_env()?;
    let provider = Arc::new(OpenAiProvider::new(&settings));
    let mut session = RagSession::new(settings, provider)?;

    if args.process || args.file.is_some() {
        if let Some(file) = &args.file {
            // Known gap: single-file processing is not implemented, the
            // whole data directory is reprocessed instead.
            warn!(
                "--file {} reprocesses the entire data directory",
                file.display()
            );
        }
        session.process_documents().await?;
    }

    if let Some(question) = &args.query {
        let result = session.answer(question, 4).await?;
        println!("{}", serde_json::to_string(&result)?);
    }

    Ok(())
}
