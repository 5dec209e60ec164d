//! `scanscribe-prompt`: send one message to the hosted model and log the reply.

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, error, info};

use crate::config::Settings;
use crate::llm::LlmClient;

const DEFAULT_PROMPT: &str = "What is the capital of France?";

#[derive(Parser)]
#[command(name = "scanscribe-prompt")]
#[command(about = "Send one prompt to a hosted chat model and log the reply")]
#[command(version)]
pub struct Cli {
    /// Message to send
    #[arg(default_value = DEFAULT_PROMPT)]
    message: String,

    /// Model to use instead of the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Settings file (TOML)
    #[arg(short, long, env = "SCANSCRIBE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse arguments and run the prompt.
///
/// Settings and client construction errors are returned; a disabled client
/// or a failed completion is only logged.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(model) = cli.model.as_deref() {
        settings.llm = settings.llm.with_model(model);
    }

    let client = LlmClient::new(settings.llm)?;
    let Some(chat) = client.chat_model() else {
        error!("LLM is not initialized. Exiting.");
        return Ok(());
    };

    debug!("Prompting {}", chat.model());
    match chat.invoke(&cli.message).await {
        Ok(reply) => info!("Response: {}", reply),
        Err(e) => error!("An error occurred: {}", e),
    }
    Ok(())
}
