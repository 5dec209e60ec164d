//! scanscribe-prompt - one prompt in, one completion out.

use scanscribe::cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    cli::init_logging(cli::is_verbose());

    cli::prompt::run().await
}
