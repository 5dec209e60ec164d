//! scanscribe-extract - PDF to text with OCR fallback.

use scanscribe::cli;

fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    cli::init_logging(cli::is_verbose());

    cli::extract::run()
}
