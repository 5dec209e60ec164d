//! `scanscribe-extract`: PDF-to-text pipeline commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::Settings;
use crate::ocr::{check_tools, install_hint};
use crate::services::{PdfLoader, TEXTDATA_DIR};

#[derive(Parser)]
#[command(name = "scanscribe-extract")]
#[command(about = "Extract text from PDFs into a textdata folder, falling back to OCR for scans")]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true, env = "SCANSCRIBE_CONFIG")]
    config: Option<PathBuf>,

    /// OCR language (Tesseract code such as eng, deu, fra)
    #[arg(long, global = true)]
    lang: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract one PDF into the textdata folder next to it
    File {
        /// PDF file to extract
        pdf: PathBuf,
        /// Output file name (always placed inside the textdata folder)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract every PDF directly inside a directory into DIR/textdata
    Batch {
        /// Directory containing PDF files
        dir: PathBuf,
        /// Requested output folder (output always goes to DIR/textdata)
        #[arg(short, long)]
        output_folder: Option<PathBuf>,
        /// Match .PDF and other extension casings too
        #[arg(long)]
        ignore_case: bool,
    },

    /// Check if required extraction tools are installed
    Check,
}

/// Parse arguments and run the selected command.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(lang) = cli.lang {
        settings.ocr.language = lang;
    }

    match cli.command {
        Commands::File { pdf, output } => cmd_file(&settings, pdf, output),
        Commands::Batch {
            dir,
            output_folder,
            ignore_case,
        } => {
            if ignore_case {
                settings.batch.case_insensitive = true;
            }
            cmd_batch(&settings, dir, output_folder)
        }
        Commands::Check => cmd_check(&settings),
    }
}

fn cmd_file(settings: &Settings, pdf: PathBuf, output: Option<PathBuf>) -> anyhow::Result<()> {
    let loader = PdfLoader::from_settings(settings);
    let written = loader.save_as_text(&pdf, output.as_deref())?;

    println!("{} {}", style("✓").green(), written.display());
    Ok(())
}

fn cmd_batch(
    settings: &Settings,
    dir: PathBuf,
    output_folder: Option<PathBuf>,
) -> anyhow::Result<()> {
    let loader = PdfLoader::from_settings(settings);
    let report = loader.batch_convert(&dir, output_folder.as_deref())?;

    println!(
        "\n{} {} of {} PDFs into {}",
        style("Converted").bold(),
        report.converted.len(),
        report.attempted(),
        dir.join(TEXTDATA_DIR).display()
    );
    for (pdf, reason) in &report.failed {
        println!(
            "  {} {}: {}",
            style("✗").red(),
            pdf.display(),
            style(reason).dim()
        );
    }
    Ok(())
}

fn cmd_check(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("Extraction Tool Status").bold());
    println!("{}", "-".repeat(50));

    let mut all_found = true;
    for (tool, available) in check_tools() {
        let status = if available {
            style("✓ found".to_string()).green()
        } else {
            all_found = false;
            style(format!("✗ not found ({})", install_hint(&tool))).red()
        };
        println!("  {:<15} {}", tool, status);
    }

    let loader = PdfLoader::from_settings(settings);
    let extractor = loader.extractor();
    println!("\n{}", style("OCR:").cyan());
    println!("  {}", style(extractor.ocr_backend().availability_hint()).dim());
    println!("  Resolution: {} DPI", extractor.config().dpi);

    if !all_found {
        println!(
            "\n{}",
            style("Some tools are missing; PDFs needing them will produce empty text.").yellow()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_command() {
        let cli = Cli::try_parse_from([
            "scanscribe-extract",
            "--lang",
            "deu",
            "file",
            "scans/report.pdf",
            "-o",
            "out/report.txt",
        ])
        .unwrap();
        assert_eq!(cli.lang.as_deref(), Some("deu"));
        match cli.command {
            Commands::File { pdf, output } => {
                assert_eq!(pdf, PathBuf::from("scans/report.pdf"));
                assert_eq!(output, Some(PathBuf::from("out/report.txt")));
            }
            _ => panic!("expected file command"),
        }
    }

    #[test]
    fn test_parse_batch_command() {
        let cli =
            Cli::try_parse_from(["scanscribe-extract", "batch", "scans", "--ignore-case", "-v"])
                .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Batch {
                dir,
                output_folder,
                ignore_case,
            } => {
                assert_eq!(dir, PathBuf::from("scans"));
                assert!(output_folder.is_none());
                assert!(ignore_case);
            }
            _ => panic!("expected batch command"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["scanscribe-extract"]).is_err());
    }
}
