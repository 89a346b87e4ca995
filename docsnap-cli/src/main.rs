//! Docsnap CLI - capture and reveal identity-document fields.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod exit_codes;
mod store_file;

#[derive(Parser)]
#[command(name = "docsnap")]
#[command(author, version, about = "Document-field capture and encoded storage", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture a document field from a photo and store it encoded
    Capture {
        /// Document photo standing in for the live camera feed
        #[arg(long, value_name = "FILE")]
        image: PathBuf,

        /// User identifier the record is stored under
        #[arg(long, value_name = "ID")]
        user: String,

        /// Document type tag
        #[arg(long, default_value = "pan")]
        doc_type: String,

        /// Record file
        #[arg(long, default_value = "records.json", value_name = "FILE")]
        records: PathBuf,

        /// Cipher shift key (defaults to DOCSNAP_SHIFT_KEY)
        #[arg(long)]
        shift: Option<i32>,

        /// Use a scripted recognizer instead of the OCR service (for testing)
        #[arg(long, value_name = "TEXT", conflicts_with = "ocr_url")]
        mock_text: Option<String>,

        /// OCR service endpoint (defaults to DOCSNAP_OCR_URL)
        #[arg(long, value_name = "URL")]
        ocr_url: Option<String>,
    },

    /// Decode and print a stored document field
    Reveal {
        /// User identifier the record is stored under
        #[arg(long, value_name = "ID")]
        user: String,

        /// Document type tag
        #[arg(long, default_value = "pan")]
        doc_type: String,

        /// Record file
        #[arg(long, default_value = "records.json", value_name = "FILE")]
        records: PathBuf,

        /// Cipher shift key (defaults to DOCSNAP_SHIFT_KEY)
        #[arg(long)]
        shift: Option<i32>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Capture {
            image,
            user,
            doc_type,
            records,
            shift,
            mock_text,
            ocr_url,
        } => {
            commands::capture::execute(image, user, doc_type, records, shift, mock_text, ocr_url)
                .await
        }
        Commands::Reveal {
            user,
            doc_type,
            records,
            shift,
        } => commands::reveal::execute(user, doc_type, records, shift).await,
    };

    if let Err(err) = result {
        let exit = exit_codes::ExitCode::from_anyhow(&err);
        eprintln!("{} {err:#}", "error:".red().bold());
        std::process::exit(exit.code);
    }
}
