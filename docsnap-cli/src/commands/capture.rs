//! Capture command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use docsnap_core::{
    CapturePipeline, CaptureStatus, FailureReason, HttpOcrConfig, HttpRecognizer, MockRecognizer,
    SpecRegistry, StaticIdentity, StillSource, TextRecognizer,
};
use tracing::{debug, info};

use crate::store_file::JsonFileStore;

/// Execute the capture command.
#[allow(clippy::too_many_arguments)]
pub async fn execute(
    image: PathBuf,
    user: String,
    doc_type: String,
    records: PathBuf,
    shift: Option<i32>,
    mock_text: Option<String>,
    ocr_url: Option<String>,
) -> Result<()> {
    let photo = image::open(&image)
        .with_context(|| format!("Failed to read image: {}", image.display()))?
        .to_rgba8();
    info!(path = %image.display(), width = photo.width(), height = photo.height(), "Loaded document photo");

    let registry = SpecRegistry::builtin();
    let spec = registry
        .get(&doc_type)
        .ok_or_else(|| anyhow!("unknown document type: {doc_type}"))?
        .clone();

    let config = super::resolve_config(shift)?;
    let recognizer = build_recognizer(mock_text, ocr_url)?;

    let pipeline = CapturePipeline::new(
        Arc::new(StillSource::new(photo)),
        recognizer,
        Arc::new(JsonFileStore::new(records.clone())),
        Arc::new(StaticIdentity::new(user.clone())),
        spec.clone(),
        config,
    );

    pipeline
        .start()
        .await
        .context("Failed to open capture source")?;
    let status = pipeline
        .capture_and_process()
        .await
        .context("Capture run was rejected")?;
    debug!(%status, "Pipeline finished");

    match status {
        CaptureStatus::Stored => {
            println!();
            println!("{}", "Document field stored!".green().bold());
            println!();
            println!("   {} {}", "Field:".dimmed(), spec.field_key());
            println!("   {} {}", "User:".dimmed(), user);
            println!("   {} {}", "Records:".dimmed(), records.display());
            Ok(())
        }
        CaptureStatus::Failed(FailureReason::NotFound) => {
            Err(anyhow!("field was not detected, retake the photo"))
        }
        CaptureStatus::Failed(FailureReason::RecognitionFailure) => {
            Err(anyhow!("recognition failed, retake the photo"))
        }
        CaptureStatus::Failed(FailureReason::StoreUnavailable) => {
            Err(anyhow!("record store unavailable, nothing was saved"))
        }
        other => Err(anyhow!("pipeline ended in unexpected state: {other}")),
    }
}

fn build_recognizer(
    mock_text: Option<String>,
    ocr_url: Option<String>,
) -> Result<Arc<dyn TextRecognizer>> {
    if let Some(text) = mock_text {
        eprintln!(
            "{}",
            "Using scripted recognizer (no OCR service is called)".yellow()
        );
        return Ok(Arc::new(MockRecognizer::with_text(text)));
    }

    let config = match ocr_url {
        Some(endpoint) => HttpOcrConfig {
            endpoint,
            api_key: std::env::var("DOCSNAP_OCR_API_KEY").ok(),
            timeout: Duration::from_secs(10),
        },
        None => HttpOcrConfig::from_env()
            .context("no OCR endpoint: pass --ocr-url or set DOCSNAP_OCR_URL")?,
    };
    Ok(Arc::new(HttpRecognizer::new(config)?))
}
