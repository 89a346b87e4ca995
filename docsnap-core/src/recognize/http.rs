//! HTTP-backed recognizer for a remote OCR service.

use std::io::Cursor;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::TextRecognizer;
use crate::error::{DocsnapError, Result};
use crate::frame::Frame;

/// Configuration for the HTTP OCR client.
#[derive(Clone)]
pub struct HttpOcrConfig {
    /// Recognition endpoint URL.
    pub endpoint: String,
    /// Bearer token, when the service requires one.
    pub api_key: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for HttpOcrConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOcrConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpOcrConfig {
    /// Create configuration from environment variables.
    ///
    /// Required: `DOCSNAP_OCR_URL`
    /// Optional: `DOCSNAP_OCR_API_KEY`
    pub fn from_env() -> Result<Self> {
        let endpoint = std::env::var("DOCSNAP_OCR_URL").map_err(|_| {
            DocsnapError::Configuration("DOCSNAP_OCR_URL environment variable not set".into())
        })?;
        let api_key = std::env::var("DOCSNAP_OCR_API_KEY").ok();

        Ok(Self {
            endpoint,
            api_key,
            timeout: Duration::from_secs(10),
        })
    }
}

/// OCR request: the frame as base64 PNG plus the document tag, so the
/// service can pick a tuned model.
#[derive(Debug, Serialize)]
struct RecognizeRequest<'a> {
    image: String,
    document_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    text: String,
}

/// Remote OCR client.
///
/// Exactly one attempt per call: the recognition contract forbids
/// client-side retry, and a failed recognition is resolved by retaking the
/// photo.
pub struct HttpRecognizer {
    client: Client,
    config: HttpOcrConfig,
}

impl HttpRecognizer {
    #[instrument(level = "debug", skip_all, fields(endpoint = %config.endpoint))]
    pub fn new(config: HttpOcrConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .https_only(true)
            .build()
            .map_err(|e| {
                DocsnapError::Configuration(format!("failed to create HTTP client: {e}"))
            })?;

        debug!("OCR client created");
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TextRecognizer for HttpRecognizer {
    #[instrument(level = "info", skip(self, frame), fields(tag = document_tag))]
    async fn recognize(&self, frame: &Frame, document_tag: &str) -> Result<String> {
        let start = Instant::now();
        let request = RecognizeRequest {
            image: encode_frame_png(frame)?,
            document_type: document_tag,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "OCR request failed");
            DocsnapError::RecognitionFailure(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "OCR service returned error status");
            return Err(DocsnapError::RecognitionFailure(format!(
                "service returned status: {status}"
            )));
        }

        let parsed: RecognizeResponse = response.json().await.map_err(|e| {
            DocsnapError::RecognitionFailure(format!("failed to parse response: {e}"))
        })?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            chars = parsed.text.len(),
            "Recognition completed"
        );
        Ok(parsed.text)
    }
}

/// Encode the frame's pixels as a base64 PNG for transport.
fn encode_frame_png(frame: &Frame) -> Result<String> {
    let mut buf = Cursor::new(Vec::new());
    frame
        .image()
        .write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| DocsnapError::RecognitionFailure(format!("failed to encode frame: {e}")))?;
    Ok(base64::engine::general_purpose::STANDARD.encode(buf.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::GuideRegion;

    #[test]
    fn test_config_debug_redacts_api_key() {
        let config = HttpOcrConfig {
            endpoint: "https://ocr.example.com/v1/recognize".into(),
            api_key: Some("secret-token".into()),
            timeout: Duration::from_secs(10),
        };
        let rendered = format!("{config:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("secret-token"));
    }

    #[test]
    fn test_frame_encodes_to_base64_png() {
        let frame = Frame::new(
            image::RgbaImage::new(4, 4),
            GuideRegion {
                x: 0,
                y: 0,
                width: 4,
                height: 4,
            },
        );
        let encoded = encode_frame_png(&frame).unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        // PNG signature
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }
}
