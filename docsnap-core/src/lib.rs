//! Docsnap Core - document-field capture and storage pipeline
//!
//! This crate captures a single frame from a live video feed of a physical
//! identity document, extracts one target text field via an external
//! optical-recognition capability, validates it against a document-type
//! format rule, reversibly encodes it, and merges it into a per-user record
//! without disturbing other stored fields.
//!
//! # Design
//!
//! - Explicit state machine (`Live → Captured → Processing → Stored/Failed`)
//!   with one in-flight run at a time
//! - All collaborators (camera, recognizer, record store, identity) injected
//!   as traits, so every stage can be exercised against fakes
//! - The camera stream is a scoped resource: stopped exactly once on every
//!   path out of `Live`/`Captured`, including errors
//! - Field encoding is a reversible shift transform: obfuscation for
//!   stored values, not cryptographic confidentiality
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use docsnap_core::{
//!     CapturePipeline, CaptureStatus, DocumentTypeSpec, MemoryRecordStore,
//!     MockRecognizer, PipelineConfig, StaticIdentity, StillSource,
//! };
//!
//! # async fn example() -> docsnap_core::Result<()> {
//! // In production the source wraps the device camera and the recognizer
//! // calls the OCR service; both are swapped for fakes here.
//! let source = Arc::new(StillSource::new(image::RgbaImage::new(640, 480)));
//! let recognizer = Arc::new(MockRecognizer::with_text("ABCDE1234F"));
//! let store = Arc::new(MemoryRecordStore::new());
//! let identity = Arc::new(StaticIdentity::new("user@example.com"));
//!
//! let pipeline = CapturePipeline::new(
//!     source,
//!     recognizer,
//!     store,
//!     identity,
//!     DocumentTypeSpec::pan(),
//!     PipelineConfig::new(3),
//! );
//!
//! pipeline.start().await?;
//! let status = pipeline.capture_and_process().await?;
//! assert_eq!(status, CaptureStatus::Stored);
//! # Ok(())
//! # }
//! ```

pub mod cipher;
pub mod config;
pub mod error;
pub mod frame;
pub mod identity;
pub mod pattern;
pub mod pipeline;
pub mod recognize;
pub mod store;

// Re-export main types for convenience
pub use cipher::ShiftCipher;
pub use config::PipelineConfig;
pub use error::{DocsnapError, Result};
pub use frame::{Frame, FrameCapture, GuideConfig, GuideRegion, StillSource, StillStream,
    VideoSource, VideoStream};
pub use identity::{AnonymousIdentity, IdentityProvider, StaticIdentity};
pub use pattern::{DocumentFieldValue, DocumentTypeSpec, SpecRegistry};
pub use pipeline::{CapturePipeline, CaptureStatus, FailureReason};
pub use recognize::{MockRecognizer, TextExtractor, TextRecognizer};
pub use store::{merge_field, MemoryRecordStore, RecordStore, UserRecord};

#[cfg(feature = "network")]
pub use recognize::{HttpOcrConfig, HttpRecognizer};
