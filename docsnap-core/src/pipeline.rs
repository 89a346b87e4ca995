//! The capture pipeline controller and its state machine.
//!
//! One controller drives one document-capture attempt at a time:
//!
//! ```text
//! Live ──capture()──▶ Captured ──process()──▶ Processing ──▶ Stored
//!                                                   │
//!                                                   └──────▶ Failed(reason)
//! ```
//!
//! `retake()` returns to `Live` from any state, discarding the held frame
//! and re-acquiring the camera. Every run is tagged with a generation
//! number; a run abandoned by `retake()` discards its late result instead
//! of writing it into the current attempt.
//!
//! All collaborators are injected at construction, so the controller can be
//! exercised against fakes.

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, instrument, warn};

use crate::cipher::ShiftCipher;
use crate::config::PipelineConfig;
use crate::error::{DocsnapError, Result};
use crate::frame::{Frame, FrameCapture, VideoSource};
use crate::identity::IdentityProvider;
use crate::pattern::DocumentTypeSpec;
use crate::recognize::{TextExtractor, TextRecognizer};
use crate::store::{merge_field, RecordStore};

/// Why a pipeline run ended in [`CaptureStatus::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Recognized text contained no format-conforming field.
    NotFound,
    /// The recognition capability itself failed.
    RecognitionFailure,
    /// The record store could not be read or written.
    StoreUnavailable,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "field not found"),
            Self::RecognitionFailure => write!(f, "recognition failure"),
            Self::StoreUnavailable => write!(f, "store unavailable"),
        }
    }
}

/// Observable status of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Camera streaming, no frame held.
    Live,
    /// Frame held, extraction not yet started.
    Captured,
    /// Extraction, encoding, and the store merge are in flight.
    Processing,
    /// Terminal: the encoded field was merged into the user's record.
    Stored,
    /// Terminal: the run failed; the record was left as it was.
    Failed(FailureReason),
}

impl fmt::Display for CaptureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Captured => write!(f, "captured"),
            Self::Processing => write!(f, "processing"),
            Self::Stored => write!(f, "stored"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

struct RunState {
    status: CaptureStatus,
    generation: u64,
    frame: Option<Frame>,
}

/// Orchestrates capture → extract → encode → merge for one document type.
pub struct CapturePipeline {
    capture: AsyncMutex<FrameCapture>,
    state: Mutex<RunState>,
    extractor: TextExtractor,
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityProvider>,
    cipher: ShiftCipher,
    spec: DocumentTypeSpec,
}

impl CapturePipeline {
    pub fn new(
        source: Arc<dyn VideoSource>,
        recognizer: Arc<dyn TextRecognizer>,
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        spec: DocumentTypeSpec,
        config: PipelineConfig,
    ) -> Self {
        Self {
            capture: AsyncMutex::new(FrameCapture::new(source, config.guide)),
            state: Mutex::new(RunState {
                status: CaptureStatus::Live,
                generation: 0,
                frame: None,
            }),
            extractor: TextExtractor::new(recognizer),
            store,
            identity,
            cipher: ShiftCipher::new(config.shift_key),
            spec,
        }
    }

    /// Current pipeline status.
    pub fn status(&self) -> CaptureStatus {
        self.lock_state().status
    }

    /// Acquire the camera stream and enter `Live`.
    pub async fn start(&self) -> Result<()> {
        self.retake().await
    }

    /// Return to `Live` from any state: discard the held frame, abandon any
    /// in-flight run, stop the old stream, and acquire a fresh one.
    ///
    /// A failed re-acquisition is reported as `CameraUnavailable`; the
    /// pipeline stays `Live` without a stream and `retake()` can be called
    /// again.
    #[instrument(level = "info", skip(self))]
    pub async fn retake(&self) -> Result<()> {
        {
            let mut state = self.lock_state();
            state.generation += 1;
            state.frame = None;
            state.status = CaptureStatus::Live;
        }
        debug!("Retake: state reset, re-acquiring camera");
        self.capture.lock().await.reacquire().await
    }

    /// Crop the guide region out of the live stream: `Live → Captured`.
    ///
    /// One pipeline run at a time: invoking this in any state but `Live` is
    /// rejected synchronously with `AlreadyCapturing`. The camera stream is
    /// stopped whether or not the crop succeeds.
    #[instrument(level = "info", skip(self))]
    pub async fn capture(&self) -> Result<()> {
        let generation = {
            let mut state = self.lock_state();
            if state.status != CaptureStatus::Live {
                return Err(DocsnapError::AlreadyCapturing);
            }
            // Reserve the run so a concurrent capture is rejected.
            state.status = CaptureStatus::Captured;
            state.generation
        };

        let captured = self.capture.lock().await.capture();

        let mut state = self.lock_state();
        if state.generation != generation {
            debug!("Capture superseded by retake, frame discarded");
            return Ok(());
        }
        match captured {
            Ok(frame) => {
                state.frame = Some(frame);
                Ok(())
            }
            Err(e) => {
                state.status = CaptureStatus::Live;
                Err(e)
            }
        }
    }

    /// Extract, encode, and merge the held frame's field:
    /// `Captured → Processing → Stored | Failed`.
    ///
    /// Precondition failures (`NoIdentity`, `NoPendingFrame`,
    /// `AlreadyCapturing` for a run already in flight) are returned as
    /// errors and leave the state unchanged; `NoIdentity` keeps the frame
    /// held so a later attempt can proceed without re-capturing.
    ///
    /// Pipeline-stage failures do not surface as errors: they resolve to
    /// `Failed(reason)`, which is also the returned status. A run abandoned
    /// by `retake()` returns the pipeline's current status without touching
    /// the store.
    #[instrument(level = "info", skip(self), fields(tag = self.spec.tag()))]
    pub async fn process(&self) -> Result<CaptureStatus> {
        // Preconditions, rejected before any asynchronous work starts.
        let user_id = self.identity.current_user()?;
        let (frame, generation) = {
            let mut state = self.lock_state();
            if state.status == CaptureStatus::Processing {
                return Err(DocsnapError::AlreadyCapturing);
            }
            let frame = state.frame.take().ok_or(DocsnapError::NoPendingFrame)?;
            state.status = CaptureStatus::Processing;
            (frame, state.generation)
        };

        let value = match self.extractor.extract(&frame, &self.spec).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Extraction failed");
                return Ok(self.publish(generation, CaptureStatus::Failed(extraction_reason(&e))));
            }
        };
        let encoded = self.cipher.encode(value.as_str());

        // The user may have retaken while recognition was in flight; a
        // stale run must touch neither the store nor the status.
        if self.is_stale(generation) {
            debug!("Stale run result discarded before store merge");
            return Ok(self.status());
        }

        if let Err(e) =
            merge_field(self.store.as_ref(), &user_id, self.spec.field_key(), encoded).await
        {
            warn!(error = %e, "Record merge failed");
            return Ok(self.publish(
                generation,
                CaptureStatus::Failed(FailureReason::StoreUnavailable),
            ));
        }

        info!(field_key = self.spec.field_key(), "Field stored");
        Ok(self.publish(generation, CaptureStatus::Stored))
    }

    /// Capture and immediately process, the normal flow once the user has
    /// lined the document up in the guide frame.
    pub async fn capture_and_process(&self) -> Result<CaptureStatus> {
        self.capture().await?;
        self.process().await
    }

    fn publish(&self, generation: u64, terminal: CaptureStatus) -> CaptureStatus {
        let mut state = self.lock_state();
        if state.generation == generation {
            state.status = terminal;
        } else {
            debug!(?terminal, "Stale run status discarded");
        }
        state.status
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.lock_state().generation != generation
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RunState> {
        self.state.lock().expect("pipeline state poisoned")
    }
}

fn extraction_reason(error: &DocsnapError) -> FailureReason {
    match error {
        DocsnapError::NotFound => FailureReason::NotFound,
        _ => FailureReason::RecognitionFailure,
    }
}
