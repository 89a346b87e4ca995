use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocsnapError {
    /// Capture was requested while no camera stream is attached.
    #[error("no active camera stream")]
    NoActiveStream,

    /// The camera could not be acquired (refused, busy, or absent).
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Recognized text contains no format-conforming field.
    #[error("no matching field found in recognized text")]
    NotFound,

    /// The optical-recognition collaborator itself failed.
    #[error("recognition failed: {0}")]
    RecognitionFailure(String),

    /// Fetch or write against the record store failed.
    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),

    /// No authenticated user identifier is available.
    #[error("no user identity available")]
    NoIdentity,

    /// A capture was requested while a run is already held or in flight.
    #[error("a capture is already in progress")]
    AlreadyCapturing,

    /// Processing was requested without a captured frame.
    #[error("no captured frame is pending")]
    NoPendingFrame,

    /// The guide rectangle does not fit the video dimensions.
    #[error("invalid guide region: {0}")]
    InvalidGuide(String),

    /// A configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, DocsnapError>;
