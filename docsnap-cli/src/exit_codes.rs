//! Exit codes following sysexits.h conventions.
//!
//! These codes give scripts and CI systems semantic failure modes to branch
//! on, beyond success/failure.

#![allow(dead_code)] // Constants may be used in future or for documentation

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (the field was not detected or recognition failed).
/// Maps to EX_DATAERR from sysexits.h.
pub const EXTRACTION_FAILED: i32 = 65;

/// Cannot open the input image.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// Service unavailable (record store, OCR service, camera).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const SERVICE_ERROR: i32 = 69;

/// I/O error (cannot write the record file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify error by inspecting the chain
        let code = if message.contains("unknown document type") {
            USAGE_ERROR
        } else if message.contains("Failed to read image") {
            INPUT_ERROR
        } else if message.contains("not detected") || message.contains("recognition failed") {
            EXTRACTION_FAILED
        } else if message.contains("store unavailable")
            || message.contains("camera unavailable")
            || message.contains("OCR")
        {
            SERVICE_ERROR
        } else if message.contains("failed to write") {
            IO_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}
