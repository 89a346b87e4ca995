//! Pipeline configuration.

use crate::error::{DocsnapError, Result};
use crate::frame::GuideConfig;

/// Configuration for one capture pipeline: the cipher shift key and the
/// guide-frame geometry.
///
/// The shift key is always an explicit value here; `from_env` is a
/// convenience for reading it from `DOCSNAP_SHIFT_KEY`, not an ambient
/// dependency of the codec.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub shift_key: i32,
    pub guide: GuideConfig,
}

impl PipelineConfig {
    pub fn new(shift_key: i32) -> Self {
        Self {
            shift_key,
            guide: GuideConfig::default(),
        }
    }

    pub fn with_guide(mut self, guide: GuideConfig) -> Self {
        self.guide = guide;
        self
    }

    /// Read configuration from environment variables.
    ///
    /// Required: `DOCSNAP_SHIFT_KEY` (integer)
    pub fn from_env() -> Result<Self> {
        let raw = std::env::var("DOCSNAP_SHIFT_KEY").map_err(|_| {
            DocsnapError::Configuration("DOCSNAP_SHIFT_KEY environment variable not set".into())
        })?;
        let shift_key = raw.parse::<i32>().map_err(|e| {
            DocsnapError::Configuration(format!("DOCSNAP_SHIFT_KEY is not an integer: {e}"))
        })?;
        Ok(Self::new(shift_key))
    }
}
