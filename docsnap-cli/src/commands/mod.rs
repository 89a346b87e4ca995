pub mod capture;
pub mod reveal;

use anyhow::{Context, Result};
use docsnap_core::PipelineConfig;

/// Resolve the cipher shift key: explicit flag first, environment second.
pub fn resolve_config(shift: Option<i32>) -> Result<PipelineConfig> {
    match shift {
        Some(key) => Ok(PipelineConfig::new(key)),
        None => PipelineConfig::from_env()
            .context("no shift key: pass --shift or set DOCSNAP_SHIFT_KEY"),
    }
}
