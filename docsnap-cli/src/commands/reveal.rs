//! Reveal command implementation.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use colored::Colorize;
use docsnap_core::{RecordStore, ShiftCipher, SpecRegistry};

use crate::store_file::JsonFileStore;

/// Execute the reveal command: decode one stored field and print it.
pub async fn execute(
    user: String,
    doc_type: String,
    records: PathBuf,
    shift: Option<i32>,
) -> Result<()> {
    let registry = SpecRegistry::builtin();
    let spec = registry
        .get(&doc_type)
        .ok_or_else(|| anyhow!("unknown document type: {doc_type}"))?;

    let config = super::resolve_config(shift)?;

    let store = JsonFileStore::new(records);
    let record = store
        .get(&user)
        .await?
        .ok_or_else(|| anyhow!("no record stored for {user}"))?;
    let encoded = record
        .get(spec.field_key())
        .ok_or_else(|| anyhow!("no {} field stored for {user}", spec.field_key()))?;

    let value = ShiftCipher::new(config.shift_key).decode(encoded);
    println!("{} {}", format!("{}:", spec.field_key()).dimmed(), value.bold());
    Ok(())
}
