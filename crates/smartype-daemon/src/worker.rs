//! Compiles preference snapshots off the async executor.

use smartype_core::compiler::compile_preferences;
use smartype_core::models::TextPreferences;
use smartype_core::serialization::serialize;
use smartype_core::{Result, SmartypeError};
use std::path::Path;

/// Compile `prefs` and serialize the rules on the blocking pool.
pub async fn compile_payload(prefs: TextPreferences) -> Result<Vec<u8>> {
    tokio::task::spawn_blocking(move || serialize(&compile_preferences(&prefs)))
        .await
        .map_err(|e| SmartypeError::Other(format!("Compile worker failed: {}", e)))?
}

/// Write a payload, creating the parent directory if needed.
pub async fn write_payload(path: &Path, payload: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, payload).await?;
    log::debug!("Wrote {} byte payload to {}", payload.len(), path.display());
    Ok(())
}
