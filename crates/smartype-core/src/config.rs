use crate::error::Result;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const PREFERENCES_FILENAME: &str = "preferences.json";
pub const PAYLOAD_FILENAME: &str = "rules.json";
pub const HOME_ENV_VAR: &str = "SMARTYPE_HOME";

/// Quiet period the watcher waits for before recompiling, matching the
/// debounce on the system's text preference notifications.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Get the smartype configuration directory
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = env::var(HOME_ENV_VAR) {
        return PathBuf::from(dir);
    }

    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".smartype"))
        .unwrap_or_else(|_| PathBuf::from(".smartype"))
}

/// Ensure the configuration directory and preferences file exist
pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    let prefs_path = get_preferences_file_path();
    if !prefs_path.exists() {
        create_empty_file(&prefs_path, "preferences file")?;
    }

    Ok(config_dir)
}

/// Create an empty config file at the specified path
pub fn create_empty_file(path: &Path, description: &str) -> Result<()> {
    log::info!("Creating {} at: {}", description, path.display());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, "")?;
    Ok(())
}

/// Get the path to the preferences file
pub fn get_preferences_file_path() -> PathBuf {
    get_config_dir().join(PREFERENCES_FILENAME)
}

/// Get the path to the compiled rule payload
pub fn get_payload_file_path() -> PathBuf {
    get_config_dir().join(PAYLOAD_FILENAME)
}
