//! Watches the preferences file and pushes freshly compiled rules to every
//! registered consumer.
//!
//! Change events come from `notify` on the file's directory, so editors that
//! replace the file instead of writing it in place are seen too. A change
//! starts a debounce window; every further change inside the window restarts
//! it, so a burst of edits produces a single recompile once the file has been
//! quiet for the whole window.

use crate::worker::{compile_payload, write_payload};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use smartype_core::config::{get_payload_file_path, get_preferences_file_path, DEFAULT_DEBOUNCE_MS};
use smartype_core::hub::{PreferenceHub, SharedHub};
use smartype_core::models::TextPreferences;
use smartype_core::storage::load_preferences_at;
use smartype_core::{Result, SmartypeError};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{self, Instant};

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub preferences_path: PathBuf,
    /// Where to keep a copy of the latest payload, if anywhere.
    pub payload_path: Option<PathBuf>,
    pub debounce: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            preferences_path: get_preferences_file_path(),
            payload_path: Some(get_payload_file_path()),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

impl WatcherConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

fn watch_error(path: &Path, err: notify::Error) -> SmartypeError {
    SmartypeError::Other(format!("Failed to watch {}: {}", path.display(), err))
}

/// Start a `notify` watcher on the directory holding `path`, forwarding a
/// signal for every create, modify or remove of that file name.
fn watch_file(path: &Path) -> Result<(RecommendedWatcher, mpsc::UnboundedReceiver<()>)> {
    let file_name: OsString = path
        .file_name()
        .ok_or_else(|| {
            SmartypeError::Configuration(format!("{} does not name a file", path.display()))
        })?
        .to_os_string();
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let (tx, rx) = mpsc::unbounded_channel();
    let mut watcher = notify::recommended_watcher(move |event: notify::Result<notify::Event>| {
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                log::warn!("File watcher error: {}", err);
                return;
            }
        };
        if !matches!(
            event.kind,
            EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
        ) {
            return;
        }
        if event
            .paths
            .iter()
            .any(|changed| changed.file_name() == Some(file_name.as_os_str()))
        {
            let _ = tx.send(());
        }
    })
    .map_err(|err| watch_error(path, err))?;

    watcher
        .watch(&parent, RecursiveMode::NonRecursive)
        .map_err(|err| watch_error(path, err))?;

    Ok((watcher, rx))
}

pub struct PreferenceWatcher {
    config: WatcherConfig,
    hub: SharedHub,
    // Dropping the watcher stops the events.
    _watcher: RecommendedWatcher,
    changes: mpsc::UnboundedReceiver<()>,
}

impl PreferenceWatcher {
    /// Starts listening right away: changes made from here on count, the
    /// file's current state does not.
    pub fn new(config: WatcherConfig, hub: SharedHub) -> Result<Self> {
        let (watcher, changes) = watch_file(&config.preferences_path)?;
        Ok(Self {
            config,
            hub,
            _watcher: watcher,
            changes,
        })
    }

    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    fn load(&self) -> Result<TextPreferences> {
        match load_preferences_at(&self.config.preferences_path) {
            Err(SmartypeError::PreferencesNotFound(_)) => Ok(TextPreferences::default()),
            other => other,
        }
    }

    /// Compile the current preferences and deliver them. Returns how many
    /// consumers received the payload.
    pub async fn publish(&self) -> Result<usize> {
        let payload = compile_payload(self.load()?).await?;

        if let Some(path) = &self.config.payload_path {
            write_payload(path, &payload).await?;
        }

        let delivered = PreferenceHub::notify(&self.hub, &payload)?;

        log::info!("Text preferences changed, notified {} consumers", delivered);
        Ok(delivered)
    }

    /// Watch until `shutdown` turns true or its sender goes away. Returns the
    /// number of recompiles.
    ///
    /// A recompile that fails (for example on a half-written file) is logged
    /// and the watcher keeps going; the next change retries.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<u64> {
        let mut deadline: Option<Instant> = None;
        let mut published = 0;

        log::info!(
            "Watching {} for changes",
            self.config.preferences_path.display()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                change = self.changes.recv() => {
                    if change.is_none() {
                        log::warn!("File watcher stopped delivering events");
                        break;
                    }
                    log::debug!("Preferences file {} changed", self.config.preferences_path.display());
                    deadline = Some(Instant::now() + self.config.debounce);
                }
                _ = time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    deadline = None;
                    match self.publish().await {
                        Ok(_) => published += 1,
                        Err(e) => log::warn!("Failed to recompile text preferences: {}", e),
                    }
                }
            }
        }

        log::info!("Preference watcher stopped after {} recompiles", published);
        Ok(published)
    }
}
