pub mod watcher;
pub mod worker;

pub use watcher::{PreferenceWatcher, WatcherConfig};
pub use worker::{compile_payload, write_payload};
