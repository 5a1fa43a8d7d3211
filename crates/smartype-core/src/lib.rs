pub mod boundary;
pub mod compiler;
pub mod config;
pub mod conflict;
pub mod disposable;
pub mod error;
pub mod field;
pub mod host;
pub mod hub;
pub mod matcher;
pub mod models;
pub mod punctuation;
pub mod rule;
pub mod serialization;
pub mod session;
pub mod storage;

// Re-export common items for convenience
pub use boundary::{is_boundary, word_start, BOUNDARY_CLASS};
pub use compiler::{compile, compile_preferences, compile_rule};
pub use config::{get_config_dir, get_payload_file_path, get_preferences_file_path, DEFAULT_DEBOUNCE_MS};
pub use disposable::{CompositeDisposable, Disposable, SerialDisposable, Subscription};
pub use error::{Result, SmartypeError};
pub use field::BufferField;
pub use host::{EventRegistry, EventTarget, FieldEvent, Key, KeyStroke, Modifiers, TextField};
pub use hub::{HubRegistration, PreferenceConsumer, PreferenceHub, SharedHub};
pub use matcher::{attach, find_substitution, CaretMatcher, Substitution};
pub use models::{RawSubstitutionRule, TextPreferences};
pub use punctuation::{scrub, smart_punctuation_rules};
pub use rule::{BoundaryMatch, BoundaryPattern, CompiledRule};
pub use serialization::{deserialize, serialize, RulePayload};
pub use session::{RuleCache, SubstitutionSession};
pub use storage::{
    add_substitution, delete_substitution, load_preferences, load_preferences_or_default,
    save_preferences, update_substitution,
};
