//! Keeping one field's matcher in step with the user's preferences.

use crate::compiler::compile_preferences;
use crate::disposable::{CompositeDisposable, Disposable, SerialDisposable};
use crate::error::{Result, SmartypeError};
use crate::host::{EventRegistry, EventTarget};
use crate::hub::{HubRegistration, SharedHub};
use crate::matcher::{attach, CaretMatcher};
use crate::models::TextPreferences;
use crate::rule::CompiledRule;
use crate::serialization::deserialize;
use crate::storage::load_preferences_or_default;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

/// The last compiled rule set, tagged with the fingerprint of the snapshot
/// it came from (`None` for rules received already compiled).
#[derive(Default)]
pub struct RuleCache {
    entry: Option<(Option<u64>, Arc<[CompiledRule]>)>,
}

impl RuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<[CompiledRule]>> {
        self.entry.as_ref().map(|(_, rules)| Arc::clone(rules))
    }

    /// Rules for `prefs`, compiling only when the snapshot differs from the
    /// cached one.
    pub fn get_or_compile(&mut self, prefs: &TextPreferences) -> Arc<[CompiledRule]> {
        let fingerprint = prefs.fingerprint();
        if let Some((Some(cached), rules)) = &self.entry {
            if *cached == fingerprint {
                return Arc::clone(rules);
            }
        }

        let rules: Arc<[CompiledRule]> = compile_preferences(prefs).into();
        self.entry = Some((Some(fingerprint), Arc::clone(&rules)));
        rules
    }

    pub fn store(&mut self, rules: Arc<[CompiledRule]>) {
        self.entry = Some((None, rules));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

/// Text substitution on one field, reattached whenever new rules arrive.
pub struct SubstitutionSession {
    registry: EventRegistry,
    rules: Arc<[CompiledRule]>,
    attachment: SerialDisposable,
    resources: CompositeDisposable,
}

impl SubstitutionSession {
    /// Attach `rules` to `target`.
    pub fn attach<T>(target: &T, rules: Arc<[CompiledRule]>) -> Result<Self>
    where
        T: EventTarget + ?Sized,
    {
        let registry = target.event_registry().ok_or_else(|| {
            SmartypeError::Configuration("field is not an event target".to_string())
        })?;

        let mut session = Self {
            registry,
            rules: Arc::clone(&rules),
            attachment: SerialDisposable::new(),
            resources: CompositeDisposable::new(),
        };
        session.apply_rules(rules)?;
        Ok(session)
    }

    /// Attach using `overrides` when given, otherwise the cached rules, and
    /// only as a last resort the stored preferences.
    pub fn attach_with_cache<T>(
        target: &T,
        cache: &mut RuleCache,
        overrides: Option<&TextPreferences>,
    ) -> Result<Self>
    where
        T: EventTarget + ?Sized,
    {
        let rules = match (overrides, cache.current()) {
            (Some(prefs), _) => cache.get_or_compile(prefs),
            (None, Some(rules)) => rules,
            (None, None) => cache.get_or_compile(&load_preferences_or_default()?),
        };
        Self::attach(target, rules)
    }

    pub fn rules(&self) -> &Arc<[CompiledRule]> {
        &self.rules
    }

    /// Swap in a new rule set. The previous matcher is detached first.
    pub fn apply_rules(&mut self, rules: Arc<[CompiledRule]>) -> Result<()> {
        if self.attachment.is_disposed() {
            return Ok(());
        }

        self.attachment.clear();
        let matcher = Rc::new(CaretMatcher::new(Arc::clone(&rules)));
        let subscription = attach(&self.registry, matcher)?;
        self.attachment.set(Box::new(subscription));
        self.rules = rules;
        Ok(())
    }

    /// Swap in rules from a serialized payload. A bad payload leaves the
    /// current rules attached.
    pub fn apply_payload(&mut self, payload: &[u8]) -> Result<Arc<[CompiledRule]>> {
        let rules: Arc<[CompiledRule]> = deserialize(payload)?.into();
        log::info!("Text preferences changed, reattaching {} rules", rules.len());
        self.apply_rules(Arc::clone(&rules))?;
        Ok(rules)
    }

    /// Apply the newest payload waiting on `updates`, if any. Returns true
    /// when the rules changed.
    pub fn poll_updates(&mut self, updates: &Receiver<Vec<u8>>, cache: &mut RuleCache) -> Result<bool> {
        let mut latest = None;
        loop {
            match updates.try_recv() {
                Ok(payload) => latest = Some(payload),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        match latest {
            Some(payload) => {
                let rules = self.apply_payload(&payload)?;
                cache.store(rules);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Register with `hub` for preference changes. Payloads queue on the
    /// returned receiver until `poll_updates` applies them; disposing the
    /// session unregisters.
    pub fn subscribe(&mut self, hub: &SharedHub) -> Result<Receiver<Vec<u8>>> {
        let (tx, rx) = mpsc::channel();
        let registration = HubRegistration::register(hub, Box::new(tx))?;
        log::debug!("Session subscribed to preference changes as {:?}", registration.id());
        self.add_resource(Box::new(registration));
        Ok(rx)
    }

    /// Tie another resource to this session's lifetime.
    pub fn add_resource(&mut self, resource: Box<dyn Disposable>) {
        self.resources.add(resource);
    }
}

impl Disposable for SubstitutionSession {
    fn dispose(&mut self) {
        self.attachment.dispose();
        self.resources.dispose();
    }

    fn is_disposed(&self) -> bool {
        self.attachment.is_disposed()
    }
}
