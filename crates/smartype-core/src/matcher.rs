//! The per-field controller that substitutes the word before the caret.
//!
//! Only the word block ending at the caret is examined, never the whole
//! value, so pasting or undoing into the middle of a field cannot trigger
//! substitutions elsewhere.

use crate::boundary::{floor_char_boundary, word_start};
use crate::conflict;
use crate::disposable::Subscription;
use crate::error::{Result, SmartypeError};
use crate::host::{listener, EventKind, EventTarget, FieldEvent, KeyStroke, TextField};
use crate::rule::CompiledRule;
use std::cell::Cell;
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

/// One edit to apply to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub range: Range<usize>,
    pub text: String,
    /// Index of the rule that produced the edit.
    pub rule: usize,
}

/// Find the edit for the word block ending at `caret`, trying `rules` in
/// order and returning the first match that survives conflict resolution.
pub fn find_substitution(rules: &[CompiledRule], value: &str, caret: usize) -> Option<Substitution> {
    let caret = floor_char_boundary(value, caret);
    let start = word_start(value, caret);
    let block = &value[start..caret];
    if block.is_empty() {
        return None;
    }

    for (index, rule) in rules.iter().enumerate() {
        let Some(found) = rule.matcher.find(block) else {
            continue;
        };

        log::debug!(
            "Got a match of length {} at index {}: {:?}",
            found.matched.len(),
            found.start,
            found.matched
        );

        if !conflict::survives(rules, index, &found) {
            continue;
        }

        return Some(Substitution {
            range: start + found.start..start + found.end,
            text: rule.expand(&found),
            rule: index,
        });
    }

    None
}

/// Resets the suppressed flag when a pass ends, however it ends.
struct PassGuard<'a> {
    suppressed: &'a Cell<bool>,
}

impl<'a> PassGuard<'a> {
    fn enter(suppressed: &'a Cell<bool>) -> Option<Self> {
        if suppressed.replace(true) {
            return None;
        }
        Some(Self { suppressed })
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.suppressed.set(false);
    }
}

/// Substitutes text as the user types into one field.
///
/// While `suppressed` is set (after a paste, an undo/redo or backspace key
/// down, and during its own edits) input events are ignored. A key up clears
/// it.
pub struct CaretMatcher {
    rules: Arc<[CompiledRule]>,
    suppressed: Cell<bool>,
}

impl CaretMatcher {
    pub fn new(rules: Arc<[CompiledRule]>) -> Self {
        Self {
            rules,
            suppressed: Cell::new(false),
        }
    }

    pub fn rules(&self) -> &Arc<[CompiledRule]> {
        &self.rules
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed.get()
    }

    pub fn on_key_down(&self, stroke: &KeyStroke) {
        if stroke.is_undo_redo() || stroke.is_backspace() {
            log::debug!("Ignoring input until key up after {:?}", stroke.key);
            self.suppressed.set(true);
        }
    }

    pub fn on_paste(&self) {
        self.suppressed.set(true);
    }

    pub fn on_key_up(&self) {
        self.suppressed.set(false);
    }

    /// Run one substitution pass. Returns the edit that was applied, if any.
    pub fn on_input(&self, field: &mut dyn TextField) -> Option<Substitution> {
        let _guard = PassGuard::enter(&self.suppressed)?;

        let caret = field.selection().end;
        let substitution = find_substitution(&self.rules, field.value(), caret)?;

        log::debug!(
            "Replacing {:?} with {:?}",
            &field.value()[substitution.range.clone()],
            substitution.text
        );
        field.insert_text(substitution.range.clone(), &substitution.text);

        Some(substitution)
    }

    pub fn handle_event(&self, event: &FieldEvent, field: &mut dyn TextField) {
        match event {
            FieldEvent::KeyDown(stroke) => self.on_key_down(stroke),
            FieldEvent::KeyUp(_) => self.on_key_up(),
            FieldEvent::Paste => self.on_paste(),
            FieldEvent::Input => {
                self.on_input(field);
            }
        }
    }
}

/// Register `matcher` for the four field events it needs.
///
/// Fails without registering anything when the target has no event support.
pub fn attach<T>(target: &T, matcher: Rc<CaretMatcher>) -> Result<Subscription>
where
    T: EventTarget + ?Sized,
{
    let registry = target.event_registry().ok_or_else(|| {
        SmartypeError::Configuration("field is not an event target".to_string())
    })?;

    let ids = [
        EventKind::KeyDown,
        EventKind::Paste,
        EventKind::KeyUp,
        EventKind::Input,
    ]
    .into_iter()
    .map(|kind| {
        let matcher = Rc::clone(&matcher);
        registry.add_listener(kind, listener(move |event, field| matcher.handle_event(event, field)))
    })
    .collect();

    log::debug!(
        "Added input listener matching against {} replacements",
        matcher.rules().len()
    );

    Ok(Subscription::new(registry, ids))
}
