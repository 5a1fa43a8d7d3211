//! The interface a host text field offers to a matcher: its text, its
//! selection, an undoable way to insert text, and somewhere to register
//! event listeners.

use std::cell::RefCell;
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    KeyDown,
    KeyUp,
    Paste,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    Delete,
    Enter,
    Tab,
    Other(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyStroke {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::default(),
        }
    }

    pub fn char(ch: char) -> Self {
        Self::new(Key::Char(ch))
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Cmd/Ctrl+Z, Cmd/Ctrl+Shift+Z or Ctrl+Y.
    pub fn is_undo_redo(&self) -> bool {
        let command = self.modifiers.ctrl || self.modifiers.meta;
        match self.key {
            Key::Char(ch) if command => {
                let ch = ch.to_ascii_lowercase();
                ch == 'z' || (ch == 'y' && self.modifiers.ctrl)
            }
            _ => false,
        }
    }

    pub fn is_backspace(&self) -> bool {
        matches!(self.key, Key::Backspace)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEvent {
    KeyDown(KeyStroke),
    KeyUp(KeyStroke),
    Paste,
    Input,
}

impl FieldEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            FieldEvent::KeyDown(_) => EventKind::KeyDown,
            FieldEvent::KeyUp(_) => EventKind::KeyUp,
            FieldEvent::Paste => EventKind::Paste,
            FieldEvent::Input => EventKind::Input,
        }
    }
}

/// Text state of an editable field. Offsets are byte offsets into `value`.
pub trait TextField {
    fn value(&self) -> &str;

    fn selection(&self) -> Range<usize>;

    /// Replace `range` with `text` the way a user edit would: recorded in the
    /// field's undo history, caret left after the inserted text, and an
    /// `input` event delivered to listeners.
    fn insert_text(&mut self, range: Range<usize>, text: &str);
}

pub type Listener = Rc<dyn Fn(&FieldEvent, &mut dyn TextField)>;

pub fn listener<F>(handler: F) -> Listener
where
    F: Fn(&FieldEvent, &mut dyn TextField) + 'static,
{
    Rc::new(handler)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    listeners: Vec<(ListenerId, EventKind, Listener)>,
}

/// Listeners registered on one field. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct EventRegistry {
    inner: Rc<RefCell<RegistryInner>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, kind: EventKind, listener: Listener) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        inner.listeners.push((id, kind, listener));
        id
    }

    /// Returns false if `id` was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(existing, _, _)| *existing != id);
        inner.listeners.len() != before
    }

    pub fn listeners(&self, kind: EventKind) -> Vec<Listener> {
        self.inner
            .borrow()
            .listeners
            .iter()
            .filter(|(_, registered, _)| *registered == kind)
            .map(|(_, _, listener)| Rc::clone(listener))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to the listeners registered for its kind, in
    /// registration order. Listeners may add or remove listeners, and may
    /// trigger nested dispatches through `field`.
    pub fn dispatch(&self, event: &FieldEvent, field: &mut dyn TextField) {
        for handler in self.listeners(event.kind()) {
            handler(event, &mut *field);
        }
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Something listeners can be attached to. Returns `None` when the host has
/// no event support.
pub trait EventTarget {
    fn event_registry(&self) -> Option<EventRegistry>;
}

impl EventTarget for EventRegistry {
    fn event_registry(&self) -> Option<EventRegistry> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Plain(String);

    impl TextField for Plain {
        fn value(&self) -> &str {
            &self.0
        }

        fn selection(&self) -> Range<usize> {
            self.0.len()..self.0.len()
        }

        fn insert_text(&mut self, range: Range<usize>, text: &str) {
            self.0.replace_range(range, text);
        }
    }

    #[test]
    fn undo_redo_classification() {
        let ctrl = Modifiers {
            ctrl: true,
            ..Default::default()
        };
        let meta_shift = Modifiers {
            meta: true,
            shift: true,
            ..Default::default()
        };
        let meta = Modifiers {
            meta: true,
            ..Default::default()
        };

        assert!(KeyStroke::char('z').with_modifiers(ctrl).is_undo_redo());
        assert!(KeyStroke::char('Z').with_modifiers(meta_shift).is_undo_redo());
        assert!(KeyStroke::char('y').with_modifiers(ctrl).is_undo_redo());
        assert!(!KeyStroke::char('y').with_modifiers(meta).is_undo_redo());
        assert!(!KeyStroke::char('z').is_undo_redo());
        assert!(KeyStroke::new(Key::Backspace).is_backspace());
        assert!(!KeyStroke::new(Key::Delete).is_backspace());
    }

    #[test]
    fn dispatch_reaches_only_matching_kind() {
        let registry = EventRegistry::new();
        let inputs = Rc::new(Cell::new(0));
        let pastes = Rc::new(Cell::new(0));

        let counter = Rc::clone(&inputs);
        registry.add_listener(EventKind::Input, listener(move |_, _| counter.set(counter.get() + 1)));
        let counter = Rc::clone(&pastes);
        let paste_id =
            registry.add_listener(EventKind::Paste, listener(move |_, _| counter.set(counter.get() + 1)));

        let mut field = Plain(String::new());
        registry.dispatch(&FieldEvent::Input, &mut field);
        registry.dispatch(&FieldEvent::Input, &mut field);
        registry.dispatch(&FieldEvent::Paste, &mut field);
        assert_eq!((inputs.get(), pastes.get()), (2, 1));

        assert!(registry.remove_listener(paste_id));
        assert!(!registry.remove_listener(paste_id));
        registry.dispatch(&FieldEvent::Paste, &mut field);
        assert_eq!(pastes.get(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn listener_can_edit_field() {
        let registry = EventRegistry::new();
        registry.add_listener(
            EventKind::Input,
            listener(|_, field| {
                let end = field.value().len();
                field.insert_text(end..end, "!");
            }),
        );
        let mut field = Plain("hi".to_string());
        registry.dispatch(&FieldEvent::Input, &mut field);
        assert_eq!(field.value(), "hi!");
    }
}
