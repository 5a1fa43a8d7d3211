//! An in-memory editable field with its own undo history and event
//! delivery, standing in for a widget of a real UI toolkit.

use crate::boundary::floor_char_boundary;
use crate::host::{EventRegistry, EventTarget, FieldEvent, Key, KeyStroke, Modifiers, TextField};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    value: String,
    selection: Range<usize>,
}

#[derive(Debug)]
pub struct BufferField {
    value: String,
    selection: Range<usize>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    registry: Option<EventRegistry>,
}

impl Default for BufferField {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferField {
    pub fn new() -> Self {
        Self::with_value("")
    }

    /// A field holding `value` with the caret at the end.
    pub fn with_value(value: &str) -> Self {
        Self {
            value: value.to_string(),
            selection: value.len()..value.len(),
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            registry: Some(EventRegistry::new()),
        }
    }

    /// A field that cannot take listeners.
    pub fn without_events(value: &str) -> Self {
        Self {
            registry: None,
            ..Self::with_value(value)
        }
    }

    pub fn set_selection(&mut self, range: Range<usize>) {
        let start = floor_char_boundary(&self.value, range.start);
        let end = floor_char_boundary(&self.value, range.end).max(start);
        self.selection = start..end;
    }

    pub fn set_caret(&mut self, caret: usize) {
        self.set_selection(caret..caret);
    }

    pub fn listener_count(&self) -> usize {
        self.registry.as_ref().map_or(0, EventRegistry::len)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Empty the field without events or history.
    pub fn clear(&mut self) {
        self.value.clear();
        self.selection = 0..0;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    pub fn dispatch(&mut self, event: FieldEvent) {
        if let Some(registry) = self.registry.clone() {
            registry.dispatch(&event, self);
        }
    }

    /// Type `text` one character at a time: key down, insertion, key up.
    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            let stroke = match ch {
                '\n' => KeyStroke::new(Key::Enter),
                '\t' => KeyStroke::new(Key::Tab),
                ch => KeyStroke::char(ch),
            };

            self.dispatch(FieldEvent::KeyDown(stroke.clone()));
            let mut buf = [0u8; 4];
            self.insert_text(self.selection.clone(), ch.encode_utf8(&mut buf));
            self.dispatch(FieldEvent::KeyUp(stroke));
        }
    }

    /// Insert `text` at the selection as a single input event.
    pub fn input_text(&mut self, text: &str) {
        self.insert_text(self.selection.clone(), text);
    }

    /// Paste `text` with the keyboard shortcut.
    pub fn paste(&mut self, text: &str) {
        let stroke = KeyStroke::char('v').with_modifiers(command());
        self.dispatch(FieldEvent::KeyDown(stroke.clone()));
        self.dispatch(FieldEvent::Paste);
        self.insert_text(self.selection.clone(), text);
        self.dispatch(FieldEvent::KeyUp(stroke));
    }

    /// Delete the selection, or the character before the caret.
    pub fn backspace(&mut self) {
        let stroke = KeyStroke::new(Key::Backspace);
        self.dispatch(FieldEvent::KeyDown(stroke.clone()));

        let range = if self.selection.is_empty() {
            let end = self.selection.end;
            let start = self.value[..end]
                .char_indices()
                .last()
                .map_or(end, |(idx, _)| idx);
            start..end
        } else {
            self.selection.clone()
        };
        if !range.is_empty() {
            self.insert_text(range, "");
        }

        self.dispatch(FieldEvent::KeyUp(stroke));
    }

    /// Undo the last edit with the keyboard shortcut. Returns false when
    /// there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let stroke = KeyStroke::char('z').with_modifiers(command());
        self.history_step(stroke, true)
    }

    pub fn redo(&mut self) -> bool {
        let stroke = KeyStroke::char('z').with_modifiers(Modifiers {
            shift: true,
            ..command()
        });
        self.history_step(stroke, false)
    }

    fn history_step(&mut self, stroke: KeyStroke, undo: bool) -> bool {
        self.dispatch(FieldEvent::KeyDown(stroke.clone()));

        let (from, to) = if undo {
            (&mut self.undo_stack, &mut self.redo_stack)
        } else {
            (&mut self.redo_stack, &mut self.undo_stack)
        };
        let applied = match from.pop() {
            Some(snapshot) => {
                to.push(Snapshot {
                    value: std::mem::replace(&mut self.value, snapshot.value),
                    selection: std::mem::replace(&mut self.selection, snapshot.selection),
                });
                true
            }
            None => false,
        };

        if applied {
            self.dispatch(FieldEvent::Input);
        }
        self.dispatch(FieldEvent::KeyUp(stroke));
        applied
    }
}

fn command() -> Modifiers {
    if cfg!(target_os = "macos") {
        Modifiers {
            meta: true,
            ..Default::default()
        }
    } else {
        Modifiers {
            ctrl: true,
            ..Default::default()
        }
    }
}

impl TextField for BufferField {
    fn value(&self) -> &str {
        &self.value
    }

    fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    fn insert_text(&mut self, range: Range<usize>, text: &str) {
        let start = floor_char_boundary(&self.value, range.start);
        let end = floor_char_boundary(&self.value, range.end).max(start);

        self.undo_stack.push(Snapshot {
            value: self.value.clone(),
            selection: self.selection.clone(),
        });
        self.redo_stack.clear();

        self.value.replace_range(start..end, text);
        let caret = start + text.len();
        self.selection = caret..caret;

        self.dispatch(FieldEvent::Input);
    }
}

impl EventTarget for BufferField {
    fn event_registry(&self) -> Option<EventRegistry> {
        self.registry.clone()
    }
}
