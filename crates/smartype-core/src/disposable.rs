//! Handles that undo an attachment when released.

use crate::host::{EventRegistry, ListenerId};

/// Something that can be released exactly once; later calls do nothing.
pub trait Disposable {
    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// Listeners added to one field's registry.
#[derive(Debug)]
pub struct Subscription {
    registry: EventRegistry,
    listeners: Vec<ListenerId>,
    disposed: bool,
}

impl Subscription {
    pub fn new(registry: EventRegistry, listeners: Vec<ListenerId>) -> Self {
        Self {
            registry,
            listeners,
            disposed: false,
        }
    }

    pub fn listener_count(&self) -> usize {
        if self.disposed {
            0
        } else {
            self.listeners.len()
        }
    }
}

impl Disposable for Subscription {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for id in self.listeners.drain(..) {
            self.registry.remove_listener(id);
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Releases everything it holds together.
#[derive(Default)]
pub struct CompositeDisposable {
    items: Vec<Box<dyn Disposable>>,
    disposed: bool,
}

impl CompositeDisposable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adding to a released composite releases the item immediately.
    pub fn add(&mut self, mut item: Box<dyn Disposable>) {
        if self.disposed {
            item.dispose();
        } else {
            self.items.push(item);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Disposable for CompositeDisposable {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        for mut item in self.items.drain(..) {
            item.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// Holds at most one item; setting a new one releases the previous one.
#[derive(Default)]
pub struct SerialDisposable {
    current: Option<Box<dyn Disposable>>,
    disposed: bool,
}

impl SerialDisposable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, mut item: Box<dyn Disposable>) {
        if self.disposed {
            item.dispose();
            return;
        }
        if let Some(mut previous) = self.current.replace(item) {
            previous.dispose();
        }
    }

    /// Release the current item but keep accepting new ones.
    pub fn clear(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.dispose();
        }
    }

    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }
}

impl Disposable for SerialDisposable {
    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        if let Some(mut current) = self.current.take() {
            current.dispose();
        }
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}
