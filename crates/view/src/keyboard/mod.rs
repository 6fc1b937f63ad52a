mod backspace;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use markslate_doc::HostEditor;

pub use backspace::backspace_key;

pub type KeyHandler = Arc<dyn Fn(&mut dyn HostEditor) -> bool + Send + Sync>;

/// A key binding: the key name as the host reports it plus modifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl KeySpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (on, name) in [
            (self.ctrl, "ctrl+"),
            (self.meta, "meta+"),
            (self.alt, "alt+"),
            (self.shift, "shift+"),
        ] {
            if on {
                f.write_str(name)?;
            }
        }
        f.write_str(&self.key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl From<&KeyEvent> for KeySpec {
    fn from(event: &KeyEvent) -> Self {
        Self {
            key: event.key.clone(),
            shift: event.shift,
            ctrl: event.ctrl,
            meta: event.meta,
            alt: event.alt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyboardError {
    #[error("key '{0}' already has a handler")]
    DuplicateKey(KeySpec),
}

#[derive(Default)]
pub struct KeyboardRegistry {
    handlers: HashMap<KeySpec, KeyHandler>,
}

impl KeyboardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry
            .register(
                &[KeySpec::new("Backspace"), KeySpec::new("Delete")],
                backspace_key,
            )
            .expect("builtin key bindings must be valid");
        registry
    }

    /// Binds `handler` to every key in `keys`. Nothing is bound if any of
    /// them is taken.
    pub fn register(
        &mut self,
        keys: &[KeySpec],
        handler: impl Fn(&mut dyn HostEditor) -> bool + Send + Sync + 'static,
    ) -> Result<(), KeyboardError> {
        for (ix, key) in keys.iter().enumerate() {
            if self.handlers.contains_key(key) || keys[..ix].contains(key) {
                return Err(KeyboardError::DuplicateKey(key.clone()));
            }
        }
        let handler: KeyHandler = Arc::new(handler);
        for key in keys {
            self.handlers.insert(key.clone(), handler.clone());
        }
        Ok(())
    }

    pub fn handler(&self, key: &KeySpec) -> Option<&KeyHandler> {
        self.handlers.get(key)
    }

    /// Runs the handler bound to `event`. `false` means the host should
    /// apply its default behavior.
    pub fn dispatch(&self, editor: &mut dyn HostEditor, event: &KeyEvent) -> bool {
        let spec = KeySpec::from(event);
        let Some(handler) = self.handlers.get(&spec) else {
            return false;
        };
        let handled = handler(editor);
        tracing::trace!(key = %spec, handled, "dispatched key");
        handled
    }
}
