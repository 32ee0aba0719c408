use std::fmt;
use std::sync::Arc;

use serde::{
    Deserialize,
    Serialize,
};

/// Callback run when a shortcut fires.
pub type ShortcutHandler = Arc<dyn Fn() + Send + Sync>;

pub fn handler<F>(f: F) -> ShortcutHandler
where
    F: Fn() + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The minimal unit consumed by a matcher: a pattern and what to run.
#[derive(Clone)]
pub struct ShortcutDeclaration {
    pub key_pattern: String,
    pub chord_pattern: Option<String>,
    pub handler: ShortcutHandler,
    pub suppress_in_inputs: bool,
}

impl ShortcutDeclaration {
    pub fn new<F>(key_pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_handler(key_pattern, Arc::new(f))
    }

    pub fn with_handler(key_pattern: impl Into<String>, handler: ShortcutHandler) -> Self {
        Self {
            key_pattern: key_pattern.into(),
            chord_pattern: None,
            handler,
            suppress_in_inputs: true,
        }
    }

    /// A two-key sequence such as `g+h`.
    pub fn chord<F>(chord_pattern: impl Into<String>, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let chord_pattern = chord_pattern.into();
        Self {
            key_pattern: chord_pattern.clone(),
            chord_pattern: Some(chord_pattern),
            handler: Arc::new(f),
            suppress_in_inputs: true,
        }
    }

    pub fn with_chord(mut self, chord_pattern: impl Into<String>) -> Self {
        self.chord_pattern = Some(chord_pattern.into());
        self
    }

    pub fn allow_in_inputs(mut self) -> Self {
        self.suppress_in_inputs = false;
        self
    }
}

impl fmt::Debug for ShortcutDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShortcutDeclaration")
            .field("key_pattern", &self.key_pattern)
            .field("chord_pattern", &self.chord_pattern)
            .field("suppress_in_inputs", &self.suppress_in_inputs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ShortcutCategory {
    Navigation,
    Creation,
    Actions,
    View,
}

impl ShortcutCategory {
    pub const ALL: [ShortcutCategory; 4] = [
        ShortcutCategory::Navigation,
        ShortcutCategory::Creation,
        ShortcutCategory::Actions,
        ShortcutCategory::View,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShortcutCategory::Navigation => "Navigation",
            ShortcutCategory::Creation => "Creation",
            ShortcutCategory::Actions => "Actions",
            ShortcutCategory::View => "View",
        }
    }
}

impl fmt::Display for ShortcutCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortcutScope {
    Global,
    Module,
}

impl fmt::Display for ShortcutScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutScope::Global => f.write_str("global"),
            ShortcutScope::Module => f.write_str("module"),
        }
    }
}

/// Registry entry: declaration plus the metadata shown by help and palette
/// surfaces.
#[derive(Clone)]
pub struct RegisteredShortcut {
    pub id: String,
    pub key_pattern: String,
    pub chord_pattern: Option<String>,
    pub label: String,
    pub description: String,
    pub category: ShortcutCategory,
    pub handler: ShortcutHandler,
    pub scope: ShortcutScope,
    pub module_id: Option<String>,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

impl RegisteredShortcut {
    pub fn new(
        id: impl Into<String>, key_pattern: impl Into<String>, label: impl Into<String>,
        category: ShortcutCategory, handler: ShortcutHandler,
    ) -> Self {
        Self {
            id: id.into(),
            key_pattern: key_pattern.into(),
            chord_pattern: None,
            label: label.into(),
            description: String::new(),
            category,
            handler,
            scope: ShortcutScope::Global,
            module_id: None,
            registered_at: chrono::Utc::now(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_chord(mut self, chord_pattern: impl Into<String>) -> Self {
        self.chord_pattern = Some(chord_pattern.into());
        self
    }

    pub fn in_module(mut self, module_id: impl Into<String>) -> Self {
        self.scope = ShortcutScope::Module;
        self.module_id = Some(module_id.into());
        self
    }

    pub fn declaration(&self) -> ShortcutDeclaration {
        ShortcutDeclaration {
            key_pattern: self.key_pattern.clone(),
            chord_pattern: self.chord_pattern.clone(),
            handler: self.handler.clone(),
            suppress_in_inputs: true,
        }
    }

    pub fn descriptor(&self) -> ShortcutDescriptor {
        ShortcutDescriptor {
            id: self.id.clone(),
            key_pattern: self.key_pattern.clone(),
            chord_pattern: self.chord_pattern.clone(),
            label: self.label.clone(),
            description: self.description.clone(),
            category: self.category,
            scope: self.scope,
            module_id: self.module_id.clone(),
            registered_at: self.registered_at,
        }
    }
}

impl fmt::Debug for RegisteredShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredShortcut")
            .field("id", &self.id)
            .field("key_pattern", &self.key_pattern)
            .field("chord_pattern", &self.chord_pattern)
            .field("label", &self.label)
            .field("category", &self.category)
            .field("scope", &self.scope)
            .field("module_id", &self.module_id)
            .finish_non_exhaustive()
    }
}

/// Handler-free snapshot of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutDescriptor {
    pub id: String,
    pub key_pattern: String,
    pub chord_pattern: Option<String>,
    pub label: String,
    pub description: String,
    pub category: ShortcutCategory,
    pub scope: ShortcutScope,
    pub module_id: Option<String>,
    pub registered_at: chrono::DateTime<chrono::Utc>,
}

/// Where keyboard focus was when a key went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventTarget {
    TextInput,
    TextArea,
    ContentEditable,
    #[default]
    Other,
}

impl EventTarget {
    pub fn is_text_entry(&self) -> bool {
        matches!(
            self,
            EventTarget::TextInput | EventTarget::TextArea | EventTarget::ContentEditable
        )
    }
}

/// A key-press notification as delivered by the host UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: String,
    pub meta: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub target: EventTarget,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn in_target(mut self, target: EventTarget) -> Self {
        self.target = target;
        self
    }

    /// Meta, control or alt held. Shift is left out since it only changes
    /// which character a key produces.
    pub fn has_command_modifier(&self) -> bool {
        self.meta || self.ctrl || self.alt
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type ShortcutResult<T> = Result<T, ShortcutError>;

#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error("Invalid shortcut key: {0}")]
    InvalidShortcut(String),

    #[error("Shortcut not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
