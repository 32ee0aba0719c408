use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
};

use log::{
    debug,
    info,
};

use super::ScopeContext;
use crate::events::ListenerPriority;
use crate::matcher::ShortcutMatcher;
use crate::models::{
    RegisteredShortcut,
    ShortcutCategory,
    ShortcutDeclaration,
    ShortcutHandler,
};
use crate::registry::ShortcutRegistry;
use crate::routes::{
    LocationSubscription,
    is_module_active,
    module_route,
};
use crate::sync::lock_or_recover;

/// A shortcut owned by one module screen.
#[derive(Clone)]
pub struct ModuleShortcut {
    pub id: String,
    pub key_pattern: String,
    pub chord_pattern: Option<String>,
    pub label: String,
    pub description: String,
    pub category: ShortcutCategory,
    pub handler: ShortcutHandler,
    pub suppress_in_inputs: bool,
}

impl ModuleShortcut {
    pub fn new<F>(
        id: impl Into<String>, key_pattern: impl Into<String>, label: impl Into<String>,
        category: ShortcutCategory, f: F,
    ) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            key_pattern: key_pattern.into(),
            chord_pattern: None,
            label: label.into(),
            description: String::new(),
            category,
            handler: Arc::new(f),
            suppress_in_inputs: true,
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

    pub fn allow_in_inputs(mut self) -> Self {
        self.suppress_in_inputs = false;
        self
    }

    fn declaration(&self) -> ShortcutDeclaration {
        ShortcutDeclaration {
            key_pattern: self.key_pattern.clone(),
            chord_pattern: self.chord_pattern.clone(),
            handler: self.handler.clone(),
            suppress_in_inputs: self.suppress_in_inputs,
        }
    }

    fn registry_entry(&self, module_id: &str) -> RegisteredShortcut {
        let mut entry = RegisteredShortcut::new(
            namespaced_id(module_id, &self.id),
            self.key_pattern.clone(),
            self.label.clone(),
            self.category,
            self.handler.clone(),
        )
        .with_description(self.description.clone())
        .in_module(module_id);
        entry.chord_pattern = self.chord_pattern.clone();
        entry
    }
}

impl fmt::Debug for ModuleShortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleShortcut")
            .field("id", &self.id)
            .field("key_pattern", &self.key_pattern)
            .field("chord_pattern", &self.chord_pattern)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

pub fn namespaced_id(module_id: &str, shortcut_id: &str) -> String {
    format!("module:{module_id}:{shortcut_id}")
}

#[derive(Default)]
struct ModuleState {
    active: bool,
    definitions: Vec<ModuleShortcut>,
    registered_ids: Vec<String>,
}

struct ModuleInner {
    module_id: String,
    registry: ShortcutRegistry,
    matcher: ShortcutMatcher,
    state: Mutex<ModuleState>,
    torn_down: AtomicBool,
}

impl ModuleInner {
    fn sync_with(&self, path: &str) {
        if self.torn_down.load(Ordering::Acquire) {
            return;
        }
        if is_module_active(&self.module_id, path) {
            self.activate();
        } else {
            self.deactivate();
        }
    }

    fn activate(&self) {
        let mut state = lock_or_recover(&self.state, "module scope");
        if state.active {
            return;
        }
        state.active = true;
        self.apply(&mut state);
        info!(
            "Activated {} shortcuts for module '{}'",
            state.definitions.len(),
            self.module_id
        );
    }

    /// Mirrors the current definitions into the registry and the matcher.
    fn apply(&self, state: &mut ModuleState) {
        let mut current_ids = HashSet::with_capacity(state.definitions.len());
        for definition in &state.definitions {
            let entry = definition.registry_entry(&self.module_id);
            current_ids.insert(entry.id.clone());
            self.registry.register(entry);
        }
        for stale in state
            .registered_ids
            .iter()
            .filter(|id| !current_ids.contains(*id))
        {
            self.registry.unregister(stale);
        }
        state.registered_ids = state
            .definitions
            .iter()
            .map(|definition| namespaced_id(&self.module_id, &definition.id))
            .collect();

        self.matcher.set_declarations(
            state
                .definitions
                .iter()
                .map(ModuleShortcut::declaration)
                .collect(),
        );
    }

    fn deactivate(&self) {
        let mut state = lock_or_recover(&self.state, "module scope");
        if !state.active {
            return;
        }
        state.active = false;
        for id in state.registered_ids.drain(..) {
            self.registry.unregister(&id);
        }
        self.matcher.set_declarations(Vec::new());
        info!("Deactivated shortcuts for module '{}'", self.module_id);
    }
}

/// Shortcuts of one module, live only while the current route belongs to
/// that module.
pub struct ModuleShortcuts {
    inner: Arc<ModuleInner>,
    subscription: Mutex<Option<LocationSubscription>>,
}

impl ModuleShortcuts {
    pub fn mount(
        context: &ScopeContext, module_id: impl Into<String>, definitions: Vec<ModuleShortcut>,
    ) -> Self {
        let module_id = module_id.into();
        if module_route(&module_id).is_none() {
            debug!("Module '{module_id}' has no route; its shortcuts will stay inactive");
        }

        let matcher = ShortcutMatcher::install(
            &context.bus,
            ListenerPriority::Module,
            context.platform,
            &context.config,
            Vec::new(),
        );
        let inner = Arc::new(ModuleInner {
            module_id,
            registry: context.registry.clone(),
            matcher,
            state: Mutex::new(ModuleState {
                definitions,
                ..Default::default()
            }),
            torn_down: AtomicBool::new(false),
        });

        inner.sync_with(&context.location.current());

        let weak = Arc::downgrade(&inner);
        let subscription = context.location.subscribe(move |path| {
            if let Some(inner) = weak.upgrade() {
                inner.sync_with(path);
            }
        });

        Self {
            inner,
            subscription: Mutex::new(Some(subscription)),
        }
    }

    pub fn module_id(&self) -> &str {
        &self.inner.module_id
    }

    pub fn is_active(&self) -> bool {
        lock_or_recover(&self.inner.state, "module scope").active
    }

    /// Swaps in fresh definitions, e.g. when the screen re-renders with new
    /// handlers. Takes effect immediately while active.
    pub fn update_definitions(&self, definitions: Vec<ModuleShortcut>) {
        if self.inner.torn_down.load(Ordering::Acquire) {
            return;
        }
        let mut state = lock_or_recover(&self.inner.state, "module scope");
        state.definitions = definitions;
        if state.active {
            self.inner.apply(&mut state);
        }
    }

    pub fn teardown(&self) {
        if self.inner.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        lock_or_recover(&self.subscription, "location subscription").take();
        self.inner.deactivate();
        self.inner.matcher.teardown();
        debug!("Module '{}' shortcuts torn down", self.inner.module_id);
    }
}

impl Drop for ModuleShortcuts {
    fn drop(&mut self) {
        self.teardown();
    }
}
