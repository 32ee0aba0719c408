use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use log::{
    debug,
    warn,
};

use crate::config::ShortcutConfig;
use crate::models::{
    RegisteredShortcut,
    ShortcutCategory,
    ShortcutDescriptor,
    ShortcutError,
    ShortcutResult,
    ShortcutScope,
};

/// Discovery store for shortcut metadata. Cloning hands out another handle to
/// the same entries, so one instance is shared by every scope, help panel and
/// palette.
#[derive(Clone)]
pub struct ShortcutRegistry {
    entries: Arc<DashMap<String, RegisteredShortcut>>,
    warn_on_overwrite: bool,
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::with_config(&ShortcutConfig::default())
    }

    pub fn with_config(config: &ShortcutConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            warn_on_overwrite: config.warn_on_overwrite,
        }
    }

    /// Inserts or overwrites by id; the last writer wins.
    pub fn register(&self, mut entry: RegisteredShortcut) {
        entry.registered_at = chrono::Utc::now();
        let id = entry.id.clone();
        let handler = entry.handler.clone();

        if let Some(previous) = self.entries.insert(id.clone(), entry) {
            if self.warn_on_overwrite && !Arc::ptr_eq(&previous.handler, &handler) {
                warn!("Shortcut '{id}' was re-registered with a different handler");
            } else {
                debug!("Refreshed shortcut '{id}'");
            }
        } else {
            debug!("Registered shortcut '{id}'");
        }
    }

    pub fn unregister(&self, id: &str) -> Option<RegisteredShortcut> {
        let removed = self.entries.remove(id).map(|(_, entry)| entry);
        if removed.is_some() {
            debug!("Unregistered shortcut '{id}'");
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<RegisteredShortcut> {
        self.entries.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// All entries, sorted by id.
    pub fn get_all(&self) -> Vec<RegisteredShortcut> {
        let mut all: Vec<RegisteredShortcut> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn get_global(&self) -> Vec<RegisteredShortcut> {
        self.get_all()
            .into_iter()
            .filter(|entry| entry.scope == ShortcutScope::Global)
            .collect()
    }

    /// Groups entries by category; empty categories are left out.
    pub fn get_by_category(&self) -> BTreeMap<ShortcutCategory, Vec<RegisteredShortcut>> {
        let mut grouped: BTreeMap<ShortcutCategory, Vec<RegisteredShortcut>> = BTreeMap::new();
        for entry in self.get_all() {
            grouped.entry(entry.category).or_default().push(entry);
        }
        grouped
    }

    /// Module-scoped entries for `module_id`. Global entries are never
    /// returned here, including for the id `"global"`.
    pub fn get_by_module(&self, module_id: &str) -> Vec<RegisteredShortcut> {
        self.get_all()
            .into_iter()
            .filter(|entry| {
                entry.scope == ShortcutScope::Module && entry.module_id.as_deref() == Some(module_id)
            })
            .collect()
    }

    pub fn clear(&self) {
        self.entries.clear();
        debug!("Cleared shortcut registry");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs an entry's handler directly, as a help panel does on click.
    pub fn run(&self, id: &str) -> ShortcutResult<()> {
        let handler = self
            .entries
            .get(id)
            .map(|entry| entry.handler.clone())
            .ok_or_else(|| ShortcutError::NotFound(id.to_string()))?;
        handler();
        Ok(())
    }

    pub fn descriptors(&self) -> Vec<ShortcutDescriptor> {
        self.get_all()
            .iter()
            .map(RegisteredShortcut::descriptor)
            .collect()
    }

    pub fn to_json(&self) -> ShortcutResult<String> {
        Ok(serde_json::to_string_pretty(&self.descriptors())?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    use super::*;
    use crate::models::handler;

    fn entry(id: &str, category: ShortcutCategory) -> RegisteredShortcut {
        RegisteredShortcut::new(id, "x", id, category, handler(|| {}))
    }

    #[test]
    fn test_register_overwrites_by_id() {
        let registry = ShortcutRegistry::new();
        registry.register(entry("docs", ShortcutCategory::Actions).with_description("old"));
        registry.register(
            RegisteredShortcut::new("docs", "mod+d", "Documents", ShortcutCategory::View, handler(|| {}))
                .with_description("new"),
        );

        assert_eq!(registry.len(), 1);
        let stored = registry.get("docs").unwrap();
        assert_eq!(stored.key_pattern, "mod+d");
        assert_eq!(stored.description, "new");
        assert_eq!(stored.category, ShortcutCategory::View);
    }

    #[test]
    fn test_unregister_unknown_is_noop() {
        let registry = ShortcutRegistry::new();
        registry.register(entry("a", ShortcutCategory::Actions));
        assert!(registry.unregister("missing").is_none());
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister("a").is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_get_by_category_omits_empty_groups() {
        let registry = ShortcutRegistry::new();
        registry.register(entry("a", ShortcutCategory::Navigation));
        registry.register(entry("b", ShortcutCategory::Navigation));
        registry.register(entry("c", ShortcutCategory::View));

        let grouped = registry.get_by_category();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&ShortcutCategory::Navigation].len(), 2);
        assert_eq!(grouped[&ShortcutCategory::View].len(), 1);
        assert!(!grouped.contains_key(&ShortcutCategory::Creation));
    }

    #[test]
    fn test_get_by_module_excludes_global_entries() {
        let registry = ShortcutRegistry::new();
        registry.register(entry("global:projects", ShortcutCategory::Navigation));
        registry.register(entry("module:projects:new", ShortcutCategory::Creation).in_module("projects"));
        registry.register(entry("module:documents:new", ShortcutCategory::Creation).in_module("documents"));

        let projects = registry.get_by_module("projects");
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].id, "module:projects:new");

        assert!(registry.get_by_module("global").is_empty());
        assert_eq!(registry.get_global().len(), 1);
    }

    #[test]
    fn test_run_invokes_handler() {
        let registry = ShortcutRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        registry.register(RegisteredShortcut::new(
            "a",
            "a",
            "A",
            ShortcutCategory::Actions,
            handler(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            }),
        ));

        registry.run("a").unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(registry.run("b"), Err(ShortcutError::NotFound(_))));
    }

    #[test]
    fn test_clones_share_entries() {
        let registry = ShortcutRegistry::new();
        let other = registry.clone();
        registry.register(entry("a", ShortcutCategory::Actions));
        assert!(other.contains("a"));

        other.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_to_json_lists_descriptors() {
        let registry = ShortcutRegistry::new();
        registry.register(entry("b", ShortcutCategory::View));
        registry.register(entry("a", ShortcutCategory::Actions).with_chord("g+a"));

        let json: serde_json::Value = serde_json::from_str(&registry.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["id"], "a");
        assert_eq!(json[0]["chord_pattern"], "g+a");
        assert_eq!(json[1]["id"], "b");
    }
}
