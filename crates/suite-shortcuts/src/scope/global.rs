use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};

use log::{
    debug,
    info,
};

use super::{
    AppActions,
    Navigator,
    ScopeContext,
};
use crate::events::ListenerPriority;
use crate::matcher::ShortcutMatcher;
use crate::models::{
    RegisteredShortcut,
    ShortcutCategory,
    handler,
};
use crate::registry::ShortcutRegistry;
use crate::routes::{
    Location,
    module_route,
    route_matches,
};

/// Route prefix to the page that creates a new item there.
pub const CREATE_ROUTES: [(&str, &str); 5] = [
    ("/documents", "/documents/new"),
    ("/projects", "/projects/new"),
    ("/pages", "/pages/new"),
    ("/calendar", "/calendar/new"),
    ("/data", "/data/new"),
];

/// Destinations of `mod+1` .. `mod+9`, in order.
pub const MODULE_JUMPS: [&str; 9] = [
    "home",
    "pages",
    "projects",
    "documents",
    "calendar",
    "databases",
    "inbox",
    "copilot",
    "tax",
];

pub const SETTINGS_ROUTE: &str = "/settings";

pub fn creation_target(path: &str) -> Option<&'static str> {
    CREATE_ROUTES
        .iter()
        .find(|(prefix, _)| route_matches(prefix, path))
        .map(|(_, target)| *target)
}

/// Builds the fourteen app-wide shortcuts: five named actions followed by
/// the nine module jumps.
pub fn global_shortcuts(
    actions: Arc<dyn AppActions>, navigator: Arc<dyn Navigator>, location: Location,
) -> Vec<RegisteredShortcut> {
    let mut shortcuts = Vec::with_capacity(5 + MODULE_JUMPS.len());

    let search_actions = actions.clone();
    shortcuts.push(
        RegisteredShortcut::new(
            "global:search",
            "mod+k",
            "Search",
            ShortcutCategory::Actions,
            handler(move || search_actions.open_search()),
        )
        .with_description("Open the search and command palette"),
    );

    let help_actions = actions.clone();
    shortcuts.push(
        RegisteredShortcut::new(
            "global:shortcut-help",
            "mod+/",
            "Keyboard shortcuts",
            ShortcutCategory::View,
            handler(move || help_actions.open_shortcut_help()),
        )
        .with_description("Show every available keyboard shortcut"),
    );

    let sidebar_actions = actions.clone();
    shortcuts.push(
        RegisteredShortcut::new(
            "global:toggle-sidebar",
            "mod+b",
            "Toggle sidebar",
            ShortcutCategory::View,
            handler(move || sidebar_actions.toggle_sidebar()),
        )
        .with_description("Show or hide the navigation panel"),
    );

    let settings_navigator = navigator.clone();
    shortcuts.push(
        RegisteredShortcut::new(
            "global:settings",
            "mod+,",
            "Settings",
            ShortcutCategory::Navigation,
            handler(move || settings_navigator.navigate(SETTINGS_ROUTE)),
        )
        .with_description("Go to settings"),
    );

    let create_navigator = navigator.clone();
    shortcuts.push(
        RegisteredShortcut::new(
            "global:new-item",
            "mod+n",
            "New item",
            ShortcutCategory::Creation,
            handler(move || match creation_target(&location.current()) {
                Some(target) => create_navigator.navigate(target),
                None => actions.open_quick_create(),
            }),
        )
        .with_description("Create a new item in the current module"),
    );

    for (index, module_id) in MODULE_JUMPS.iter().enumerate() {
        let position = index + 1;
        let Some(route) = module_route(module_id) else {
            continue;
        };
        let jump_navigator = navigator.clone();
        shortcuts.push(
            RegisteredShortcut::new(
                format!("global:module-{position}"),
                format!("mod+{position}"),
                format!("Go to {module_id}"),
                ShortcutCategory::Navigation,
                handler(move || jump_navigator.navigate(route)),
            )
            .with_description(format!("Jump to module {position}")),
        );
    }

    shortcuts
}

/// The always-on global shortcut set. Installed once for the session; the
/// registry entries and the listener share one teardown.
pub struct GlobalShortcuts {
    ids: Vec<String>,
    registry: ShortcutRegistry,
    matcher: ShortcutMatcher,
    torn_down: AtomicBool,
}

impl GlobalShortcuts {
    pub fn install(
        context: &ScopeContext, actions: Arc<dyn AppActions>, navigator: Arc<dyn Navigator>,
    ) -> Self {
        let shortcuts = global_shortcuts(actions, navigator, context.location.clone());
        let declarations = shortcuts
            .iter()
            .map(RegisteredShortcut::declaration)
            .collect();
        let ids = shortcuts.iter().map(|shortcut| shortcut.id.clone()).collect();

        for shortcut in shortcuts {
            context.registry.register(shortcut);
        }

        let matcher = ShortcutMatcher::install(
            &context.bus,
            ListenerPriority::Global,
            context.platform,
            &context.config,
            declarations,
        );

        let global = Self {
            ids,
            registry: context.registry.clone(),
            matcher,
            torn_down: AtomicBool::new(false),
        };
        info!("Installed {} global shortcuts", global.ids.len());
        global
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn teardown(&self) {
        if self.torn_down.swap(true, Ordering::AcqRel) {
            return;
        }
        for id in &self.ids {
            self.registry.unregister(id);
        }
        self.matcher.teardown();
        debug!("Global shortcuts torn down");
    }
}

impl Drop for GlobalShortcuts {
    fn drop(&mut self) {
        self.teardown();
    }
}
