pub mod global;
pub mod module;

use crate::config::ShortcutConfig;
use crate::events::KeyEventBus;
use crate::platform::Platform;
use crate::registry::ShortcutRegistry;
use crate::routes::Location;

/// The application UI state container, as seen by global shortcuts.
#[cfg_attr(test, mockall::automock)]
pub trait AppActions: Send + Sync {
    fn open_search(&self);
    fn open_shortcut_help(&self);
    fn toggle_sidebar(&self);
    fn open_quick_create(&self);
}

#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Services shared by every scope controller.
#[derive(Clone)]
pub struct ScopeContext {
    pub registry: ShortcutRegistry,
    pub bus: KeyEventBus,
    pub location: Location,
    pub platform: Platform,
    pub config: ShortcutConfig,
}

impl ScopeContext {
    pub fn new(config: ShortcutConfig) -> Self {
        Self {
            registry: ShortcutRegistry::with_config(&config),
            bus: KeyEventBus::new(),
            location: Location::default(),
            platform: config.resolve_platform(),
            config,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}
