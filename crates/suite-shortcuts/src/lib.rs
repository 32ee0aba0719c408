pub mod config;
pub mod events;
pub mod logging;
pub mod matcher;
pub mod models;
pub mod parser;
pub mod platform;
pub mod registry;
pub mod routes;
pub mod scope;
mod sync;

pub use config::ShortcutConfig;
pub use events::{
    KeyEventBus,
    KeyListener,
    ListenerGuard,
    ListenerPriority,
};
pub use matcher::ShortcutMatcher;
pub use models::{
    EventTarget,
    KeyEvent,
    RegisteredShortcut,
    ShortcutCategory,
    ShortcutDeclaration,
    ShortcutDescriptor,
    ShortcutError,
    ShortcutHandler,
    ShortcutResult,
    ShortcutScope,
};
pub use parser::{
    KeyPattern,
    ShortcutParser,
};
pub use platform::{
    Modifier,
    Platform,
    is_apple_platform,
};
pub use registry::ShortcutRegistry;
pub use routes::Location;
pub use scope::global::GlobalShortcuts;
pub use scope::module::{
    ModuleShortcut,
    ModuleShortcuts,
};
pub use scope::{
    AppActions,
    Navigator,
    ScopeContext,
};

pub fn create_context(config: ShortcutConfig) -> ScopeContext {
    ScopeContext::new(config)
}

/// Context configured from `SUITE_SHORTCUTS_*` environment variables.
pub fn create_context_from_env() -> ShortcutResult<ScopeContext> {
    Ok(ScopeContext::new(ShortcutConfig::from_env()?))
}
