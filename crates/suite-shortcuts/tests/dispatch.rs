use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
};
use std::time::Duration;

use suite_shortcuts::{
    AppActions,
    EventTarget,
    GlobalShortcuts,
    KeyEvent,
    KeyEventBus,
    ListenerPriority,
    Location,
    ModuleShortcut,
    ModuleShortcuts,
    Navigator,
    Platform,
    ScopeContext,
    ShortcutCategory,
    ShortcutConfig,
    ShortcutDeclaration,
    ShortcutMatcher,
};

#[derive(Default)]
struct RecordingApp {
    calls: Mutex<Vec<String>>,
}

impl RecordingApp {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

impl AppActions for RecordingApp {
    fn open_search(&self) {
        self.record("search");
    }

    fn open_shortcut_help(&self) {
        self.record("help");
    }

    fn toggle_sidebar(&self) {
        self.record("sidebar");
    }

    fn open_quick_create(&self) {
        self.record("quick-create");
    }
}

/// Router stand-in that moves the shared location like a real router would.
struct LocationRouter {
    location: Location,
    app: Arc<RecordingApp>,
}

impl Navigator for LocationRouter {
    fn navigate(&self, path: &str) {
        self.app.record(format!("navigate {path}"));
        self.location.set(path);
    }
}

fn context(path: &str, platform: Platform) -> ScopeContext {
    ScopeContext::new(ShortcutConfig::default())
        .with_platform(platform)
        .with_location(Location::new(path))
}

fn install_global(context: &ScopeContext) -> (Arc<RecordingApp>, GlobalShortcuts) {
    let app = Arc::new(RecordingApp::default());
    let router = Arc::new(LocationRouter {
        location: context.location.clone(),
        app: app.clone(),
    });
    let global = GlobalShortcuts::install(context, app.clone(), router);
    (app, global)
}

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();
    (count, move || {
        count_clone.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn test_bare_keys_dispatch_to_their_own_handler() {
    let bus = KeyEventBus::new();
    let (h1_calls, h1) = counter();
    let (h2_calls, h2) = counter();
    let matcher = ShortcutMatcher::install(
        &bus,
        ListenerPriority::Local,
        Platform::Other,
        &ShortcutConfig::default(),
        vec![
            ShortcutDeclaration::new("?", h1),
            ShortcutDeclaration::new("[", h2),
        ],
    );

    bus.dispatch(&mut KeyEvent::new("?").with_shift());
    assert_eq!(h1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h2_calls.load(Ordering::SeqCst), 0);

    bus.dispatch(&mut KeyEvent::new("["));
    assert_eq!(h1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h2_calls.load(Ordering::SeqCst), 1);

    drop(matcher);
    bus.dispatch(&mut KeyEvent::new("?").with_shift());
    assert_eq!(h1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h2_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_global_teardown_leaves_registry_empty() {
    let context = context("/", Platform::Other);
    let (_app, global) = install_global(&context);

    let mut ids: Vec<String> = context
        .registry
        .get_all()
        .into_iter()
        .map(|entry| entry.id)
        .collect();
    ids.sort();
    let mut expected: Vec<String> = (1..=9).map(|n| format!("global:module-{n}")).collect();
    expected.extend(
        [
            "global:new-item",
            "global:search",
            "global:settings",
            "global:shortcut-help",
            "global:toggle-sidebar",
        ]
        .map(String::from),
    );
    expected.sort();
    assert_eq!(ids, expected);

    drop(global);
    assert!(context.registry.is_empty());
    assert_eq!(context.bus.listener_count(), 0);
}

#[test]
fn test_mod_shortcuts_follow_platform() {
    let apple = context("/", Platform::Apple);
    let (apple_app, _apple_global) = install_global(&apple);
    apple.bus.dispatch(&mut KeyEvent::new("k").with_ctrl());
    apple.bus.dispatch(&mut KeyEvent::new("k"));
    apple.bus.dispatch(&mut KeyEvent::new("k").with_meta());
    assert_eq!(apple_app.calls(), vec!["search"]);

    let other = context("/", Platform::Other);
    let (other_app, _other_global) = install_global(&other);
    other.bus.dispatch(&mut KeyEvent::new("k").with_meta());
    other.bus.dispatch(&mut KeyEvent::new("k"));
    other.bus.dispatch(&mut KeyEvent::new("k").with_ctrl());
    assert_eq!(other_app.calls(), vec!["search"]);
}

#[test]
fn test_module_jump_activates_module_scope() {
    let context = context("/", Platform::Other);
    let (app, _global) = install_global(&context);
    let (created, create) = counter();
    let projects = ModuleShortcuts::mount(
        &context,
        "projects",
        vec![ModuleShortcut::new("new", "c", "New project", ShortcutCategory::Creation, create)],
    );
    assert!(!projects.is_active());

    context.bus.dispatch(&mut KeyEvent::new("c"));
    assert_eq!(created.load(Ordering::SeqCst), 0);

    context.bus.dispatch(&mut KeyEvent::new("3").with_ctrl());
    assert_eq!(app.calls(), vec!["navigate /projects"]);
    assert!(projects.is_active());
    assert_eq!(context.registry.get_by_module("projects").len(), 1);
    assert_eq!(context.registry.len(), 15);

    context.bus.dispatch(&mut KeyEvent::new("c"));
    assert_eq!(created.load(Ordering::SeqCst), 1);

    context.bus.dispatch(&mut KeyEvent::new("n").with_ctrl());
    assert_eq!(app.calls().last().map(String::as_str), Some("navigate /projects/new"));
}

#[test]
fn test_module_scope_wins_over_global_on_overlap() {
    let context = context("/documents", Platform::Other);
    let (app, _global) = install_global(&context);
    let (module_search, search) = counter();
    let _documents = ModuleShortcuts::mount(
        &context,
        "documents",
        vec![ModuleShortcut::new(
            "search",
            "mod+k",
            "Search documents",
            ShortcutCategory::Actions,
            search,
        )],
    );

    context.bus.dispatch(&mut KeyEvent::new("k").with_ctrl());
    assert_eq!(module_search.load(Ordering::SeqCst), 1);
    assert!(app.calls().is_empty());

    context.location.set("/inbox");
    context.bus.dispatch(&mut KeyEvent::new("k").with_ctrl());
    assert_eq!(module_search.load(Ordering::SeqCst), 1);
    assert_eq!(app.calls(), vec!["search"]);
}

#[test]
fn test_suppression_in_text_entry() {
    let context = context("/projects", Platform::Other);
    let (created, create) = counter();
    let _projects = ModuleShortcuts::mount(
        &context,
        "projects",
        vec![ModuleShortcut::new("new", "c", "New project", ShortcutCategory::Creation, create)],
    );

    for target in [
        EventTarget::TextInput,
        EventTarget::TextArea,
        EventTarget::ContentEditable,
    ] {
        let mut event = KeyEvent::new("c").in_target(target);
        assert!(!context.bus.dispatch(&mut event));
        assert!(!event.is_default_prevented());
    }
    assert_eq!(created.load(Ordering::SeqCst), 0);

    context.bus.dispatch(&mut KeyEvent::new("c"));
    assert_eq!(created.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_chord_sequences_end_to_end() {
    let context = context("/documents", Platform::Other);
    let (drafts, go_drafts) = counter();
    let _documents = ModuleShortcuts::mount(
        &context,
        "documents",
        vec![
            ModuleShortcut::new(
                "go-drafts",
                "g d",
                "Go to drafts",
                ShortcutCategory::Navigation,
                go_drafts,
            )
            .with_chord("g+d"),
        ],
    );

    context.bus.dispatch(&mut KeyEvent::new("g"));
    context.bus.dispatch(&mut KeyEvent::new("d"));
    assert_eq!(drafts.load(Ordering::SeqCst), 1);

    context.bus.dispatch(&mut KeyEvent::new("g"));
    tokio::time::sleep(Duration::from_millis(1000)).await;
    context.bus.dispatch(&mut KeyEvent::new("d"));
    assert_eq!(drafts.load(Ordering::SeqCst), 1);

    context.bus.dispatch(&mut KeyEvent::new("g"));
    context.bus.dispatch(&mut KeyEvent::new("x"));
    context.bus.dispatch(&mut KeyEvent::new("d"));
    assert_eq!(drafts.load(Ordering::SeqCst), 1);

    context.bus.dispatch(&mut KeyEvent::new("G"));
    tokio::time::advance(Duration::from_millis(500)).await;
    context.bus.dispatch(&mut KeyEvent::new("D"));
    assert_eq!(drafts.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_key_handled_by_other_matcher_cancels_chord() {
    let bus = KeyEventBus::new();
    let (chords, go_home) = counter();
    let (bare, archive) = counter();
    let global = ShortcutMatcher::install(
        &bus,
        ListenerPriority::Global,
        Platform::Other,
        &ShortcutConfig::default(),
        vec![ShortcutDeclaration::chord("g+h", go_home)],
    );
    let _module = ShortcutMatcher::install(
        &bus,
        ListenerPriority::Module,
        Platform::Other,
        &ShortcutConfig::default(),
        vec![ShortcutDeclaration::new("x", archive)],
    );

    bus.dispatch(&mut KeyEvent::new("g"));
    bus.dispatch(&mut KeyEvent::new("x"));
    bus.dispatch(&mut KeyEvent::new("h"));
    assert_eq!(bare.load(Ordering::SeqCst), 1);
    assert_eq!(chords.load(Ordering::SeqCst), 0);

    bus.dispatch(&mut KeyEvent::new("g"));
    bus.dispatch(&mut KeyEvent::new("h"));
    assert_eq!(chords.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_module_handler_clears_pending_global_chord() {
    let context = context("/projects", Platform::Other);
    let (chords, go_home) = counter();
    let (archived, archive) = counter();
    let global = ShortcutMatcher::install(
        &context.bus,
        ListenerPriority::Global,
        context.platform,
        &context.config,
        vec![ShortcutDeclaration::chord("g+h", go_home)],
    );
    let _projects = ModuleShortcuts::mount(
        &context,
        "projects",
        vec![ModuleShortcut::new("archive", "x", "Archive", ShortcutCategory::Actions, archive)],
    );

    context.bus.dispatch(&mut KeyEvent::new("g"));
    assert_eq!(global.pending_chord_key().as_deref(), Some("g"));

    let mut event = KeyEvent::new("x");
    assert!(context.bus.dispatch(&mut event));
    assert_eq!(archived.load(Ordering::SeqCst), 1);
    assert_eq!(global.pending_chord_key(), None);

    tokio::time::advance(Duration::from_millis(100)).await;
    context.bus.dispatch(&mut KeyEvent::new("h"));
    assert_eq!(chords.load(Ordering::SeqCst), 0);
}

#[test]
fn test_help_panel_can_run_registered_handlers() {
    let context = context("/", Platform::Other);
    let (app, _global) = install_global(&context);

    let grouped = context.registry.get_by_category();
    assert_eq!(grouped[&ShortcutCategory::Navigation].len(), 10);
    assert_eq!(grouped[&ShortcutCategory::View].len(), 2);
    assert_eq!(grouped[&ShortcutCategory::Actions].len(), 1);
    assert_eq!(grouped[&ShortcutCategory::Creation].len(), 1);

    context.registry.run("global:shortcut-help").unwrap();
    assert_eq!(app.calls(), vec!["help"]);
}
