//! Key-press matching and dispatch.
//!
//! A [`ShortcutMatcher`] installs one listener on a [`KeyEventBus`] and keeps
//! it for its whole lifetime. Callers swap the declaration list through
//! [`ShortcutMatcher::set_declarations`]; the listener always reads the latest
//! list when a key goes down, so handlers closing over fresh state never need
//! a reinstall.
//!
//! Per key press, declarations are tried in order and the first match wins:
//!
//! 1. declarations that suppress in inputs are skipped while focus is in a
//!    text-entry target;
//! 2. chords `a+b` fire when `a` is pending and `b` arrives;
//! 3. combos fire when every listed modifier is held and the key matches;
//! 4. bare keys fire when the key matches and no meta/ctrl/alt is held.
//!
//! When nothing fires, a key that starts some chord becomes the pending first
//! key for the chord timeout; any other key clears a pending chord. That
//! includes keys handled by another matcher dispatched earlier on the bus.

use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
};
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::ShortcutConfig;
use crate::events::{
    KeyEventBus,
    KeyListener,
    ListenerGuard,
    ListenerPriority,
};
use crate::models::{
    KeyEvent,
    ShortcutDeclaration,
    ShortcutHandler,
};
use crate::parser::{
    KeyPattern,
    ShortcutParser,
};
use crate::platform::Platform;
use crate::sync::lock_or_recover;

struct CompiledDeclaration {
    pattern: Option<KeyPattern>,
    handler: ShortcutHandler,
    suppress_in_inputs: bool,
}

impl CompiledDeclaration {
    fn applies_to(&self, event: &KeyEvent) -> bool {
        !(self.suppress_in_inputs && event.target.is_text_entry())
    }
}

struct PendingChord {
    first_key: String,
    expires_at: Instant,
    timer: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct ChordState {
    pending: Option<PendingChord>,
    generation: u64,
}

impl ChordState {
    fn pending_key(&mut self, now: Instant) -> Option<&str> {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| now >= pending.expires_at)
        {
            self.clear();
        }
        self.pending.as_ref().map(|pending| pending.first_key.as_str())
    }

    fn clear(&mut self) {
        if let Some(pending) = self.pending.take() {
            if let Some(timer) = pending.timer {
                timer.abort();
            }
            self.generation += 1;
            debug!("Cleared pending chord key '{}'", pending.first_key);
        }
    }
}

fn start_chord(state: &Arc<Mutex<ChordState>>, first_key: String, timeout: Duration) {
    let mut chord = lock_or_recover(state, "chord state");
    chord.clear();
    chord.generation += 1;
    let generation = chord.generation;

    let timer = tokio::runtime::Handle::try_current().ok().map(|runtime| {
        let state = state.clone();
        runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            let mut chord = lock_or_recover(&state, "chord state");
            if chord.generation == generation {
                if let Some(pending) = chord.pending.take() {
                    debug!("Chord key '{}' timed out", pending.first_key);
                }
                chord.generation += 1;
            }
        })
    });

    debug!("Pending chord key '{first_key}'");
    chord.pending = Some(PendingChord {
        first_key,
        expires_at: Instant::now() + timeout,
        timer,
    });
}

enum Outcome {
    Fire(ShortcutHandler),
    StartChord(String),
    Reset,
}

struct MatcherState {
    platform: Platform,
    chord_timeout: Duration,
    parser: ShortcutParser,
    declarations: Mutex<Vec<CompiledDeclaration>>,
    chord: Arc<Mutex<ChordState>>,
    torn_down: AtomicBool,
}

impl MatcherState {
    fn compile(&self, declarations: Vec<ShortcutDeclaration>) -> Vec<CompiledDeclaration> {
        declarations
            .into_iter()
            .map(|declaration| {
                let pattern = match self.parser.parse_declaration(&declaration) {
                    Ok(pattern) => Some(pattern),
                    Err(e) => {
                        debug!("Skipping shortcut declaration: {e}");
                        None
                    }
                };
                CompiledDeclaration {
                    pattern,
                    handler: declaration.handler,
                    suppress_in_inputs: declaration.suppress_in_inputs,
                }
            })
            .collect()
    }

    fn matches(&self, pattern: &KeyPattern, key: &str, pending: Option<&str>, event: &KeyEvent) -> bool {
        match pattern {
            KeyPattern::Chord { first, second } => {
                pending == Some(first.as_str()) && key == second.as_str()
            }
            KeyPattern::Combo { modifiers, key: combo_key } => {
                modifiers
                    .iter()
                    .all(|modifier| modifier.resolve(self.platform).is_held(event))
                    && key == combo_key.as_str()
            }
            KeyPattern::Simple(simple_key) => {
                key == simple_key.as_str() && !event.has_command_modifier()
            }
        }
    }

    fn evaluate(&self, event: &KeyEvent) -> Outcome {
        let key = self.parser.normalize_key(&event.key);
        let declarations = lock_or_recover(&self.declarations, "shortcut declarations");
        let pending = lock_or_recover(&self.chord, "chord state")
            .pending_key(Instant::now())
            .map(str::to_string);

        let fired = declarations.iter().find(|declaration| {
            declaration.applies_to(event)
                && declaration
                    .pattern
                    .as_ref()
                    .is_some_and(|pattern| self.matches(pattern, &key, pending.as_deref(), event))
        });
        if let Some(declaration) = fired {
            return Outcome::Fire(declaration.handler.clone());
        }

        let starts_chord = declarations.iter().any(|declaration| {
            declaration.applies_to(event)
                && declaration
                    .pattern
                    .as_ref()
                    .and_then(KeyPattern::chord_start)
                    .is_some_and(|first| first == key)
        });
        if starts_chord && !event.has_command_modifier() {
            Outcome::StartChord(key)
        } else {
            Outcome::Reset
        }
    }
}

impl KeyListener for MatcherState {
    fn on_key_down(&self, event: &mut KeyEvent) {
        if self.torn_down.load(Ordering::Acquire) {
            return;
        }

        match self.evaluate(event) {
            Outcome::Fire(handler) => {
                event.prevent_default();
                lock_or_recover(&self.chord, "chord state").clear();
                debug!("Shortcut fired for key '{}'", event.key);
                handler();
            }
            Outcome::StartChord(key) => start_chord(&self.chord, key, self.chord_timeout),
            Outcome::Reset => lock_or_recover(&self.chord, "chord state").clear(),
        }
    }

    fn on_key_consumed(&self, _event: &KeyEvent) {
        if !self.torn_down.load(Ordering::Acquire) {
            lock_or_recover(&self.chord, "chord state").clear();
        }
    }
}

pub struct ShortcutMatcher {
    state: Arc<MatcherState>,
    listener: Mutex<Option<ListenerGuard>>,
}

impl ShortcutMatcher {
    pub fn install(
        bus: &KeyEventBus, priority: ListenerPriority, platform: Platform, config: &ShortcutConfig,
        declarations: Vec<ShortcutDeclaration>,
    ) -> Self {
        let state = Arc::new(MatcherState {
            platform,
            chord_timeout: config.chord_timeout(),
            parser: ShortcutParser::new(),
            declarations: Mutex::new(Vec::new()),
            chord: Arc::new(Mutex::new(ChordState::default())),
            torn_down: AtomicBool::new(false),
        });
        *lock_or_recover(&state.declarations, "shortcut declarations") = state.compile(declarations);

        let guard = bus.add_listener(priority, state.clone());
        Self {
            state,
            listener: Mutex::new(Some(guard)),
        }
    }

    /// Replaces the live declaration list without touching the listener.
    pub fn set_declarations(&self, declarations: Vec<ShortcutDeclaration>) {
        let compiled = self.state.compile(declarations);
        *lock_or_recover(&self.state.declarations, "shortcut declarations") = compiled;
    }

    pub fn declaration_count(&self) -> usize {
        lock_or_recover(&self.state.declarations, "shortcut declarations").len()
    }

    pub fn pending_chord_key(&self) -> Option<String> {
        lock_or_recover(&self.state.chord, "chord state")
            .pending_key(Instant::now())
            .map(str::to_string)
    }

    pub fn is_installed(&self) -> bool {
        lock_or_recover(&self.listener, "matcher listener").is_some()
    }

    /// Removes the listener and cancels any pending chord timer. Later calls
    /// do nothing.
    pub fn teardown(&self) {
        let Some(mut guard) = lock_or_recover(&self.listener, "matcher listener").take() else {
            return;
        };
        self.state.torn_down.store(true, Ordering::Release);
        guard.remove();
        lock_or_recover(&self.state.chord, "chord state").clear();
        lock_or_recover(&self.state.declarations, "shortcut declarations").clear();
        debug!("Shortcut matcher torn down");
    }
}

impl Drop for ShortcutMatcher {
    fn drop(&mut self) {
        self.teardown();
    }
}
