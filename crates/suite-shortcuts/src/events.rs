use std::cmp::Reverse;
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    Weak,
};

use log::debug;

use crate::models::KeyEvent;
use crate::sync::lock_or_recover;

pub trait KeyListener: Send + Sync {
    fn on_key_down(&self, event: &mut KeyEvent);

    /// Called instead of `on_key_down` when a listener dispatched earlier
    /// already handled the key press.
    fn on_key_consumed(&self, _event: &KeyEvent) {}
}

/// Dispatch order between listeners. Variants earlier in the list are asked
/// first; within one priority the most recently installed listener goes first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ListenerPriority {
    Local,
    Module,
    Global,
}

struct ListenerEntry {
    id: u64,
    priority: ListenerPriority,
    listener: Arc<dyn KeyListener>,
}

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<ListenerEntry>>,
}

/// Fan-out point for key-down notifications coming from the host UI.
///
/// Once a listener prevents the event's default, the remaining listeners only
/// get `on_key_consumed`, so a single key press runs at most one shortcut
/// handler while every listener still observes it.
#[derive(Clone, Default)]
pub struct KeyEventBus {
    inner: Arc<BusInner>,
}

impl KeyEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(
        &self, priority: ListenerPriority, listener: Arc<dyn KeyListener>,
    ) -> ListenerGuard {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock_or_recover(&self.inner.listeners, "key listeners").push(ListenerEntry {
            id,
            priority,
            listener,
        });
        debug!("Installed key listener {id} with priority {priority:?}");

        ListenerGuard {
            bus: Arc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Returns true when a listener handled the event.
    pub fn dispatch(&self, event: &mut KeyEvent) -> bool {
        let ordered: Vec<Arc<dyn KeyListener>> = {
            let listeners = lock_or_recover(&self.inner.listeners, "key listeners");
            let mut entries: Vec<&ListenerEntry> = listeners.iter().collect();
            entries.sort_by_key(|entry| (entry.priority, Reverse(entry.id)));
            entries
                .into_iter()
                .map(|entry| entry.listener.clone())
                .collect()
        };

        let mut listeners = ordered.into_iter();
        for listener in listeners.by_ref() {
            listener.on_key_down(event);
            if event.is_default_prevented() {
                break;
            }
        }
        for listener in listeners {
            listener.on_key_consumed(event);
        }
        event.is_default_prevented()
    }

    pub fn listener_count(&self) -> usize {
        lock_or_recover(&self.inner.listeners, "key listeners").len()
    }
}

/// Keeps a listener installed; removing it (explicitly or on drop) happens
/// once.
pub struct ListenerGuard {
    bus: Weak<BusInner>,
    id: Option<u64>,
}

impl ListenerGuard {
    pub fn remove(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(bus) = self.bus.upgrade() {
            lock_or_recover(&bus.listeners, "key listeners").retain(|entry| entry.id != id);
            debug!("Removed key listener {id}");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.id.is_some()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.remove();
    }
}
