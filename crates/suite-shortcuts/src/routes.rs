use std::sync::atomic::{
    AtomicU64,
    Ordering,
};
use std::sync::{
    Arc,
    Mutex,
    Weak,
};

use dashmap::DashMap;
use log::debug;

use crate::sync::lock_or_recover;

pub const MODULE_ROUTES: [(&str, &str); 12] = [
    ("home", "/"),
    ("pages", "/pages"),
    ("projects", "/projects"),
    ("documents", "/documents"),
    ("calendar", "/calendar"),
    ("databases", "/data"),
    ("inbox", "/inbox"),
    ("copilot", "/copilot"),
    ("tax", "/tax"),
    ("accounting", "/accounting"),
    ("settings", "/settings"),
    ("developer", "/developer"),
];

pub fn module_route(module_id: &str) -> Option<&'static str> {
    MODULE_ROUTES
        .iter()
        .find(|(id, _)| *id == module_id)
        .map(|(_, route)| *route)
}

/// `/` only matches the root itself; every other prefix matches by
/// `starts_with`.
pub fn route_matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        path == "/"
    } else {
        path.starts_with(prefix)
    }
}

pub fn is_module_active(module_id: &str, path: &str) -> bool {
    module_route(module_id).is_some_and(|prefix| route_matches(prefix, path))
}

type LocationCallback = Arc<dyn Fn(&str) + Send + Sync>;

struct LocationInner {
    path: Mutex<String>,
    next_id: AtomicU64,
    subscribers: DashMap<u64, LocationCallback>,
}

/// The router's current path as an observable value. Subscribers are called
/// synchronously from [`Location::set`] whenever the path changes.
#[derive(Clone)]
pub struct Location {
    inner: Arc<LocationInner>,
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(LocationInner {
                path: Mutex::new(path.into()),
                next_id: AtomicU64::new(0),
                subscribers: DashMap::new(),
            }),
        }
    }

    pub fn current(&self) -> String {
        lock_or_recover(&self.inner.path, "location").clone()
    }

    pub fn set(&self, path: impl Into<String>) {
        let path = path.into();
        {
            let mut current = lock_or_recover(&self.inner.path, "location");
            if *current == path {
                return;
            }
            current.clone_from(&path);
        }
        debug!("Location changed to {path}");

        let callbacks: Vec<LocationCallback> = self
            .inner
            .subscribers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        for callback in callbacks {
            callback(&path);
        }
    }

    pub fn subscribe<F>(&self, callback: F) -> LocationSubscription
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.insert(id, Arc::new(callback));
        LocationSubscription {
            location: Arc::downgrade(&self.inner),
            id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

/// Unsubscribes on drop.
pub struct LocationSubscription {
    location: Weak<LocationInner>,
    id: u64,
}

impl Drop for LocationSubscription {
    fn drop(&mut self) {
        if let Some(location) = self.location.upgrade() {
            location.subscribers.remove(&self.id);
        }
    }
}
