use std::sync::{
    Mutex,
    MutexGuard,
};

use log::error;

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock_or_recover<'a, T>(mutex: &'a Mutex<T>, name: &str) -> MutexGuard<'a, T> {
    mutex.lock().unwrap_or_else(|e| {
        error!("Failed to acquire {name} lock: {e}");
        e.into_inner()
    })
}
