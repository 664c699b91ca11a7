//! Environment guards shared by integration tests that touch process state.

use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Applies environment variable changes until dropped, then restores them.
pub struct EnvVarGuard {
    previous: Vec<(OsString, Option<OsString>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets or removes each variable; `None` removes it.
    pub fn set_many(changes: &[(OsString, Option<OsString>)]) -> Self {
        let lock = env_lock();
        let previous = changes
            .iter()
            .map(|(key, value)| {
                let prior = env::var_os(key);
                // SAFETY: ENV_MUTEX serializes environment mutations in tests.
                unsafe {
                    match value {
                        Some(new_value) => env::set_var(key, new_value),
                        None => env::remove_var(key),
                    }
                }
                (key.clone(), prior)
            })
            .collect();

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..).rev() {
            // SAFETY: the guard still holds ENV_MUTEX.
            unsafe {
                match value {
                    Some(prior) => env::set_var(&key, prior),
                    None => env::remove_var(&key),
                }
            }
        }
    }
}

/// Returns `true` when the named variable is set to a non-empty value.
#[must_use]
pub fn env_flag(name: &str) -> bool {
    env::var_os(name).is_some_and(|value| !value.is_empty())
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
