//! Application state shared by all handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::engine::StudyEngine;

/// Error returned when the engine lock cannot be acquired
#[derive(Debug)]
pub struct EngineLockError;

impl std::fmt::Display for EngineLockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Engine unavailable")
    }
}

impl std::error::Error for EngineLockError {}

#[derive(Clone)]
pub struct AppState {
    engine: Arc<Mutex<StudyEngine>>,
}

impl AppState {
    pub fn new(engine: StudyEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    /// Lock the engine, failing if a handler panicked while holding it
    pub fn engine(&self) -> Result<MutexGuard<'_, StudyEngine>, EngineLockError> {
        self.engine.lock().map_err(|_: PoisonError<_>| {
            tracing::error!("Engine mutex poisoned - a thread panicked while holding the lock");
            EngineLockError
        })
    }
}
