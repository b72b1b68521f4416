//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;
use timetable_core::ports::DatabaseService;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
}

impl AppState {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }
}
