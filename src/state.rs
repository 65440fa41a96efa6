// src/state.rs
use std::sync::Arc;
use std::time::Instant;

use crate::services::assistant::Assistant;
use crate::services::mailer::Mailer;
use crate::services::store::Store;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub mailer: Arc<dyn Mailer>,
    pub assistant: Arc<dyn Assistant>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        Self {
            store,
            mailer,
            assistant,
            started_at: Instant::now(),
        }
    }
}
