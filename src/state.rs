use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::engine::ProgressEngine;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    engine: Arc<ProgressEngine>,
}

impl AppState {
    pub fn new(engine: Arc<ProgressEngine>) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            engine,
        }
    }

    pub fn engine(&self) -> Arc<ProgressEngine> {
        Arc::clone(&self.engine)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }
}
