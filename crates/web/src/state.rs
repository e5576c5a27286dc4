use std::sync::Arc;

use storage::services::orchestrator::Orchestrator;
use storage::services::ranking::RankingEngine;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }

    pub fn engine(&self) -> &RankingEngine {
        self.orchestrator.engine()
    }
}
