use std::sync::Arc;

use textly_chat::TurnOrchestrator;
use textly_persist::PersistClient;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The orchestrator and the persistence client are cheap to clone; they are
/// built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: PersistClient,
    pub orchestrator: TurnOrchestrator,
}

impl AppState {
    pub fn new(config: Config, persist: PersistClient, orchestrator: TurnOrchestrator) -> Self {
        Self {
            config: Arc::new(config),
            persist,
            orchestrator,
        }
    }
}
