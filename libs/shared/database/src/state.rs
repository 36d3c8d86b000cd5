use std::sync::Arc;

use shared_config::AppConfig;

use crate::memory::MemoryStore;
use crate::postgrest::PostgrestStore;
use crate::store::{AppointmentStore, ProviderStore, UserStore};

/// Shared request state: configuration plus the injected store handles.
///
/// Constructed once in `main` and passed down; there is no module-level
/// store singleton anywhere in the workspace.
pub struct AppState {
    pub config: AppConfig,
    pub users: Arc<dyn UserStore>,
    pub providers: Arc<dyn ProviderStore>,
    pub appointments: Arc<dyn AppointmentStore>,
}

impl AppState {
    pub fn postgrest(config: AppConfig) -> Self {
        let store = Arc::new(PostgrestStore::new(&config));
        Self {
            config,
            users: store.clone(),
            providers: store.clone(),
            appointments: store,
        }
    }

    pub fn in_memory(config: AppConfig) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: AppConfig, store: Arc<MemoryStore>) -> Self {
        Self {
            config,
            users: store.clone(),
            providers: store.clone(),
            appointments: store,
        }
    }
}
