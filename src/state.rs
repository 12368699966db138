use std::sync::Arc;

use tokio::sync::Mutex;

use crate::chat_memory::ConversationMemory;
use crate::config::Config;
use crate::store::LocalStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LocalStore>,
    pub config: Config,
    pub chat_memory: Arc<Mutex<ConversationMemory>>,
}

impl AppState {
    pub fn new(store: LocalStore, config: Config) -> Self {
        let memory = ConversationMemory::new(
            chrono::Duration::minutes(config.chat_memory.max_age_minutes),
            config.chat_memory.max_turns,
        );

        Self {
            store: Arc::new(store),
            config,
            chat_memory: Arc::new(Mutex::new(memory)),
        }
    }
}
