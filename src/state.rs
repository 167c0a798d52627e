use std::sync::Arc;

use crate::chat::hub::Hub;
use crate::config::ChatConfig;

#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub chat: Arc<ChatConfig>,
}

impl AppState {
    pub fn new(chat: ChatConfig) -> Self {
        Self {
            hub: Arc::new(Hub::new()),
            chat: Arc::new(chat),
        }
    }
}
