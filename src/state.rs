use std::sync::Arc;

use crate::config::Config;
use crate::services::session_resolver::SessionResolver;
use crate::ws::room::Room;

/// Everything the HTTP and websocket handlers share. Built once at startup.
pub struct AppState {
    pub config: Config,
    pub room: Arc<Room>,
    pub resolver: Arc<dyn SessionResolver>,
}

impl AppState {
    pub fn new(config: Config, resolver: Arc<dyn SessionResolver>) -> Self {
        Self {
            config,
            room: Arc::new(Room::new()),
            resolver,
        }
    }
}
