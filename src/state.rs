//! Application state shared across handlers

use std::sync::Arc;

use crate::services::{inbox::EmailInbox, radar_items::RadarItemsService};

/// Shared application state accessible via Axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub radar_items: RadarItemsService,
    pub inbox: EmailInbox,
    pub api_key: Arc<str>,
    pub debug: bool,
}

impl AppState {
    #[must_use]
    pub fn new(radar_items: RadarItemsService, inbox: EmailInbox, api_key: &str, debug: bool) -> Self {
        Self {
            radar_items,
            inbox,
            api_key: api_key.into(),
            debug,
        }
    }
}
