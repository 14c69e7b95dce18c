//! Library entrypoint for alerthook.
//!
//! Exists mainly so the controller tests under `tests/` can build the app
//! state and router.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;

#[path = "middleware/auth.rs"]
pub mod auth;

pub mod services;

pub mod controllers;
pub mod routes;

use services::trade_dispatcher::{Dispatch, TradeDispatcher};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub dispatcher: Arc<dyn Dispatch>,
}

impl AppState {
    pub fn new(settings: config::Settings) -> Self {
        let dispatcher = Arc::new(TradeDispatcher::new(&settings));
        Self {
            settings: Arc::new(settings),
            dispatcher,
        }
    }
}
