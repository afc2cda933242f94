// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Carbon Tracker: log everyday activities and track their CO₂ impact
//!
//! This crate provides the activity ledger (state, persistence and derived
//! statistics) and the HTTP API the mobile front end talks to.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{Ledger, TooltipTimer};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub ledger: Arc<Ledger>,
    pub tooltips: TooltipTimer,
}

impl AppState {
    pub fn new(config: Config, ledger: Arc<Ledger>) -> Self {
        let tooltips = TooltipTimer::new(config.tooltip_dismiss_delay);
        Self {
            config,
            ledger,
            tooltips,
        }
    }
}
