// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod category;
pub mod ledger;
pub mod stats;

pub use activity::{Activity, ActivityGroup, QuickAction};
pub use category::Category;
pub use ledger::LedgerState;
pub use stats::{CarbonEquivalents, CategoryBreakdown, Insights};
