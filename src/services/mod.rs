// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod ledger;
pub mod tooltips;
pub mod validation;

pub use ledger::{Ledger, SyncState, SyncStatus};
pub use tooltips::TooltipTimer;
pub use validation::{ActivityForm, ActivityFormState};
