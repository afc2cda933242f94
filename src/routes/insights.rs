// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Insights (analytics) routes.

use crate::models::Insights;
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/insights", get(get_insights))
}

/// Per-category breakdown, totals and everyday equivalents.
///
/// Computed from current ledger state on every request.
async fn get_insights(State(state): State<Arc<AppState>>) -> Json<Insights> {
    let insights = state.ledger.insights().await;

    tracing::debug!(
        total = insights.total_carbon_saved,
        activities = insights.total_activities,
        "Computed insights"
    );

    Json(insights)
}
