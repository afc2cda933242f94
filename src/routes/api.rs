// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for the ledger: state, activities, groups, quick actions.

use crate::error::{AppError, Result};
use crate::models::category::{Category, CATEGORIES};
use crate::models::stats::round_to_tenth;
use crate::models::{Activity, ActivityGroup, CarbonEquivalents, QuickAction};
use crate::services::{ActivityForm, ActivityFormState, SyncState};
use crate::time_utils::timestamp_id;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_TITLE_LEN: usize = 100;

/// Ledger API routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/home", get(get_home))
        .route("/api/categories", get(get_categories))
        .route("/api/activities", get(get_activities).post(create_activity))
        .route("/api/groups", get(get_groups).post(create_group))
        .route("/api/quick-actions", get(get_quick_actions))
        .route("/api/quick-actions/{id}/log", post(log_quick_action))
        .route("/api/tooltips/dismiss", post(dismiss_tooltips))
        .route("/api/sync", get(get_sync))
}

/// The first interaction with quick actions or the create flow also
/// dismisses the onboarding tooltips.
async fn dismiss_on_interaction(state: &AppState) {
    if state.ledger.dismiss_tooltips().await {
        state.tooltips.cancel();
    }
}

// ─── State ───────────────────────────────────────────────────

/// Activity group with its derived impact.
#[derive(Serialize, Clone, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct GroupResponse {
    pub id: String,
    pub title: String,
    pub impact: f64,
    pub activities: Vec<Activity>,
    pub description: Option<String>,
}

impl From<ActivityGroup> for GroupResponse {
    fn from(group: ActivityGroup) -> Self {
        Self {
            impact: group.impact(),
            id: group.id,
            title: group.title,
            activities: group.activities,
            description: group.description,
        }
    }
}

/// Everything the ledger exposes read-only.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StateResponse {
    pub quick_actions: Vec<QuickAction>,
    pub activity_groups: Vec<GroupResponse>,
    pub recent_activities: Vec<Activity>,
    pub total_carbon_saved: f64,
    pub show_tooltips: bool,
}

async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let snapshot = state.ledger.snapshot().await;

    Json(StateResponse {
        quick_actions: snapshot.quick_actions,
        activity_groups: snapshot
            .activity_groups
            .into_iter()
            .map(GroupResponse::from)
            .collect(),
        recent_activities: snapshot.recent_activities,
        total_carbon_saved: snapshot.total_carbon_saved,
        show_tooltips: snapshot.show_tooltips,
    })
}

// ─── Home Dashboard ──────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HomeResponse {
    pub quick_actions: Vec<QuickAction>,
    pub recent_activities: Vec<Activity>,
    /// Lifetime total, rounded to one decimal
    pub total_carbon_saved: f64,
    pub equivalents: CarbonEquivalents,
    pub show_tooltips: bool,
}

/// Home dashboard. Showing it with tooltips on starts their auto-dismiss
/// countdown.
async fn get_home(State(state): State<Arc<AppState>>) -> Json<HomeResponse> {
    let snapshot = state.ledger.snapshot().await;

    if snapshot.show_tooltips {
        state.tooltips.arm(state.ledger.clone()).await;
    }

    Json(HomeResponse {
        quick_actions: snapshot.quick_actions,
        recent_activities: snapshot.recent_activities,
        total_carbon_saved: round_to_tenth(snapshot.total_carbon_saved),
        equivalents: CarbonEquivalents::from_total(snapshot.total_carbon_saved),
        show_tooltips: snapshot.show_tooltips,
    })
}

async fn get_categories() -> Json<Vec<Category>> {
    Json(CATEGORIES.to_vec())
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Filter by exact category id
    category: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ActivitiesResponse {
    pub category: Option<String>,
    pub activities: Vec<Activity>,
    pub total: u32,
}

/// Recent activities, newest first, optionally filtered by category.
async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ActivitiesQuery>,
) -> Json<ActivitiesResponse> {
    let category = params.category.filter(|c| !c.is_empty());

    tracing::debug!(category = ?category, "Fetching activities");

    let activities = state
        .ledger
        .activities_in_category(category.as_deref())
        .await;

    Json(ActivitiesResponse {
        total: activities.len() as u32,
        category,
        activities,
    })
}

/// Submit the create-activity form. A rejected form comes back with one
/// message per invalid field.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ActivityForm>,
) -> Result<(StatusCode, Json<Activity>)> {
    let mut submission = ActivityFormState::new(form);
    let Some(activity) = submission.submit(Utc::now()) else {
        return Err(AppError::Validation(submission.errors));
    };
    let stored = state.ledger.add_activity(activity).await?;

    dismiss_on_interaction(&state).await;

    Ok((StatusCode::CREATED, Json(stored)))
}

// ─── Activity Groups ─────────────────────────────────────────

#[derive(Deserialize)]
struct NewGroupRequest {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    activities: Vec<NewGroupActivity>,
}

#[derive(Deserialize)]
struct NewGroupActivity {
    name: String,
    category: String,
    impact: f64,
    #[serde(default)]
    notes: Option<String>,
}

impl NewGroupRequest {
    /// Build a group with fresh time-derived ids.
    fn into_group(self) -> Result<ActivityGroup> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::BadRequest("Group title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(AppError::BadRequest(format!(
                "Group title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        if let Some(blank) = self.activities.iter().position(|a| a.name.trim().is_empty()) {
            return Err(AppError::BadRequest(format!(
                "Activity {} in group has no name",
                blank + 1
            )));
        }

        let now = Utc::now();
        let id = format!("group-{}", timestamp_id(now));

        let activities = self
            .activities
            .into_iter()
            .enumerate()
            .map(|(i, a)| Activity {
                id: format!("{}-{}", id, i + 1),
                name: a.name.trim().to_string(),
                category: a.category,
                impact: a.impact,
                date: now,
                notes: a.notes.filter(|n| !n.trim().is_empty()),
            })
            .collect();

        Ok(ActivityGroup {
            id,
            title: title.to_string(),
            activities,
            description: self.description.filter(|d| !d.trim().is_empty()),
        })
    }
}

async fn get_groups(State(state): State<Arc<AppState>>) -> Json<Vec<GroupResponse>> {
    let groups = state.ledger.activity_groups().await;
    Json(groups.into_iter().map(GroupResponse::from).collect())
}

async fn create_group(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>)> {
    let group = request.into_group()?;
    let stored = state.ledger.add_activity_group(group).await?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}

// ─── Quick Actions ───────────────────────────────────────────

async fn get_quick_actions(State(state): State<Arc<AppState>>) -> Json<Vec<QuickAction>> {
    Json(state.ledger.quick_actions().await)
}

/// Use a quick action. Unknown ids leave the ledger untouched.
async fn log_quick_action(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Activity>> {
    let activity = state
        .ledger
        .log_quick_action(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Quick action {} not found", id)))?;

    dismiss_on_interaction(&state).await;

    Ok(Json(activity))
}

// ─── Tooltips & Sync ─────────────────────────────────────────

async fn dismiss_tooltips(State(state): State<Arc<AppState>>) -> StatusCode {
    state.ledger.dismiss_tooltips().await;
    state.tooltips.cancel();
    StatusCode::NO_CONTENT
}

async fn get_sync(State(state): State<Arc<AppState>>) -> Json<SyncState> {
    Json(state.ledger.sync_state())
}
