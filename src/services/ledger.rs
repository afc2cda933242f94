// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity ledger service.
//!
//! Owns the ledger state for the lifetime of the process:
//! 1. Seed defaults, then overlay whatever slices the store holds
//! 2. Apply mutations (the only way state changes)
//! 3. Hand a snapshot of every slice to a background writer after each change
//! 4. Publish sync progress so callers can wait for storage to settle

use chrono::Utc;
use futures_util::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::db::{envelope, keys, KeyValueStore, StoreError};
use crate::error::{AppError, Result};
use crate::models::activity::filter_by_category;
use crate::models::ledger::RECENT_ACTIVITY_LIMIT;
use crate::models::{Activity, ActivityGroup, Insights, LedgerState, QuickAction};
use crate::time_utils::format_utc_rfc3339;

/// Where persisted storage stands relative to in-memory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Storage matches memory
    Synced,
    /// A change is queued but no write has started
    Dirty,
    /// A write is in flight
    Syncing,
    /// The latest write failed; the next change will try again
    Failed,
}

/// Sync progress, published after every change and every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SyncState {
    pub status: SyncStatus,
    /// Bumped on every state change
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub revision: u64,
    /// Newest revision successfully written
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub persisted_revision: u64,
    /// Newest revision the writer has finished with, successfully or not
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub attempted_revision: u64,
}

impl SyncState {
    fn initial() -> Self {
        Self {
            status: SyncStatus::Synced,
            revision: 0,
            persisted_revision: 0,
            attempted_revision: 0,
        }
    }

    /// No write is outstanding for the latest revision.
    pub fn is_settled(&self) -> bool {
        self.attempted_revision >= self.revision
    }
}

/// A snapshot queued for the background writer.
struct PersistJob {
    revision: u64,
    state: LedgerState,
}

struct Inner {
    state: LedgerState,
    revision: u64,
}

/// The single owner of ledger state.
///
/// Construct once at startup with [`Ledger::load`] and share behind an `Arc`.
/// Mutation methods are the only entry points that change state; each change
/// is persisted in the background without blocking the caller.
pub struct Ledger {
    inner: RwLock<Inner>,
    jobs: mpsc::UnboundedSender<PersistJob>,
    sync: Arc<watch::Sender<SyncState>>,
}

impl Ledger {
    /// Seed default state, overlay the slices found in `store`, and start the
    /// background writer. Never fails: unreadable slices keep their defaults.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let state = load_state(store.as_ref()).await;

        let (sync, _) = watch::channel(SyncState::initial());
        let sync = Arc::new(sync);
        let (jobs, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(store, rx, sync.clone()));

        Self {
            inner: RwLock::new(Inner { state, revision: 0 }),
            jobs,
            sync,
        }
    }

    // ─── Reads ───────────────────────────────────────────────────

    /// Copy of the whole ledger state.
    pub async fn snapshot(&self) -> LedgerState {
        self.inner.read().await.state.clone()
    }

    pub async fn quick_actions(&self) -> Vec<QuickAction> {
        self.inner.read().await.state.quick_actions.clone()
    }

    pub async fn activity_groups(&self) -> Vec<ActivityGroup> {
        self.inner.read().await.state.activity_groups.clone()
    }

    /// Recent activities, newest first.
    pub async fn recent_activities(&self) -> Vec<Activity> {
        self.inner.read().await.state.recent_activities.clone()
    }

    /// Recent activities in `category` (exact match); `None` returns all.
    pub async fn activities_in_category(&self, category: Option<&str>) -> Vec<Activity> {
        let inner = self.inner.read().await;
        filter_by_category(&inner.state.recent_activities, category)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn total_carbon_saved(&self) -> f64 {
        self.inner.read().await.state.total_carbon_saved
    }

    pub async fn show_tooltips(&self) -> bool {
        self.inner.read().await.state.show_tooltips
    }

    pub async fn insights(&self) -> Insights {
        Insights::from_state(&self.inner.read().await.state)
    }

    // ─── Mutations ───────────────────────────────────────────────

    /// Record a fully formed activity.
    ///
    /// The activity joins the front of the recent window (oldest entries past
    /// the limit are dropped) and its impact is added to the lifetime total.
    /// Returns the activity as stored; its id gets a suffix if it collided.
    pub async fn add_activity(&self, activity: Activity) -> Result<Activity> {
        check_impact(&activity)?;

        let mut inner = self.inner.write().await;
        let stored = inner.state.record_activity(activity);

        tracing::info!(
            activity_id = %stored.id,
            category = %stored.category,
            impact = stored.impact,
            date = %format_utc_rfc3339(stored.date),
            total = inner.state.total_carbon_saved,
            "Activity recorded"
        );

        self.commit(&mut inner);
        Ok(stored)
    }

    /// Record an activity group; the sum of its members' impact is added to
    /// the lifetime total.
    pub async fn add_activity_group(&self, group: ActivityGroup) -> Result<ActivityGroup> {
        for activity in &group.activities {
            check_impact(activity)?;
        }

        let mut inner = self.inner.write().await;
        let added = inner.state.record_group(group.clone());

        tracing::info!(
            group_id = %group.id,
            activities = group.activities.len(),
            impact = added,
            total = inner.state.total_carbon_saved,
            "Activity group recorded"
        );

        self.commit(&mut inner);
        Ok(group)
    }

    /// Use a quick action. Unknown ids change nothing and return `None`.
    pub async fn log_quick_action(&self, action_id: &str) -> Option<Activity> {
        let mut inner = self.inner.write().await;

        let Some(activity) = inner.state.log_quick_action(action_id, Utc::now()) else {
            tracing::debug!(action_id, "Ignoring unknown quick action");
            return None;
        };

        tracing::info!(
            action_id,
            activity_id = %activity.id,
            impact = activity.impact,
            total = inner.state.total_carbon_saved,
            "Quick action logged"
        );

        self.commit(&mut inner);
        Some(activity)
    }

    /// Hide the onboarding tooltips for good. Returns `true` if they were
    /// showing.
    pub async fn dismiss_tooltips(&self) -> bool {
        let mut inner = self.inner.write().await;

        if !inner.state.dismiss_tooltips() {
            return false;
        }

        tracing::debug!("Tooltips dismissed");
        self.commit(&mut inner);
        true
    }

    // ─── Sync Status ─────────────────────────────────────────────

    pub fn sync_state(&self) -> SyncState {
        *self.sync.borrow()
    }

    /// Watch sync progress.
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.sync.subscribe()
    }

    /// Wait until the writer has finished with the latest revision.
    pub async fn settled(&self) -> SyncState {
        let mut rx = self.sync.subscribe();
        let state = match rx.wait_for(SyncState::is_settled).await {
            Ok(state) => *state,
            // Writer gone; report whatever was last published
            Err(_) => self.sync_state(),
        };
        state
    }

    /// Bump the revision and queue a snapshot. Must be called with the write
    /// lock held so jobs are queued in revision order.
    fn commit(&self, inner: &mut Inner) {
        inner.revision += 1;
        let revision = inner.revision;

        self.sync.send_modify(|s| {
            s.revision = revision;
            s.status = SyncStatus::Dirty;
        });

        let job = PersistJob {
            revision,
            state: inner.state.clone(),
        };
        if self.jobs.send(job).is_err() {
            tracing::error!(revision, "Persistence writer has stopped; change not saved");
            self.sync.send_modify(|s| {
                s.attempted_revision = revision;
                s.status = SyncStatus::Failed;
            });
        }
    }
}

fn valid_impact(impact: f64) -> bool {
    impact.is_finite() && impact >= 0.0
}

fn check_impact(activity: &Activity) -> Result<()> {
    if valid_impact(activity.impact) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Activity impact must be a non-negative number, got {}",
            activity.impact
        )))
    }
}

// ─── Loading ─────────────────────────────────────────────────

/// Seeded defaults overlaid with every slice the store can provide.
async fn load_state(store: &dyn KeyValueStore) -> LedgerState {
    let mut state = LedgerState::default();

    let raw: Vec<Option<String>> = join_all(keys::ALL.iter().map(|key| store.get(key)))
        .await
        .into_iter()
        .zip(keys::ALL)
        .map(|(result, key)| match result {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read stored slice, keeping default");
                None
            }
        })
        .collect();

    let slices: [Option<String>; 5] = raw.try_into().unwrap_or_default();
    let [quick_actions, groups, recent, total, tooltips] = slices;

    let quick_actions: Option<Vec<QuickAction>> =
        decode_slice(keys::QUICK_ACTIONS, quick_actions);
    if let Some(v) = consistent(keys::QUICK_ACTIONS, quick_actions, |actions| {
        actions.iter().all(|a| valid_impact(a.impact))
    }) {
        state.quick_actions = v;
    }

    let groups: Option<Vec<ActivityGroup>> = decode_slice(keys::ACTIVITY_GROUPS, groups);
    if let Some(v) = consistent(keys::ACTIVITY_GROUPS, groups, |groups| {
        groups
            .iter()
            .flat_map(|g| &g.activities)
            .all(|a| valid_impact(a.impact))
    }) {
        state.activity_groups = v;
    }

    let recent: Option<Vec<Activity>> = decode_slice(keys::RECENT_ACTIVITIES, recent);
    if let Some(mut v) = consistent(keys::RECENT_ACTIVITIES, recent, |activities| {
        activities.iter().all(|a| valid_impact(a.impact))
    }) {
        if v.len() > RECENT_ACTIVITY_LIMIT {
            tracing::warn!(
                stored = v.len(),
                limit = RECENT_ACTIVITY_LIMIT,
                "Stored recent activities exceed window, keeping newest"
            );
            v.truncate(RECENT_ACTIVITY_LIMIT);
        }
        state.recent_activities = v;
    }

    let total: Option<f64> = decode_slice(keys::TOTAL_CARBON_SAVED, total);
    if let Some(v) = consistent(keys::TOTAL_CARBON_SAVED, total, |total| valid_impact(*total)) {
        state.total_carbon_saved = v;
    }
    if let Some(v) = decode_slice(keys::SHOW_TOOLTIPS, tooltips) {
        state.show_tooltips = v;
    }

    tracing::info!(
        quick_actions = state.quick_actions.len(),
        groups = state.activity_groups.len(),
        recent = state.recent_activities.len(),
        total = state.total_carbon_saved,
        "Ledger loaded"
    );

    state
}

fn decode_slice<T: DeserializeOwned>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match envelope::decode(key, &raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Unreadable stored slice, keeping default");
            None
        }
    }
}

/// Keep a decoded slice only if it upholds the ledger invariants; a slice that
/// does not is treated like an unreadable one.
fn consistent<T>(key: &str, value: Option<T>, valid: impl FnOnce(&T) -> bool) -> Option<T> {
    let value = value?;
    if valid(&value) {
        Some(value)
    } else {
        tracing::warn!(key, "Stored slice violates ledger invariants, keeping default");
        None
    }
}

// ─── Background Writer ───────────────────────────────────────

/// Write queued snapshots until the ledger is dropped.
///
/// Only the newest queued snapshot is written; older ones are superseded.
async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    mut jobs: mpsc::UnboundedReceiver<PersistJob>,
    sync: Arc<watch::Sender<SyncState>>,
) {
    while let Some(mut job) = jobs.recv().await {
        while let Ok(newer) = jobs.try_recv() {
            job = newer;
        }

        sync.send_modify(|s| s.status = SyncStatus::Syncing);

        let result = persist_state(store.as_ref(), &job.state).await;

        match &result {
            Ok(()) => tracing::debug!(revision = job.revision, "Ledger persisted"),
            Err(e) => tracing::error!(
                revision = job.revision,
                error = %e,
                "Failed to persist ledger"
            ),
        }

        sync.send_modify(|s| {
            s.attempted_revision = job.revision;
            if result.is_ok() {
                s.persisted_revision = job.revision;
            }
            s.status = if s.revision > job.revision {
                SyncStatus::Dirty
            } else if result.is_ok() {
                SyncStatus::Synced
            } else {
                SyncStatus::Failed
            };
        });
    }

    tracing::debug!("Persistence writer stopped");
}

/// Write all five slices. Keys are written one after another; there is no
/// atomicity across them.
pub async fn persist_state(
    store: &dyn KeyValueStore,
    state: &LedgerState,
) -> std::result::Result<(), StoreError> {
    store
        .set(keys::QUICK_ACTIONS, envelope::encode(&state.quick_actions)?)
        .await?;
    store
        .set(keys::ACTIVITY_GROUPS, envelope::encode(&state.activity_groups)?)
        .await?;
    store
        .set(
            keys::RECENT_ACTIVITIES,
            envelope::encode(&state.recent_activities)?,
        )
        .await?;
    store
        .set(
            keys::TOTAL_CARBON_SAVED,
            envelope::encode(&state.total_carbon_saved)?,
        )
        .await?;
    store
        .set(keys::SHOW_TOOLTIPS, envelope::encode(&state.show_tooltips)?)
        .await?;
    Ok(())
}
