// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ledger state: the five slices persisted between sessions.
//!
//! All transitions here are pure in-memory bookkeeping. Locking and
//! persistence live in [`crate::services::Ledger`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::category::{FOOD, HOME, SHOPPING, TRANSPORT};
use crate::models::{Activity, ActivityGroup, QuickAction};
use crate::time_utils::timestamp_id;

/// Maximum number of entries kept in the recent-activities window.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Everything the ledger owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub quick_actions: Vec<QuickAction>,
    /// Newest first, unbounded
    pub activity_groups: Vec<ActivityGroup>,
    /// Newest first, capped at [`RECENT_ACTIVITY_LIMIT`]
    pub recent_activities: Vec<Activity>,
    /// Lifetime sum of every impact ever recorded (survives truncation)
    pub total_carbon_saved: f64,
    pub show_tooltips: bool,
}

impl Default for LedgerState {
    /// First-run state: default quick actions and two sample routines.
    fn default() -> Self {
        Self::seeded(Utc::now())
    }
}

impl LedgerState {
    /// First-run state with sample activities dated `now`.
    pub fn seeded(now: DateTime<Utc>) -> Self {
        Self {
            quick_actions: default_quick_actions(),
            activity_groups: sample_groups(now),
            recent_activities: Vec::new(),
            total_carbon_saved: 0.0,
            show_tooltips: true,
        }
    }

    /// Record an activity: prepend it to the recent window, drop anything past
    /// the window limit, and add its impact to the lifetime total.
    ///
    /// If the id collides with an activity still in the window, a suffix is
    /// appended so ids stay unique. Returns the activity as stored.
    pub fn record_activity(&mut self, mut activity: Activity) -> Activity {
        activity.id = self.unique_activity_id(&activity.id);

        self.total_carbon_saved += activity.impact;
        self.recent_activities.insert(0, activity.clone());
        self.recent_activities.truncate(RECENT_ACTIVITY_LIMIT);

        activity
    }

    /// Prepend a group and add the sum of its members' impact to the total.
    ///
    /// Returns the impact that was added.
    pub fn record_group(&mut self, group: ActivityGroup) -> f64 {
        let impact = group.impact();
        self.total_carbon_saved += impact;
        self.activity_groups.insert(0, group);
        impact
    }

    /// Use a quick action: bump its counter and record the activity it
    /// describes. Unknown ids leave the state untouched and return `None`.
    pub fn log_quick_action(&mut self, action_id: &str, now: DateTime<Utc>) -> Option<Activity> {
        let action = self.quick_actions.iter_mut().find(|a| a.id == action_id)?;
        action.count += 1;
        let activity = action.to_activity(timestamp_id(now), now);

        Some(self.record_activity(activity))
    }

    /// Turn the onboarding tooltips off. Returns `true` if the flag changed.
    pub fn dismiss_tooltips(&mut self) -> bool {
        std::mem::replace(&mut self.show_tooltips, false)
    }

    fn unique_activity_id(&self, base: &str) -> String {
        let taken = |id: &str| self.recent_activities.iter().any(|a| a.id == id);

        if !taken(base) {
            return base.to_string();
        }

        (1..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

/// Quick actions offered on first run.
pub fn default_quick_actions() -> Vec<QuickAction> {
    vec![
        QuickAction::new(TRANSPORT, "🚗", "Transport", 2.3),
        QuickAction::new(HOME, "🏠", "Home", 1.5),
        QuickAction::new(FOOD, "🍔", "Food", 1.8),
        QuickAction::new(SHOPPING, "🛒", "Shopping", 0.7),
    ]
}

/// Sample routines shown on first run.
pub fn sample_groups(now: DateTime<Utc>) -> Vec<ActivityGroup> {
    let activity = |id: &str, name: &str, category: &str, impact: f64| Activity {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        impact,
        date: now,
        notes: None,
    };

    vec![
        ActivityGroup {
            id: "office-day".to_string(),
            title: "Office Day".to_string(),
            activities: vec![
                activity("1", "Bus to work", TRANSPORT, 1.2),
                activity("2", "Vegetarian lunch", FOOD, 0.5),
                activity("3", "Office heating", HOME, 2.5),
            ],
            description: None,
        },
        ActivityGroup {
            id: "weekend-routine".to_string(),
            title: "Weekend Routine".to_string(),
            activities: vec![
                activity("4", "Grocery shopping", SHOPPING, 0.7),
                activity("5", "Drive to gym", TRANSPORT, 1.1),
                activity("6", "Cook dinner", FOOD, 2.0),
            ],
            description: None,
        },
    ]
}
