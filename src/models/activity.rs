// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Logged activities, activity groups and quick-action presets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// One logged action and its estimated CO₂ impact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Activity {
    /// Time-derived identifier, unique within the recent-activities window
    pub id: String,
    pub name: String,
    /// Category id (transport, home, food, shopping, ...)
    pub category: String,
    /// Kilograms of CO₂, never negative
    pub impact: f64,
    /// When the activity happened
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A named, reusable bundle of activities representing a routine.
///
/// The group's impact is always derived from its members; no cached total is
/// stored alongside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityGroup {
    pub id: String,
    pub title: String,
    pub activities: Vec<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActivityGroup {
    /// Sum of the member activities' impact.
    pub fn impact(&self) -> f64 {
        self.activities.iter().map(|a| a.impact).sum()
    }
}

/// A preset one-tap activity template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct QuickAction {
    /// Also used as the category of the activities it creates
    pub id: String,
    pub icon: String,
    pub label: String,
    /// Fixed impact recorded on every use (kg CO₂)
    pub impact: f64,
    /// Number of times the action has been used
    pub count: u32,
}

impl QuickAction {
    pub fn new(id: &str, icon: &str, label: &str, impact: f64) -> Self {
        Self {
            id: id.to_string(),
            icon: icon.to_string(),
            label: label.to_string(),
            impact,
            count: 0,
        }
    }

    /// Build the activity recorded when this action is used.
    pub fn to_activity(&self, id: String, date: DateTime<Utc>) -> Activity {
        Activity {
            id,
            name: format!("Quick {}", self.label),
            category: self.id.clone(),
            impact: self.impact,
            date,
            notes: None,
        }
    }
}

/// Filter activities by exact category match. `None` keeps everything.
pub fn filter_by_category<'a>(
    activities: &'a [Activity],
    category: Option<&str>,
) -> Vec<&'a Activity> {
    match category {
        Some(category) => activities
            .iter()
            .filter(|a| a.category == category)
            .collect(),
        None => activities.iter().collect(),
    }
}
