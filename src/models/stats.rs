//! Derived carbon statistics for the dashboard and insights screens.
//!
//! Nothing here is persisted; everything is recomputed from ledger state on
//! demand.

use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{Activity, LedgerState, QuickAction};

/// Approximate kg of CO₂ one tree absorbs in a year.
pub const KG_CO2_PER_TREE_YEAR: f64 = 21.0;
/// Approximate kg of CO₂ from burning one gallon of gasoline.
pub const KG_CO2_PER_GALLON: f64 = 4.6;

/// Impact recorded under one quick-action category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CategoryBreakdown {
    pub id: String,
    pub label: String,
    pub icon: String,
    /// Sum of impact over recent activities in this category
    pub total: f64,
    /// Number of recent activities in this category
    pub count: u32,
    /// Share of the lifetime total, rounded to a whole percent
    pub percentage: u32,
}

/// Everyday equivalents of a CO₂ amount, rounded to one decimal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CarbonEquivalents {
    /// Trees needed for a year to absorb the same amount
    pub trees: f64,
    /// Gallons of gasoline producing the same amount
    pub gallons_of_gasoline: f64,
}

impl CarbonEquivalents {
    pub fn from_total(total_kg: f64) -> Self {
        Self {
            trees: round_to_tenth(total_kg / KG_CO2_PER_TREE_YEAR),
            gallons_of_gasoline: round_to_tenth(total_kg / KG_CO2_PER_GALLON),
        }
    }
}

/// Insights screen summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Insights {
    /// Lifetime total, rounded to one decimal
    pub total_carbon_saved: f64,
    /// Activities in the recent window
    pub total_activities: u32,
    /// Sorted by total, largest first
    pub categories: Vec<CategoryBreakdown>,
    pub equivalents: CarbonEquivalents,
}

impl Insights {
    pub fn from_state(state: &LedgerState) -> Self {
        Self {
            total_carbon_saved: round_to_tenth(state.total_carbon_saved),
            total_activities: state.recent_activities.len() as u32,
            categories: category_breakdown(
                &state.quick_actions,
                &state.recent_activities,
                state.total_carbon_saved,
            ),
            equivalents: CarbonEquivalents::from_total(state.total_carbon_saved),
        }
    }
}

/// Break recent activities down by quick-action category.
///
/// Percentages are taken against the lifetime total and are all zero while
/// the total is zero. Categories are sorted by total, largest first; ties keep
/// quick-action order.
pub fn category_breakdown(
    quick_actions: &[QuickAction],
    recent_activities: &[Activity],
    total_carbon_saved: f64,
) -> Vec<CategoryBreakdown> {
    let mut breakdown: Vec<CategoryBreakdown> = quick_actions
        .iter()
        .map(|action| {
            let (total, count) = recent_activities
                .iter()
                .filter(|a| a.category == action.id)
                .fold((0.0, 0u32), |(sum, n), a| (sum + a.impact, n + 1));

            CategoryBreakdown {
                id: action.id.clone(),
                label: action.label.clone(),
                icon: action.icon.clone(),
                total,
                count,
                percentage: percentage_of(total, total_carbon_saved),
            }
        })
        .collect();

    breakdown.sort_by(|a, b| b.total.total_cmp(&a.total));
    breakdown
}

fn percentage_of(part: f64, whole: f64) -> u32 {
    if whole > 0.0 {
        (part / whole * 100.0).round() as u32
    } else {
        0
    }
}

/// Round to one decimal place for display.
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
