// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity categories.

use serde::Serialize;

/// A category tag an activity can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const TRANSPORT: &str = "transport";
pub const HOME: &str = "home";
pub const FOOD: &str = "food";
pub const SHOPPING: &str = "shopping";

/// Categories offered when creating an activity by hand.
pub const CATEGORIES: [Category; 4] = [
    Category {
        id: TRANSPORT,
        label: "Transport",
        icon: "🚗",
    },
    Category {
        id: HOME,
        label: "Home",
        icon: "🏠",
    },
    Category {
        id: FOOD,
        label: "Food",
        icon: "🍔",
    },
    Category {
        id: SHOPPING,
        label: "Shopping",
        icon: "🛒",
    },
];

/// Look up a category by its id (exact match).
pub fn find(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}
