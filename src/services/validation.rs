// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Create-activity form validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{AppError, FieldErrors};
use crate::models::{category, Activity};
use crate::time_utils::timestamp_id;

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct ActivityForm {
    #[serde(default)]
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    /// Selected category id; empty when nothing is selected
    #[serde(default)]
    #[validate(custom(function = "validate_category"))]
    pub category: String,
    /// Impact in kg CO₂ as entered (text or number)
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(custom(function = "validate_impact"))]
    pub impact: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ActivityForm {
    /// Validate and build the activity this form describes.
    ///
    /// Fails with one message per invalid field.
    pub fn to_activity(&self, now: DateTime<Utc>) -> Result<Activity, AppError> {
        self.validate()
            .map_err(|errors| AppError::Validation(field_messages(&errors)))?;

        let impact = parse_impact(&self.impact).map_err(|e| {
            AppError::Validation(FieldErrors::from([("impact".to_string(), message_of(&e))]))
        })?;

        let notes = self
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        Ok(Activity {
            id: timestamp_id(now),
            name: self.name.trim().to_string(),
            category: self.category.clone(),
            impact,
            date: now,
            notes,
        })
    }
}

/// Form plus its current validation messages.
///
/// A successful submit resets both; a failed one keeps the fields as typed so
/// they can be corrected.
#[derive(Debug, Clone, Default)]
pub struct ActivityFormState {
    pub form: ActivityForm,
    pub errors: FieldErrors,
}

impl ActivityFormState {
    pub fn new(form: ActivityForm) -> Self {
        Self {
            form,
            errors: FieldErrors::new(),
        }
    }

    /// Validate the current fields. On success the form is cleared and the
    /// activity to submit is returned; on failure `errors` is populated.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Option<Activity> {
        match self.form.to_activity(now) {
            Ok(activity) => {
                *self = Self::default();
                Some(activity)
            }
            Err(AppError::Validation(errors)) => {
                self.errors = errors;
                None
            }
            Err(other) => {
                self.errors = FieldErrors::from([("form".to_string(), other.to_string())]);
                None
            }
        }
    }
}

fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(error("required", "Activity name is required"));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), ValidationError> {
    if category::find(category).is_none() {
        return Err(error("required", "Please select a category"));
    }
    Ok(())
}

fn validate_impact(impact: &str) -> Result<(), ValidationError> {
    parse_impact(impact).map(|_| ())
}

/// Parse a positive, finite impact value.
fn parse_impact(raw: &str) -> Result<f64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(error("required", "Carbon impact is required"));
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => Ok(value),
        _ => Err(error("positive", "Please enter a valid positive number")),
    }
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn message_of(error: &ValidationError) -> String {
    error
        .message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| error.code.to_string())
}

/// Flatten validator output into one message per field.
fn field_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(field, errs)| errs.first().map(|e| (field.to_string(), message_of(e))))
        .collect()
}

/// Accept the impact either as typed text or as a JSON number.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
