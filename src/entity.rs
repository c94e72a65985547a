//! Descriptor shared by every entity screen.
//!
//! The list and form views are written once against [`Entity`]; each model
//! supplies its endpoint, empty draft, validation, search fields, field
//! setters and the fixed messages its screens show.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::filter::Lookup;
use crate::routes::Section;
use crate::views::Reference;

/// Fixed, user-facing strings of one entity's screens.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub load_list_failed: &'static str,
    pub load_failed: &'static str,
    pub invalid_id: &'static str,
    pub create_failed: &'static str,
    pub save_failed: &'static str,
    pub delete_failed: &'static str,
    pub confirm_delete: &'static str,
    pub confirm_delete_permanently: &'static str,
    pub empty_list: &'static str,
}

pub const SAVE_FAILED: &str = "Could not save changes.";

pub trait Entity: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + Sync + 'static {
    /// Fixed per-screen parameter, e.g. the assignee of a task screen.
    type Scope: Clone + fmt::Debug + Send + Sync + 'static;

    /// Collection segment below the base url, e.g. `customers`.
    const RESOURCE: &'static str;
    const MESSAGES: Messages;
    /// Collections the screens load for pickers and name lookups.
    const REFERENCES: &'static [Reference] = &[];

    fn id(&self) -> Option<i64>;

    /// The empty record a "new" screen starts from. Never carries an id.
    fn draft(scope: &Self::Scope) -> Self;

    fn section(scope: &Self::Scope) -> Section;

    fn list_query(_scope: &Self::Scope) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Text the list search matches against.
    fn search_fields(&self, lookup: &Lookup) -> Vec<String>;

    /// Required-field check run before any save. Returns the banner message.
    fn validate(&self) -> Result<(), &'static str>;

    /// Normalizes a copy of the draft right before it is sent.
    fn prepare(&mut self, _scope: &Self::Scope) {}

    /// Applies one raw form input.
    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError>;

    /// Every editable field with its current display value, keyed like [`Entity::set_field`].
    fn fields(&self, lookup: &Lookup) -> Vec<(&'static str, String)>;

    /// Headline of a row or form.
    fn label(&self) -> String;

    /// One list row; defaults to the label.
    fn row(&self, _lookup: &Lookup) -> String {
        self.label()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("Unknown field: {0}")]
    Unknown(String),

    #[error("Invalid value {value:?} for {field}: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl FieldError {
    fn invalid(field: &'static str, value: &str, reason: impl ToString) -> Self {
        FieldError::Invalid {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Empty input clears an optional text field.
pub fn optional_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// `YYYY-MM-DD`; longer ISO strings are cut to the date part and blank input means no date.
pub fn parse_date(field: &'static str, value: &str) -> Result<Option<NaiveDate>, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| FieldError::invalid(field, value, e))
}

/// A positive record id; blank input clears the reference.
pub fn parse_reference(field: &'static str, value: &str) -> Result<Option<i64>, FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    parse_id(value)
        .map(Some)
        .ok_or_else(|| FieldError::invalid(field, value, "expected a positive id"))
}

pub fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

pub fn parse_bool(field: &'static str, value: &str) -> Result<bool, FieldError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(FieldError::invalid(field, value, "expected yes or no")),
    }
}

/// Parses a wire value (`"in_progress"`, `2`) through the type's serde representation.
pub fn parse_wire<T: DeserializeOwned>(field: &'static str, value: &str) -> Result<T, FieldError> {
    let value = value.trim();
    let raw = match value.parse::<u64>() {
        Ok(number) => serde_json::Value::from(number),
        Err(_) => serde_json::Value::String(value.to_string()),
    };
    serde_json::from_value(raw).map_err(|e| FieldError::invalid(field, value, e))
}

pub fn display_optional<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// The value as it appears on the wire, the form [`parse_wire`] accepts back.
pub fn wire_value<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(text)) => text,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}
