//! Sparse patch parsing shared by the user and post patch models.
//!
//! A patch arrives either as a typed struct or as a loose map of field names
//! to JSON values. The loose form is checked against a fixed allow-list before
//! it is deserialized, so no caller-supplied key ever reaches a statement.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// Parses `fields` into the patch type `T`, rejecting any key outside `allowed`.
pub(crate) fn parse_fields<T: DeserializeOwned>(
    entity: &str,
    allowed: &[&str],
    fields: Map<String, Value>,
) -> AppResult<T> {
    if let Some(unknown) = fields.keys().find(|key| !allowed.contains(&key.as_str())) {
        return Err(AppError::Validation {
            field: unknown.clone(),
            reason: format!(
                "'{}' is not an updatable {} field (allowed: {})",
                unknown,
                entity,
                allowed.join(", ")
            ),
        });
    }

    serde_json::from_value(Value::Object(fields)).map_err(|e| AppError::Validation {
        field: entity.to_string(),
        reason: e.to_string(),
    })
}
