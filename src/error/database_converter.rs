use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::Serialize;

use crate::error::ConstraintParser;

/// Which store constraint a write tripped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Unique,
    ForeignKey,
    NotNull,
    Check,
}

/// Structured description of a constraint violation reported by PostgreSQL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConstraintViolation {
    pub kind: ViolationKind,
    pub entity: String,
    pub field: String,
    pub value: Option<String>,
}

/// Reads constraint details out of a Diesel error without consuming it.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    /// Describes `error` if it is a constraint violation the parser understands.
    pub fn inspect(error: &DieselError) -> Option<ConstraintViolation> {
        let DieselError::DatabaseError(kind, info) = error else {
            return None;
        };

        // PostgreSQL reports the offending key in the detail line
        let message = match info.details() {
            Some(details) => format!("{}\n{}", info.message(), details),
            None => info.message().to_string(),
        };
        let message = message.as_str();
        let constraint_name = info.constraint_name();

        match kind {
            DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation => {
                let (entity, field, value) =
                    ConstraintParser::parse_keyed_violation(message, constraint_name)?;
                let kind = if matches!(kind, DatabaseErrorKind::UniqueViolation) {
                    ViolationKind::Unique
                } else {
                    ViolationKind::ForeignKey
                };
                Some(ConstraintViolation {
                    kind,
                    entity,
                    field,
                    value,
                })
            }
            DatabaseErrorKind::NotNullViolation | DatabaseErrorKind::CheckViolation => {
                let (entity, field) =
                    ConstraintParser::parse_column_violation(message, constraint_name)?;
                let kind = if matches!(kind, DatabaseErrorKind::NotNullViolation) {
                    ViolationKind::NotNull
                } else {
                    ViolationKind::Check
                };
                Some(ConstraintViolation {
                    kind,
                    entity,
                    field,
                    value: None,
                })
            }
            _ => None,
        }
    }
}
