//! Typed record access errors

use crate::model::FieldType;

/// A typed getter on a [`Record`](crate::model::Record) failed.
///
/// `record` names the row by its primary-key values (`id=7`), so the error
/// still means something once the record is gone.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("Record [{record}] has no field '{field}'")]
    Missing { record: String, field: String },

    /// The field holds a value of another kind than the getter reads.
    #[error("Record [{record}] field '{field}' holds {found}, not {expected}")]
    WrongType {
        record: String,
        field: String,
        expected: FieldType,
        found: &'static str,
    },
}

impl FieldError {
    /// Name of the field that was read.
    pub fn field(&self) -> &str {
        match self {
            Self::Missing { field, .. } | Self::WrongType { field, .. } => field,
        }
    }

    /// Primary-key label of the record that was read.
    pub fn record(&self) -> &str {
        match self {
            Self::Missing { record, .. } | Self::WrongType { record, .. } => record,
        }
    }
}
