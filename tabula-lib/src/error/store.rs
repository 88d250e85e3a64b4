//! Store error types

/// Errors raised while configuring a store or ingesting a load result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    /// A positional record has more values than declared fields.
    #[error("Record {index} has {values} values but only {fields} fields are declared")]
    TooManyValues {
        index: usize,
        values: usize,
        fields: usize,
    },

    /// A raw record is neither an object nor an array.
    #[error("Record {index} is not an object or array (got {kind})")]
    InvalidRecord { index: usize, kind: &'static str },

    /// The response envelope is missing the records array.
    #[error("Response field '{field}' is missing or not an array")]
    MissingRecords { field: String },
}
