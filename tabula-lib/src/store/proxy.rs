//! Proxy seam between a store and its data source

use async_trait::async_trait;
use serde_json::Map;
use serde_json::Value as Json;

use crate::error::StoreError;
use crate::model::FilterMode;
use crate::model::Filters;
use crate::model::RawRecord;
use crate::model::Sorter;
use crate::model::Value;

/// What a store asks its proxy for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub params: Map<String, Json>,
    /// Present only when sorting is remote.
    pub sorters: Option<Vec<Sorter>>,
    /// Present only when filtering is remote.
    pub filters: Option<(Filters, FilterMode)>,
}

/// What a proxy hands back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadResult {
    pub success: bool,
    pub message: Option<String>,
    pub total: Option<u64>,
    pub records: Vec<RawRecord>,
}

impl ReadResult {
    pub fn success(records: Vec<RawRecord>, total: Option<u64>) -> Self {
        Self {
            success: true,
            message: None,
            total,
            records,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            total: None,
            records: Vec::new(),
        }
    }
}

/// A data source for a [`Store`](super::Store).
///
/// Implementations never fail with an error; failures come back as
/// `ReadResult { success: false, .. }`.
#[async_trait]
pub trait Proxy: Send + Sync {
    async fn read(&self, request: ReadRequest) -> ReadResult;
}

/// Converts raw JSON rows into field maps.
///
/// Objects are taken as-is; arrays are zipped positionally with `fields`.
pub fn raw_records(rows: Vec<Json>, fields: &[String]) -> Result<Vec<RawRecord>, StoreError> {
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| match row {
            Json::Object(map) => Ok(map
                .into_iter()
                .map(|(key, value)| (key, Value::from_json(value)))
                .collect()),
            Json::Array(values) => {
                if values.len() > fields.len() {
                    return Err(StoreError::TooManyValues {
                        index,
                        values: values.len(),
                        fields: fields.len(),
                    });
                }
                Ok(fields
                    .iter()
                    .cloned()
                    .zip(values.into_iter().map(Value::from_json))
                    .collect())
            }
            other => Err(StoreError::InvalidRecord {
                index,
                kind: Value::from_json(other).type_name(),
            }),
        })
        .collect()
}
