//! Store configuration

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value as Json;

use crate::model::FieldType;
use crate::model::Filter;
use crate::model::FilterMode;
use crate::model::Filters;
use crate::model::Sorter;
use crate::transport::HttpMethod;

/// Configuration shared by every store.
///
/// All fields have defaults, so a config can be deserialized from a partial
/// JSON object or built in code:
///
/// ```
/// use tabula_lib::model::{FieldType, Sorter};
/// use tabula_lib::store::StoreConfig;
///
/// let config = StoreConfig::default()
///     .primary_keys(["id"])
///     .field_type("age", FieldType::Int)
///     .sorter(Sorter::asc("name"));
/// assert!(!config.remote_sort);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Identity fields; empty means every field.
    pub primary_keys: Vec<String>,
    /// Declared field types used for coercion at ingestion.
    pub field_types: HashMap<String, FieldType>,
    /// Initial sorters.
    pub sorters: Vec<Sorter>,
    /// Delegate sorting to the proxy (reload instead of local sort).
    pub remote_sort: bool,
    /// Initial filters.
    pub filters: Filters,
    pub filter_mode: FilterMode,
    /// Delegate filtering to the proxy.
    pub remote_filter: bool,
    /// Start loading as soon as the store is created.
    pub auto_load: bool,
    /// Page number sent to the proxy.
    pub page: Option<u32>,
    /// Page size sent to the proxy.
    pub limit: Option<u32>,
    /// Extra parameters sent to the proxy.
    pub params: Map<String, Json>,
}

impl StoreConfig {
    pub fn primary_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn field_type(mut self, field: impl Into<String>, ty: FieldType) -> Self {
        self.field_types.insert(field.into(), ty);
        self
    }

    pub fn sorter(mut self, sorter: Sorter) -> Self {
        self.sorters.push(sorter);
        self
    }

    pub fn remote_sort(mut self, enabled: bool) -> Self {
        self.remote_sort = enabled;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.set(filter);
        self
    }

    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    pub fn remote_filter(mut self, enabled: bool) -> Self {
        self.remote_filter = enabled;
        self
    }

    pub fn auto_load(mut self, enabled: bool) -> Self {
        self.auto_load = enabled;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// Inline data for an array store.
///
/// `records` may be objects or positional arrays; arrays are zipped with
/// `fields`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ArrayConfig {
    pub fields: Vec<String>,
    pub records: Vec<Json>,
}

impl ArrayConfig {
    pub fn new<I, S>(fields: I, records: Vec<Json>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            records,
        }
    }
}

fn default_records_field() -> String {
    "records".to_string()
}

fn default_total_field() -> String {
    "total".to_string()
}

/// Endpoint settings for a remote store.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Envelope key holding the records array.
    #[serde(default = "default_records_field")]
    pub records_field: String,
    /// Envelope key holding the total count.
    #[serde(default = "default_total_field")]
    pub total_field: String,
    /// Field names for positional (array) records.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl RemoteConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            records_field: default_records_field(),
            total_field: default_total_field(),
            fields: Vec::new(),
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn records_field(mut self, field: impl Into<String>) -> Self {
        self.records_field = field.into();
        self
    }

    pub fn total_field(mut self, field: impl Into<String>) -> Self {
        self.total_field = field.into();
        self
    }
}
