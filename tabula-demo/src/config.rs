//! Demo configuration file.

use std::path::Path;

use serde::Deserialize;
use serde_json::json;
use tabula::grid::GridConfig;
use tabula_lib::Store;
use tabula_lib::store::{ArrayConfig, RemoteConfig, StoreConfig};
use tabula_lib::transport::HttpClient;

use crate::error::DemoError;

/// Everything needed to wire a store, a grid and a pagination bar.
///
/// `remote` wins over `data` when both are present.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub store: StoreConfig,
    pub data: Option<ArrayConfig>,
    pub remote: Option<RemoteConfig>,
    pub grid: GridConfig,
    pub width: f64,
    pub height: f64,
    /// Field to sort by after the first render.
    pub sort: Option<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            data: None,
            remote: None,
            grid: GridConfig::default(),
            width: 640.0,
            height: 200.0,
            sort: None,
        }
    }
}

impl DemoConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DemoError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Built-in people table used when no file is given.
    pub fn sample() -> Result<Self, DemoError> {
        Ok(serde_json::from_value(json!({
            "store": {
                "primary_keys": ["id"],
                "field_types": {"age": "int"},
                "limit": 4,
                "page": 1
            },
            "data": {
                "fields": ["id", "name", "age", "city"],
                "records": [
                    [1, "Bob", "30", "Oslo"],
                    [2, "Ann", "25", "Riga"],
                    [3, "Cid", "41", "Lima"],
                    [4, "Dee", "25", "Kyiv"],
                    [5, "Eve", "37", "Nice"],
                    [6, "Fay", "52", "Bern"]
                ]
            },
            "grid": {
                "selection_mode": "multi",
                "freeze": 1,
                "row_height": 16,
                "columns": [
                    {"text": "Id", "data_index": "id", "width": 40},
                    {"text": "Person", "columns": [
                        {"text": "Name", "data_index": "name", "min_width": 120, "sortable": true},
                        {"text": "Age", "data_index": "age", "width": 60, "sortable": true, "text_align": "right"}
                    ]},
                    {"text": "City", "data_index": "city", "min_width": 100}
                ]
            },
            "width": 480,
            "height": 96,
            "sort": "age"
        }))?)
    }

    pub fn build_store(&mut self) -> Store {
        let config = std::mem::take(&mut self.store);
        match self.remote.take() {
            Some(remote) => Store::remote(config, remote, HttpClient::default()),
            None => Store::array(config, self.data.take().unwrap_or_default()),
        }
    }
}
