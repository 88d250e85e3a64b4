//! Remote JSON proxy

use async_trait::async_trait;
use serde_json::Value as Json;

use super::Proxy;
use super::ReadRequest;
use super::ReadResult;
use super::RemoteConfig;
use super::raw_records;
use crate::error::{ApiError, Error, StoreError};
use crate::model::RawRecord;
use crate::transport::HttpClient;
use crate::transport::HttpRequest;

/// Loads records from a JSON endpoint.
///
/// Sends `params` plus `page`/`limit` and, for remote sort and filter,
/// `sort`, `filter` and `filterMode` as JSON. Expects
/// `{ success, message?, <total_field>?, <records_field>? }` back.
#[derive(Debug, Clone)]
pub struct RemoteProxy {
    client: HttpClient,
    config: RemoteConfig,
}

impl RemoteProxy {
    pub fn new(client: HttpClient, config: RemoteConfig) -> Self {
        Self { client, config }
    }

    fn build_request(&self, request: &ReadRequest) -> HttpRequest {
        let mut http = HttpRequest::new(self.config.method, &self.config.url);
        http.params = request.params.clone();
        if let Some(page) = request.page {
            http.params.insert("page".into(), page.into());
        }
        if let Some(limit) = request.limit {
            http.params.insert("limit".into(), limit.into());
        }
        if let Some(sorters) = &request.sorters
            && let Ok(sort) = serde_json::to_value(sorters)
        {
            http.params.insert("sort".into(), sort);
        }
        if let Some((filters, mode)) = &request.filters
            && let (Ok(filter), Ok(mode)) = (serde_json::to_value(filters), serde_json::to_value(mode))
        {
            http.params.insert("filter".into(), filter);
            http.params.insert("filterMode".into(), mode);
        }
        http
    }

    /// Pulls the records and total out of a successful response body.
    fn records(&self, mut body: Json) -> Result<(Vec<RawRecord>, Option<u64>), Error> {
        let rows = match body.get_mut(&self.config.records_field).map(Json::take) {
            Some(Json::Array(rows)) => rows,
            Some(Json::Null) | None => Vec::new(),
            Some(_) => {
                return Err(StoreError::MissingRecords {
                    field: self.config.records_field.clone(),
                }
                .into());
            }
        };
        let total = match body.get(&self.config.total_field) {
            None | Some(Json::Null) => None,
            Some(total) => Some(total.as_u64().ok_or_else(|| {
                ApiError::parse(format!(
                    "'{}' is not a record count: {}",
                    self.config.total_field, total
                ))
            })?),
        };
        let records = raw_records(rows, &self.config.fields)?;
        let total = total.or(Some(records.len() as u64));
        Ok((records, total))
    }
}

#[async_trait]
impl Proxy for RemoteProxy {
    async fn read(&self, request: ReadRequest) -> ReadResult {
        let envelope = self.client.request(self.build_request(&request)).await;
        if !envelope.success {
            return ReadResult::failure(envelope.message.unwrap_or_else(|| "request failed".into()));
        }

        match self.records(envelope.body) {
            Ok((records, total)) => {
                let mut result = ReadResult::success(records, total);
                result.message = envelope.message;
                result
            }
            Err(e) => {
                log::warn!("{}: {}", self.config.url, e);
                ReadResult::failure(e.to_string())
            }
        }
    }
}
