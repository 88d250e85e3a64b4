//! Inline array proxy

use async_trait::async_trait;

use super::ArrayConfig;
use super::Proxy;
use super::ReadRequest;
use super::ReadResult;
use super::raw_records;

/// Serves records supplied inline.
///
/// When the request carries a `limit`, the records are paged locally
/// (`page` is 1-based).
#[derive(Debug, Clone)]
pub struct ArrayProxy {
    config: ArrayConfig,
}

impl ArrayProxy {
    pub fn new(config: ArrayConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Proxy for ArrayProxy {
    async fn read(&self, request: ReadRequest) -> ReadResult {
        let records = match raw_records(self.config.records.clone(), &self.config.fields) {
            Ok(records) => records,
            Err(e) => return ReadResult::failure(e.to_string()),
        };
        let total = records.len() as u64;

        let records = match request.limit {
            Some(limit) if limit > 0 => {
                let page = request.page.unwrap_or(1).max(1) as usize;
                records
                    .into_iter()
                    .skip((page - 1) * limit as usize)
                    .take(limit as usize)
                    .collect()
            }
            _ => records,
        };

        ReadResult::success(records, Some(total))
    }
}
