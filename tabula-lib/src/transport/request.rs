//! Request and response envelope types

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value as Json;

/// HTTP method used by a remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => f.write_str("GET"),
            HttpMethod::Post => f.write_str("POST"),
        }
    }
}

/// A request to a JSON endpoint.
///
/// `GET` sends `params` as the query string, `POST` as a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub params: Map<String, Json>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Map::new(),
        }
    }

    /// Adds a parameter (builder pattern).
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Json>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Identity of the request for coalescing identical in-flight calls.
    pub fn signature(&self) -> String {
        format!(
            "{} {} {}",
            self.method,
            self.url,
            Json::Object(self.params.clone())
        )
    }

    /// Query-string pairs. Strings are sent verbatim, everything else as JSON.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Json::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect()
    }
}

/// Response envelope `{ success, message?, ... }`.
///
/// Transport failures never surface as errors to callers; they arrive as an
/// envelope with `success: false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub success: bool,
    pub message: Option<String>,
    /// Full response body.
    pub body: Json,
}

impl Envelope {
    /// Wraps a decoded response body.
    pub fn from_body(body: Json) -> Self {
        let success = body.get("success").and_then(Json::as_bool).unwrap_or(false);
        let message = body
            .get("message")
            .and_then(Json::as_str)
            .map(str::to_string);
        Self {
            success,
            message,
            body,
        }
    }

    /// A failed envelope carrying `message`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            body: Json::Null,
        }
    }
}
