//! Purpose: Define the HTTP collaborator used by `Fetcher` and its ureq implementation.
//! Exports: `Transport`, `Request`, `FetchConfig`, `UreqTransport`, `form_pairs`.
//! Role: Blocking GET boundary; everything past the response body belongs to the fetcher.
//! Invariants: Transport failures (including non-2xx status) surface as `ErrorKind::Http`.
//! Invariants: A GET body is sent form-encoded in the query string, keys in sorted order.
//! Notes: Timeouts live here; the fetcher itself never times out or retries.
use std::time::Duration;

use serde_json::Value;
use url::Url;

use crate::core::error::{Error, ErrorKind};
use crate::core::matcher::JsonObject;

#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub url: Url,
    pub body: Option<JsonObject>,
}

/// Performs one GET and returns the raw response body.
pub trait Transport: Send + Sync {
    fn get(&self, request: &Request) -> Result<String, Error>;
}

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub connect_timeout: Option<Duration>,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl FetchConfig {
    pub fn new() -> Self {
        Self {
            connect_timeout: None,
            timeout: None,
            user_agent: concat!("backbone-model/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(config: &FetchConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new().user_agent(&config.user_agent);
        if let Some(timeout) = config.connect_timeout {
            builder = builder.timeout_connect(timeout);
        }
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

impl Transport for UreqTransport {
    fn get(&self, request: &Request) -> Result<String, Error> {
        let mut url = request.url.clone();
        if let Some(body) = &request.body {
            let pairs = form_pairs(body);
            if !pairs.is_empty() {
                let mut query = url.query_pairs_mut();
                for (key, value) in &pairs {
                    query.append_pair(key, value);
                }
            }
        }

        tracing::debug!(url = %url, "GET");
        match self.agent.request_url("GET", &url).call() {
            Ok(response) => response.into_string().map_err(|err| {
                Error::http(format!("failed to read response body: {err}"))
                    .with_url(url.as_str())
                    .with_source(err)
            }),
            Err(ureq::Error::Status(code, response)) => Err(Error::new(ErrorKind::Http)
                .with_message(format!(
                    "server returned status {code} {}",
                    response.status_text()
                ))
                .with_status(code)
                .with_url(url.as_str())),
            Err(ureq::Error::Transport(err)) => Err(Error::http(err.to_string())
                .with_url(url.as_str())
                .with_source(err)),
        }
    }
}

/// Flattens a JSON object into form pairs: `key[sub]=v` for objects, `key[]=v` for arrays.
pub fn form_pairs(body: &JsonObject) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in body {
        push_form_pairs(&mut pairs, key.clone(), value);
    }
    pairs
}

fn push_form_pairs(pairs: &mut Vec<(String, String)>, key: String, value: &Value) {
    match value {
        Value::Object(map) => {
            for (sub, nested) in map {
                push_form_pairs(pairs, format!("{key}[{sub}]"), nested);
            }
        }
        Value::Array(items) => {
            for item in items {
                push_form_pairs(pairs, format!("{key}[]"), item);
            }
        }
        Value::String(text) => pairs.push((key, text.clone())),
        Value::Number(number) => pairs.push((key, number.to_string())),
        Value::Bool(flag) => pairs.push((key, if *flag { "1" } else { "0" }.to_string())),
        Value::Null => pairs.push((key, String::new())),
    }
}
