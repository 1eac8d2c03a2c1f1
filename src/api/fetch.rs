//! Purpose: Fetch a model's JSON payload over HTTP and populate the model from it.
//! Exports: `Fetcher`, `decode_object`.
//! Role: Orchestrates url resolution, the transport call, decoding, and `Model::parse`.
//! Invariants: Exactly one of `on_success` / `on_error` runs, exactly once, per call.
//! Invariants: A missing url fails with `InvalidUrl` before any transport call.
//! Invariants: The model is mutated only after the body decodes to a JSON object.
//! Invariants: `fetch` settles only through the callbacks of `fetch_with`.
//! Invariants: Failures are reported to the caller, never logged above debug.
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use super::options::FetchOptions;
use super::transport::{FetchConfig, Request, Transport, UreqTransport};
use crate::core::error::{Error, ErrorKind};
use crate::core::matcher::JsonObject;
use crate::core::model::Model;

#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::with_config(&FetchConfig::default())
    }

    pub fn with_config(config: &FetchConfig) -> Self {
        Self::with_transport(UreqTransport::new(config))
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Callback form. Inside a tokio runtime the request runs on the blocking
    /// pool; under any other executor it runs inline on the polling thread.
    pub async fn fetch_with<M, S, E>(
        &self,
        model: &mut M,
        options: Option<&FetchOptions>,
        on_success: S,
        on_error: E,
    ) where
        M: Model,
        S: FnOnce(),
        E: FnOnce(Error),
    {
        match self.fetch_into(model, options).await {
            Ok(()) => on_success(),
            Err(err) => {
                tracing::debug!(error = %err, "fetch failed");
                on_error(err);
            }
        }
    }

    /// Future form. `fetch_with` runs exactly one callback; only the error
    /// callback changes the outcome.
    pub async fn fetch<M: Model>(
        &self,
        model: &mut M,
        options: Option<&FetchOptions>,
    ) -> Result<(), Error> {
        let mut outcome = Ok(());
        self.fetch_with(model, options, || {}, |err| outcome = Err(err))
            .await;
        outcome
    }

    async fn fetch_into<M: Model>(
        &self,
        model: &mut M,
        options: Option<&FetchOptions>,
    ) -> Result<(), Error> {
        let url = resolve_url(model.url(), options)?;
        let request = Request {
            url,
            body: options.and_then(|options| options.body.clone()),
        };
        let url_text = request.url.to_string();

        let body = match tokio::runtime::Handle::try_current() {
            Ok(_) => {
                let transport = Arc::clone(&self.transport);
                tokio::task::spawn_blocking(move || transport.get(&request))
                    .await
                    .map_err(|err| {
                        Error::http("transport task failed")
                            .with_url(url_text.as_str())
                            .with_source(err)
                    })??
            }
            Err(_) => self.transport.get(&request)?,
        };

        let payload = decode_object(&body, "response body")
            .map_err(|err| err.with_url(url_text.as_str()))?;
        model.parse(&payload);
        tracing::debug!(url = %url_text, keys = payload.len(), "model populated");
        Ok(())
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_url(raw: Option<&str>, options: Option<&FetchOptions>) -> Result<Url, Error> {
    let Some(raw) = raw else {
        return Err(Error::new(ErrorKind::InvalidUrl).with_message("model has no url"));
    };
    let url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::InvalidUrl)
            .with_message("model url is not a valid absolute url")
            .with_url(raw)
            .with_source(err)
    })?;
    Ok(match options {
        Some(options) => options.apply(&url),
        None => url,
    })
}

/// Decodes `raw` as a JSON object; `label` names the input in error messages.
pub fn decode_object(raw: &str, label: &str) -> Result<JsonObject, Error> {
    let value: Value = serde_json::from_str(raw).map_err(|err| {
        Error::new(ErrorKind::Parsing)
            .with_message(format!("{label} is not valid json"))
            .with_source(err)
    })?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(Error::new(ErrorKind::Parsing).with_message(format!("{label} is not a json object"))),
    }
}
