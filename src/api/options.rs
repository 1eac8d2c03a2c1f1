//! Purpose: Describe per-request fetch options and merge them into a request URL.
//! Exports: `FetchOptions`.
//! Role: Immutable request configuration handed to `Fetcher` calls.
//! Invariants: Option query keys replace same-named keys already in the URL.
//! Invariants: Untouched URL query pairs keep their original order; option pairs follow, sorted by key.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::matcher::JsonObject;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub query: BTreeMap<String, String>,
    pub body: Option<JsonObject>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: JsonObject) -> Self {
        self.body = Some(body);
        self
    }

    pub fn apply(&self, url: &Url) -> Url {
        if self.query.is_empty() {
            return url.clone();
        }
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !self.query.contains_key(key.as_ref()))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        let mut merged = url.clone();
        merged.set_query(None);
        {
            let mut pairs = merged.query_pairs_mut();
            for (key, value) in &kept {
                pairs.append_pair(key, value);
            }
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::FetchOptions;
    use url::Url;

    #[test]
    fn query_options_are_appended() {
        let url = Url::parse("http://localhost:8080/api/videos.json?size=1").expect("url");
        let options = FetchOptions::new()
            .with_query("lang", "es")
            .with_query("page", "2");
        assert_eq!(
            options.apply(&url).as_str(),
            "http://localhost:8080/api/videos.json?size=1&lang=es&page=2"
        );
    }

    #[test]
    fn option_keys_replace_existing_pairs() {
        let url = Url::parse("http://localhost/items?size=1&q=a").expect("url");
        let options = FetchOptions::new().with_query("size", "20");
        assert_eq!(
            options.apply(&url).as_str(),
            "http://localhost/items?q=a&size=20"
        );
    }

    #[test]
    fn empty_options_leave_url_alone() {
        let url = Url::parse("http://localhost/items?b=2&a=1").expect("url");
        assert_eq!(FetchOptions::new().apply(&url), url);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: FetchOptions =
            serde_json::from_str(r#"{"query": {"k": "v"}}"#).expect("options");
        assert_eq!(options.query.get("k").map(String::as_str), Some("v"));
        assert!(options.body.is_none());
    }
}
