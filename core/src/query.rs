//! Query builder for feed URIs.
//!
//! A `Query` holds URL parameters and category restrictions. Categories are
//! joined with `/` (x AND y) under the reserved `/-/` segment; put
//! `"a|b"` in a single category to OR them. Parameters become the query
//! string. Keys, values and categories are percent-escaped.

use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    feed: Option<String>,
    params: BTreeMap<String, String>,
    categories: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query bound to a feed path such as `/dir/mysubdir/`.
    pub fn with_feed(feed: impl Into<String>) -> Self {
        Self {
            feed: Some(feed.into()),
            ..Self::default()
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Full-text search term, sent as the `q` parameter.
    pub fn text_query(&mut self, text: impl Into<String>) -> &mut Self {
        self.params.insert("q".to_string(), text.into());
        self
    }

    pub fn add_category(&mut self, category: impl Into<String>) -> &mut Self {
        self.categories.push(category.into());
        self
    }

    pub fn feed(&self) -> Option<&str> {
        self.feed.as_deref()
    }

    pub fn set_feed(&mut self, feed: impl Into<String>) {
        self.feed = Some(feed.into());
    }

    /// Render against the query's own feed (empty when unset).
    pub fn to_uri(&self) -> String {
        self.render(self.feed.as_deref().unwrap_or_default())
    }

    /// Render against `feed`, ignoring the query's own feed.
    pub fn render(&self, feed: &str) -> String {
        let mut uri = feed.to_string();
        if !self.categories.is_empty() {
            let categories: Vec<String> = self
                .categories
                .iter()
                .map(|c| urlencoding::encode(c).into_owned())
                .collect();
            uri.truncate(uri.trim_end_matches('/').len());
            uri.push_str("/-/");
            uri.push_str(&categories.join("/"));
        }
        if self.params.is_empty() {
            return uri;
        }
        let pairs: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        let separator = if uri.contains('?') { '&' } else { '?' };
        uri.push(separator);
        uri.push_str(&pairs.join("&"));
        uri
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

/// Apply an optional query to a facade path.
pub(crate) fn apply(path: String, query: Option<&Query>) -> String {
    match query {
        Some(query) => query.render(&path),
        None => path,
    }
}
