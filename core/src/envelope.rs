//! JSON envelopes used by the content and vocabulary resources.
//!
//! Single resources travel as `{"entry": {"content": ...}}`; lists as
//! `{"feed": {"entry": [...]}}`, where each list element is the inner
//! `entry` object without its wrapper.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<T> {
    pub entry: EntryContent<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryContent<T> {
    pub content: T,
}

impl<T> Entry<T> {
    pub fn new(content: T) -> Self {
        Self {
            entry: EntryContent { content },
        }
    }

    pub fn into_content(self) -> T {
        self.entry.content
    }
}

/// Content holding only a `params` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Params<T> {
    #[serde(default)]
    pub params: T,
}

/// A list response. Elements are re-wrapped in `{"entry": ...}` before
/// decoding, so the same DTO type serves single and list responses.
#[derive(Debug, Clone, PartialEq)]
pub struct Feed<T> {
    pub entries: Vec<T>,
}

impl<T: DeserializeOwned> Feed<T> {
    pub fn from_value(value: Value) -> ApiResult<Self> {
        let Value::Object(mut root) = value else {
            return Err(ApiError::DeserializationError(
                "feed response is not an object".to_string(),
            ));
        };
        let feed = match root.remove("feed") {
            Some(Value::Object(feed)) => feed,
            _ => {
                return Err(ApiError::DeserializationError(
                    "missing field `feed`".to_string(),
                ))
            }
        };
        let items = match feed.get("entry") {
            Some(Value::Array(items)) => items.clone(),
            Some(single @ Value::Object(_)) => vec![single.clone()],
            _ => Vec::new(),
        };

        let entries = items
            .into_iter()
            .map(|item| {
                let mut wrapper = Map::new();
                wrapper.insert("entry".to_string(), item);
                serde_json::from_value(Value::Object(wrapper))
                    .map_err(|e| ApiError::DeserializationError(e.to_string()))
            })
            .collect::<ApiResult<Vec<T>>>()?;
        Ok(Self { entries })
    }
}

impl<T> Feed<T> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> IntoIterator for Feed<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
