//! Vocabulary DTO.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::client::{decode, encode};
use crate::envelope::{Entry, Params};
use crate::error::ApiResult;
use crate::lenient;

/// A metadata vocabulary: a named XML namespace that `MetaObject`s refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    pub name: String,
    pub description: String,
    pub xml_namespace: String,
}

impl Vocabulary {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        xml_namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            xml_namespace: xml_namespace.into(),
        }
    }

    pub fn from_entry(value: Value) -> ApiResult<Self> {
        decode(value)
    }

    /// All three fields are always written.
    pub fn to_entry(&self) -> ApiResult<Value> {
        encode(self)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VocabParams {
    #[serde(default, deserialize_with = "lenient::string")]
    name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    description: String,
    #[serde(default, deserialize_with = "lenient::string")]
    xml_namespace: String,
}

impl Serialize for Vocabulary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let params = VocabParams {
            name: self.name.clone(),
            description: self.description.clone(),
            xml_namespace: self.xml_namespace.clone(),
        };
        Entry::new(Params { params }).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Vocabulary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let params = Entry::<Params<VocabParams>>::deserialize(deserializer)?
            .into_content()
            .params;
        Ok(Vocabulary {
            name: params.name,
            description: params.description,
            xml_namespace: params.xml_namespace,
        })
    }
}
