//! Transcoding job request.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::encode;
use crate::envelope::{Entry, Params};
use crate::error::{ApiError, ApiResult};

/// Parameters for a new transcoding job.
///
/// Exactly one of `format`/`formatgroup` and exactly one of
/// `src_location`/`import_location` must be set. Use `src_location` when
/// the source already lives on the transcoding server, `import_location`
/// when it still has to be fetched. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRequest {
    #[serde(skip_serializing_if = "is_blank")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub formatgroup: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub src_location: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub import_location: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub input: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub tgt_location: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub startpos: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub endpos: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub client_passthru: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub client_input: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub proc: Option<String>,
    #[serde(skip_serializing_if = "is_blank")]
    pub snapshot_interval: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

impl JobRequest {
    /// Job on a source already uploaded to the transcoding server.
    pub fn from_src(format: impl Into<String>, src_location: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            src_location: Some(src_location.into()),
            ..Self::default()
        }
    }

    /// Job on a source the server has to import first.
    pub fn from_import(format: impl Into<String>, import_location: impl Into<String>) -> Self {
        Self {
            format: Some(format.into()),
            import_location: Some(import_location.into()),
            ..Self::default()
        }
    }

    pub fn with_tgt_location(mut self, tgt_location: impl Into<String>) -> Self {
        self.tgt_location = Some(tgt_location.into());
        self
    }

    pub fn with_range(mut self, startpos: impl Into<String>, endpos: impl Into<String>) -> Self {
        self.startpos = Some(startpos.into());
        self.endpos = Some(endpos.into());
        self
    }

    pub fn with_client_passthru(mut self, passthru: impl Into<String>) -> Self {
        self.client_passthru = Some(passthru.into());
        self
    }

    pub fn validate(&self) -> ApiResult<()> {
        match (is_blank(&self.format), is_blank(&self.formatgroup)) {
            (true, true) => {
                return Err(ApiError::InvalidJob(
                    "a job needs a format or a formatgroup".to_string(),
                ))
            }
            (false, false) => {
                return Err(ApiError::InvalidJob(
                    "format and formatgroup are mutually exclusive".to_string(),
                ))
            }
            _ => {}
        }
        match (is_blank(&self.src_location), is_blank(&self.import_location)) {
            (true, true) => Err(ApiError::InvalidJob(
                "a job needs a src_location or an import_location".to_string(),
            )),
            (false, false) => Err(ApiError::InvalidJob(
                "src_location and import_location are mutually exclusive".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Validate, then wrap the set parameters in the entry envelope.
    pub fn to_entry(&self) -> ApiResult<Value> {
        self.validate()?;
        encode(&Entry::new(Params { params: self }))
    }
}
