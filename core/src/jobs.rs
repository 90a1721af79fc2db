//! Facade for the transcoding service (RATS).

use std::path::Path;

use serde_json::Value;

use crate::client::RawsClient;
use crate::config::ServiceConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{Transport, UreqTransport};
use crate::job::JobRequest;
use crate::media::MediaSource;

#[derive(Debug, Clone)]
pub struct JobService<T = UreqTransport> {
    client: RawsClient<T>,
}

impl JobService<UreqTransport> {
    pub fn connect(config: ServiceConfig) -> Self {
        Self::new(RawsClient::connect(config))
    }
}

impl<T: Transport> JobService<T> {
    pub fn new(client: RawsClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RawsClient<T> {
        &self.client
    }

    /// Delete any resource by URI.
    pub fn delete(&self, uri: &str) -> ApiResult<bool> {
        self.client.delete(uri, &[])
    }

    /// Upload a source file, stored on the server as `filename`.
    pub fn create_src(&self, filename: &str, local_path: impl AsRef<Path>) -> ApiResult<Value> {
        let media = MediaSource::from_path(local_path, filename)?;
        self.client.put(None, "/src/", &[], Some(&media))
    }

    /// Validate `job` locally, then POST it to `/job/`. An invalid job fails
    /// with `ApiError::InvalidJob` without any request being sent.
    pub fn create_job(&self, job: &JobRequest) -> ApiResult<Value> {
        let entry = job.to_entry()?;
        self.client.post(Some(&entry), "/job/", &[], None)
    }

    /// Fetch a job by its relative or absolute URI.
    pub fn get_job(&self, uri: &str) -> ApiResult<Value> {
        if uri.trim().is_empty() {
            return Err(ApiError::MissingUri("get_job"));
        }
        self.client.get(uri, &[])
    }
}
