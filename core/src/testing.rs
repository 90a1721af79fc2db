//! Transport double shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::config::ServiceConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Replays canned responses in order and records every request it sees.
#[derive(Default)]
pub(crate) struct RecordingTransport {
    responses: RefCell<VecDeque<ApiResult<HttpResponse>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond(self, status: u16, body: &str) -> Self {
        self.responses.borrow_mut().push_back(Ok(response(status, body)));
        self
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(ApiError::Transport(message.to_string())));
        self
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub(crate) fn last(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for RecordingTransport {
    fn execute(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
        self.requests.borrow_mut().push(request.clone());
        self.responses
            .borrow_mut()
            .pop_front()
            .expect("no canned response left")
    }
}

pub(crate) fn response(status: u16, body: &str) -> HttpResponse {
    let reason = match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        302 => "Found",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Internal Server Error",
    };
    HttpResponse {
        status,
        reason: reason.to_string(),
        headers: Vec::new(),
        body: body.to_string(),
    }
}

pub(crate) fn config() -> ServiceConfig {
    ServiceConfig::new("joe", "secret", "raws.example.com", false)
}

pub(crate) fn body_json(request: &HttpRequest) -> serde_json::Value {
    serde_json::from_slice(request.body.as_deref().expect("request has no body")).unwrap()
}
