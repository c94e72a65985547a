use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use super::{ApiRequest, CrmApi};
use crate::error::ApiError;

type Responder = Box<dyn Fn(&ApiRequest) -> Result<Option<Value>, ApiError> + Send + Sync>;

/// Answers every request from a closure and remembers what was asked.
pub(crate) struct ScriptedApi {
    requests: Mutex<Vec<ApiRequest>>,
    responder: Responder,
}

impl ScriptedApi {
    pub(crate) fn new<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<Option<Value>, ApiError> + Send + Sync + 'static,
    {
        Self {
            requests: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn calls(&self, method: Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl CrmApi for ScriptedApi {
    async fn send(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        let response = (self.responder)(&request);
        self.requests.lock().unwrap().push(request);
        response
    }
}

pub(crate) fn server_error() -> ApiError {
    ApiError::Status {
        status: 500,
        body: "Internal Server Error".to_string(),
    }
}
