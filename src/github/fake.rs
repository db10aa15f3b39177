//! In-memory [`Source`] serving canned responses by exact path.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use super::Source;
use crate::error::ApiError;

#[derive(Default)]
pub struct FakeSource {
    routes: HashMap<String, Result<Value, u16>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `path`.
    pub fn with(mut self, path: impl Into<String>, body: Value) -> Self {
        self.routes.insert(path.into(), Ok(body));
        self
    }

    /// Answer `path` with an HTTP failure.
    pub fn failing(mut self, path: impl Into<String>, status: u16) -> Self {
        self.routes.insert(path.into(), Err(status));
        self
    }

    /// Paths requested so far, in request order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Source for FakeSource {
    fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.calls.lock().unwrap().push(path.to_string());
        match self.routes.get(path) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ApiError::Status {
                status: *status,
                path: path.to_string(),
            }),
            None => Err(ApiError::Status {
                status: 404,
                path: path.to_string(),
            }),
        }
    }
}
