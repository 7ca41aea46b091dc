//! Scripted in-process transport for tests
//!
//! Plays back a list of [`FakeStep`]s, one per `send`. When the script runs
//! out the last step repeats.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::client::{ApiResponse, RequestOptions, Transport};
use crate::error::Result;

/// Behaviour of one scripted exchange
#[derive(Debug, Clone)]
pub enum FakeStep {
    /// Return an HTTP response
    Respond(u16, String),
    /// Fail at the transport level
    Fail(String),
    /// Never complete
    Hang,
}

impl FakeStep {
    /// Shorthand for [`FakeStep::Respond`]
    pub fn respond(status: u16, body: &str) -> Self {
        Self::Respond(status, body.to_string())
    }

    /// Shorthand for [`FakeStep::Fail`]
    pub fn fail(message: &str) -> Self {
        Self::Fail(message.to_string())
    }
}

/// Transport replaying a fixed script and recording every request
#[derive(Debug)]
pub struct FakeTransport {
    script: Mutex<VecDeque<FakeStep>>,
    last: Mutex<Option<FakeStep>>,
    requests: Mutex<Vec<(String, RequestOptions)>>,
}

impl FakeTransport {
    /// Play `steps` in order, repeating the final one
    pub fn new(steps: Vec<FakeStep>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer every request with `step`
    pub fn always(step: FakeStep) -> Self {
        Self::new(vec![step])
    }

    /// Number of `send` calls so far
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Every `(url, options)` pair sent so far
    pub fn requests(&self) -> Vec<(String, RequestOptions)> {
        self.requests.lock().unwrap().clone()
    }

    fn next_step(&self) -> FakeStep {
        let mut last = self.last.lock().unwrap();
        if let Some(step) = self.script.lock().unwrap().pop_front() {
            *last = Some(step.clone());
            return step;
        }
        last.clone().unwrap_or(FakeStep::Hang)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<ApiResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        match self.next_step() {
            FakeStep::Respond(status, body) => Ok(ApiResponse::new(status, body)),
            FakeStep::Fail(message) => Err(anyhow::anyhow!(message)),
            FakeStep::Hang => std::future::pending().await,
        }
    }
}
