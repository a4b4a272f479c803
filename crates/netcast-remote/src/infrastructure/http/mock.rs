//! Mock TV transport for unit and integration testing.
//!
//! # Why a mock transport?
//!
//! The real transport talks to a television on the local network, which a
//! test machine does not have.  The `MockTvTransport` replaces the HTTP
//! calls with in-memory recording: every request is pushed into a
//! `Mutex<Vec<...>>` so assertions can inspect exactly what was sent and in
//! what order, and responses are scripted per call.
//!
//! # Scripting responses
//!
//! Each call pops the front of a per-method queue.  When the queue is empty
//! the configured default answer is used; with no default either, the call
//! fails like an unplugged cable.  This makes both finite scenarios ("three
//! timeouts, then a 200") and steady states ("every probe succeeds") easy to
//! express:
//!
//! ```ignore
//! let transport = MockTvTransport::new();
//! transport.enqueue_post(Err(TransportError::Timeout));
//! transport.enqueue_post(Ok(200));
//! transport.set_get_default(Ok(200)); // heartbeats succeed forever
//! ```

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::connection::{TransportError, TvTransport};

/// One request observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub ip: String,
    pub path: String,
    pub token: Option<String>,
    /// `None` for GETs; the XML document for POSTs.
    pub body: Option<String>,
}

/// A transport that records all requests without performing network I/O.
#[derive(Default)]
pub struct MockTvTransport {
    /// Every POST observed, in order.
    pub posts: Mutex<Vec<RecordedRequest>>,
    /// Every GET observed, in order.
    pub gets: Mutex<Vec<RecordedRequest>>,
    post_script: Mutex<VecDeque<Result<u16, TransportError>>>,
    get_script: Mutex<VecDeque<Result<u16, TransportError>>>,
    post_default: Mutex<Option<Result<u16, TransportError>>>,
    get_default: Mutex<Option<Result<u16, TransportError>>>,
}

impl MockTvTransport {
    /// Creates a mock with empty records and no scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the response for the next unscripted POST.
    pub fn enqueue_post(&self, response: Result<u16, TransportError>) {
        self.post_script.lock().unwrap().push_back(response);
    }

    /// Scripts the response for the next unscripted GET.
    pub fn enqueue_get(&self, response: Result<u16, TransportError>) {
        self.get_script.lock().unwrap().push_back(response);
    }

    /// Sets the answer used by POSTs once the script queue is drained.
    pub fn set_post_default(&self, response: Result<u16, TransportError>) {
        *self.post_default.lock().unwrap() = Some(response);
    }

    /// Sets the answer used by GETs once the script queue is drained.
    pub fn set_get_default(&self, response: Result<u16, TransportError>) {
        *self.get_default.lock().unwrap() = Some(response);
    }

    /// Number of POSTs observed so far.
    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    /// Number of GETs observed so far.
    pub fn get_count(&self) -> usize {
        self.gets.lock().unwrap().len()
    }

    fn answer(
        script: &Mutex<VecDeque<Result<u16, TransportError>>>,
        default: &Mutex<Option<Result<u16, TransportError>>>,
    ) -> Result<u16, TransportError> {
        if let Some(scripted) = script.lock().unwrap().pop_front() {
            return scripted;
        }
        default
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(TransportError::Connect("no scripted response".to_string())))
    }
}

#[async_trait]
impl TvTransport for MockTvTransport {
    async fn post(
        &self,
        ip: &str,
        path: &str,
        token: Option<&str>,
        body: String,
        _timeout: Duration,
    ) -> Result<u16, TransportError> {
        self.posts.lock().unwrap().push(RecordedRequest {
            ip: ip.to_string(),
            path: path.to_string(),
            token: token.map(str::to_string),
            body: Some(body),
        });
        Self::answer(&self.post_script, &self.post_default)
    }

    async fn get(
        &self,
        ip: &str,
        path: &str,
        token: Option<&str>,
        _timeout: Duration,
    ) -> Result<u16, TransportError> {
        self.gets.lock().unwrap().push(RecordedRequest {
            ip: ip.to_string(),
            path: path.to_string(),
            token: token.map(str::to_string),
            body: None,
        });
        Self::answer(&self.get_script, &self.get_default)
    }
}
