//! In-memory transport for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::progress::ProgressSink;
use crate::transport::{ApiResponse, Transport};

enum Scripted {
    Ok(ApiResponse),
    Fail(u16),
    Panic,
}

/// Maps request paths to canned responses. Unscripted paths answer 404.
#[derive(Default)]
pub struct FakeTransport {
    routes: HashMap<String, Scripted>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, path: &str, body: Value) -> Self {
        self.routes.insert(
            path.to_string(),
            Scripted::Ok(ApiResponse {
                status: 200,
                location: None,
                body,
            }),
        );
        self
    }

    pub fn redirect(mut self, path: &str, location: &str) -> Self {
        self.routes.insert(
            path.to_string(),
            Scripted::Ok(ApiResponse {
                status: 303,
                location: Some(location.to_string()),
                body: Value::Null,
            }),
        );
        self
    }

    pub fn fail(mut self, path: &str, status: u16) -> Self {
        self.routes.insert(path.to_string(), Scripted::Fail(status));
        self
    }

    pub fn panic(mut self, path: &str) -> Self {
        self.routes.insert(path.to_string(), Scripted::Panic);
        self
    }

    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        self.delays.insert(path.to_string(), delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str) -> Result<ApiResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(path) {
            tokio::time::sleep(*delay).await;
        }
        match self.routes.get(path) {
            Some(Scripted::Ok(response)) => Ok(response.clone()),
            Some(Scripted::Fail(status)) => Err(TransportError::Status {
                status: *status,
                path: path.to_string(),
            }),
            Some(Scripted::Panic) => panic!("scripted panic for {}", path),
            None => Err(TransportError::Status {
                status: 404,
                path: path.to_string(),
            }),
        }
    }
}

/// Records every progress callback.
#[derive(Default)]
pub struct RecordingSink {
    pub totals: Mutex<Vec<usize>>,
    pub ticks: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn ticks(&self) -> usize {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn totals(&self) -> Vec<usize> {
        self.totals.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

impl ProgressSink for RecordingSink {
    fn on_total(&self, total: usize) {
        if let Ok(mut totals) = self.totals.lock() {
            totals.push(total);
        }
    }

    fn on_progress(&self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }
}
