//! Shared producer stubs for integration tests

#![allow(dead_code)]

use crossbeam_channel::Receiver;
use image::RgbaImage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use vista_stream::{ContentProducer, ContentRequest, GenerationError};

/// Counts invocations and can be switched to fail
#[derive(Clone, Default)]
pub struct RecordingProducer {
    calls: Arc<AtomicUsize>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    requests: Arc<Mutex<Vec<String>>>,
    gate: Option<Receiver<()>>,
}

impl RecordingProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call waits for one message on `gate` before finishing
    pub fn gated(gate: Receiver<()>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneously running calls seen
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

#[async_trait::async_trait]
impl ContentProducer for RecordingProducer {
    async fn generate(
        &self,
        request: &ContentRequest,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.to_string());
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            let _ = gate.recv_timeout(Duration::from_secs(5));
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(GenerationError::Backend("stub failure".to_string()));
        }
        Ok(RgbaImage::new(width, height))
    }

    fn name(&self) -> &str {
        "recording"
    }
}
