//! Deterministic engine returning scripted tensors, for tests and dry runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use crate::common::InferenceError;
use crate::data::{ModelInput, RawDetections};
use crate::detection_runners::InferenceEngine;

/// One scripted reply of a [`StubEngine`].
#[derive(Debug, Clone)]
pub enum StubResponse {
    Detections(RawDetections),
    Failure(String),
}

/// Replays its responses in order, cycling once the script runs out.
#[derive(Debug)]
pub struct StubEngine {
    script: Vec<StubResponse>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
    last_input_shape: Option<Vec<usize>>,
}

impl StubEngine {
    pub fn new(raw: RawDetections) -> Self {
        Self::scripted(vec![StubResponse::Detections(raw)])
    }

    pub fn failing(message: &str) -> Self {
        Self::scripted(vec![StubResponse::Failure(message.to_string())])
    }

    pub fn scripted(script: Vec<StubResponse>) -> Self {
        assert!(!script.is_empty(), "stub engine needs at least one response");
        Self {
            script,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
            last_input_shape: None,
        }
    }

    /// Sleeps this long inside every `infer`, to stand in for a slow model.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared counter of `infer` calls, readable after the engine moved away.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }

    /// Shared counter incremented when the engine is dropped.
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input_shape(&self) -> Option<&[usize]> {
        self.last_input_shape.as_deref()
    }
}

impl InferenceEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn infer(&mut self, input: &ModelInput) -> Result<RawDetections, InferenceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_input_shape = Some(input.shape().to_vec());

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        match &self.script[call % self.script.len()] {
            StubResponse::Detections(raw) => Ok(raw.clone()),
            StubResponse::Failure(message) => Err(InferenceError::Engine(anyhow::anyhow!("{}", message))),
        }
    }

    fn warm_up(&mut self, _input: &ModelInput) -> Result<(), InferenceError> {
        Ok(())
    }
}

impl Drop for StubEngine {
    fn drop(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
