//! Single-worker frame pump between a camera feed and a [`Detector`].
//!
//! At most one frame is in flight. Frames arriving while the worker is busy
//! are dropped on the spot, so latency and memory stay bounded no matter how
//! fast the camera delivers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use crate::common::InputFrame;
use crate::data::send_channels::{frame_channels, DetectionState, SendState};
use crate::data::FrameResult;
use crate::detection_runners::InferenceEngine;
use crate::detectors::Detector;

/// What happened to a submitted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Handed to the worker under this frame id.
    Accepted(u64),
    /// Not one of the frames selected by the frame-skip pacing.
    Skipped,
    /// The worker was busy or gone.
    Dropped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub submitted: u64,
    pub skipped: u64,
    pub dropped: u64,
    pub processed: u64,
    pub failed: u64,
}

pub struct FrameWorker {
    frame_tx: Option<Sender<(u64, InputFrame)>>,
    result_rx: Receiver<FrameResult>,
    busy: Arc<AtomicBool>,
    stats: Arc<Mutex<FrameStats>>,
    frame_skip: u32,
    frame_counter: u64,
    handle: Option<JoinHandle<()>>,
}

impl FrameWorker {
    /// Moves `detector` onto its own thread.
    pub fn spawn<E>(detector: Detector<E>) -> Self
    where
        E: InferenceEngine + 'static,
    {
        let frame_skip = detector.config().frame_skip;
        let (SendState { frame_tx, result_rx }, state) = frame_channels();
        let busy = Arc::new(AtomicBool::new(false));
        let stats = Arc::new(Mutex::new(FrameStats::default()));

        let handle = {
            let busy = Arc::clone(&busy);
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || detection_loop(detector, state, busy, stats))
        };

        Self {
            frame_tx: Some(frame_tx),
            result_rx,
            busy,
            stats,
            frame_skip,
            frame_counter: 0,
            handle: Some(handle),
        }
    }

    /// Offers a frame to the worker without ever blocking.
    ///
    /// Frames are numbered from 1 and every `(frame_skip + 1)`-th one is
    /// offered, so the default pacing runs frames 3, 6, 9 and so on.
    pub fn submit(&mut self, frame: InputFrame) -> SubmitOutcome {
        self.frame_counter += 1;
        let frame_id = self.frame_counter;
        self.stats.lock().submitted += 1;

        if frame_id % (self.frame_skip as u64 + 1) != 0 {
            self.stats.lock().skipped += 1;
            return SubmitOutcome::Skipped;
        }

        if self.busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
            self.stats.lock().dropped += 1;
            return SubmitOutcome::Dropped;
        }

        let sent = match &self.frame_tx {
            Some(tx) => match tx.try_send((frame_id, frame)) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
            },
            None => false,
        };

        if sent {
            SubmitOutcome::Accepted(frame_id)
        } else {
            self.busy.store(false, Ordering::Release);
            self.stats.lock().dropped += 1;
            SubmitOutcome::Dropped
        }
    }

    /// True while a frame is being processed.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn try_recv(&self) -> Option<FrameResult> {
        self.result_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<FrameResult> {
        self.result_rx.recv_timeout(timeout).ok()
    }

    pub fn results(&self) -> &Receiver<FrameResult> {
        &self.result_rx
    }

    pub fn stats(&self) -> FrameStats {
        *self.stats.lock()
    }

    /// Stops the worker and releases its detector.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        // closing the frame channel ends the loop
        self.frame_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Detection worker panicked");
            }
        }
    }
}

impl Drop for FrameWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn detection_loop<E: InferenceEngine>(
    mut detector: Detector<E>,
    state: DetectionState,
    busy: Arc<AtomicBool>,
    stats: Arc<Mutex<FrameStats>>,
) {
    log::debug!("Detection worker started");

    // MESSAGE LOOP STARTS HERE
    while let Ok((frame_id, frame)) = state.frame_rx.recv() {
        let now = Instant::now();
        let outcome = detector.detect_checked(&frame);
        drop(frame);

        let (detections, inference_failed) = match outcome {
            Ok(detections) => (detections, false),
            Err(err) => {
                log::error!("Frame {}: inference error: {}", frame_id, err);
                (vec![], true)
            }
        };

        {
            let mut stats = stats.lock();
            stats.processed += 1;
            if inference_failed {
                stats.failed += 1;
            }
        }
        busy.store(false, Ordering::Release);

        let result = FrameResult {
            frame_id,
            detections,
            elapsed: now.elapsed(),
            inference_failed,
        };
        match state.result_tx.try_send(result) {
            Ok(()) => {}
            Err(TrySendError::Full(result)) => {
                log::warn!("Result of frame {} dropped, receiver is not keeping up", result.frame_id);
            }
            Err(TrySendError::Disconnected(_)) => break,
        }
    }

    log::debug!("Detection worker stopped");
    detector.release();
}
