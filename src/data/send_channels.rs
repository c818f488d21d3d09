use std::time::Duration;
use crossbeam_channel::{bounded, Receiver, Sender};
use crate::common::{Detection, InputFrame};

/// Frames waiting for the worker. One slot: frames are dropped, never queued.
pub const FRAME_CHANNEL_CAPACITY: usize = 1;
/// Results the caller has not collected yet before new ones are dropped.
pub const RESULT_CHANNEL_CAPACITY: usize = 4;

/// Outcome of one processed frame.
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub frame_id: u64,
    pub detections: Vec<Detection>,
    pub elapsed: Duration,
    /// The engine failed on this frame; `detections` is empty.
    pub inference_failed: bool,
}

/// Worker side of the frame channels.
#[derive(Debug)]
pub struct DetectionState {
    pub frame_rx: Receiver<(u64, InputFrame)>,
    pub result_tx: Sender<FrameResult>,
}

/// Caller side of the frame channels.
#[derive(Debug)]
pub struct SendState {
    pub frame_tx: Sender<(u64, InputFrame)>,
    pub result_rx: Receiver<FrameResult>,
}

pub fn frame_channels() -> (SendState, DetectionState) {
    let (frame_tx, frame_rx) = bounded(FRAME_CHANNEL_CAPACITY);
    let (result_tx, result_rx) = bounded(RESULT_CHANNEL_CAPACITY);
    (
        SendState { frame_tx, result_rx },
        DetectionState { frame_rx, result_tx },
    )
}
