use crate::common::InferenceError;
use crate::data::{ModelInput, RawDetections};

/// An object-detection model behind a narrow interface.
///
/// `infer` takes `&mut self`: one engine instance runs at most one inference
/// at a time. Share an engine across threads by moving it into a single
/// worker (see `FrameWorker`), never by cloning handles to it.
///
/// Dropping the engine releases the model.
pub trait InferenceEngine: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Runs the model on one preprocessed image.
    fn infer(&mut self, input: &ModelInput) -> Result<RawDetections, InferenceError>;

    /// Optional warm-up hook, run once before the first real frame.
    fn warm_up(&mut self, input: &ModelInput) -> Result<(), InferenceError> {
        self.infer(input).map(|_| ())
    }
}

impl<E: InferenceEngine + ?Sized> InferenceEngine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn infer(&mut self, input: &ModelInput) -> Result<RawDetections, InferenceError> {
        (**self).infer(input)
    }

    fn warm_up(&mut self, input: &ModelInput) -> Result<(), InferenceError> {
        (**self).warm_up(input)
    }
}
