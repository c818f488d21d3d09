//! ONNX Runtime backend.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use anyhow::Result;
use half::f16;
use ndarray::ArrayD;
use ort::{
    execution_providers::{
        CoreMLExecutionProvider, CUDAExecutionProvider, ExecutionProvider,
        ExecutionProviderDispatch, TensorRTExecutionProvider,
    },
    session::builder::{GraphOptimizationLevel, SessionBuilder},
    session::Session,
};
use crate::common::{DetectorConfig, InferenceDevice, InferenceError, ModelLoadError};
use crate::data::{ModelInput, RawDetections, CANDIDATE_FIELDS};
use crate::detection_runners::InferenceEngine;

/// ONNXRuntime Backend
#[derive(Debug)]
pub struct OrtEngine {
    session: Session,
    device: InferenceDevice,
    input_name: String,
    output_name: String,
    num_detections: usize,
}

impl OrtEngine {
    /// Loads the model at `config.model_path` and checks it against the config.
    pub fn load(config: &DetectorConfig) -> Result<Self, ModelLoadError> {
        if !Path::new(&config.model_path).is_file() {
            return Err(ModelLoadError::NotFound(config.model_path.clone()));
        }

        if let Some(lib_path) = &config.ort_lib_path {
            if !Path::new(lib_path).is_file() {
                return Err(ModelLoadError::NotFound(lib_path.clone()));
            }
        }

        // ort panics when the runtime library cannot be dlopen'ed
        let (session, device) = panic::catch_unwind(AssertUnwindSafe(|| Self::init_session(config)))
            .map_err(|payload| ModelLoadError::Runtime(panic_message(payload.as_ref())))?
            .map_err(|source| ModelLoadError::Malformed {
                path: config.model_path.clone(),
                source,
            })?;

        let input_name = session.inputs.first()
            .map(|x| x.name.clone())
            .ok_or_else(|| ModelLoadError::Incompatible("model has no inputs".to_string()))?;
        let output_name = session.outputs.first()
            .map(|x| x.name.clone())
            .ok_or_else(|| ModelLoadError::Incompatible("model has no outputs".to_string()))?;

        if let Some(dims) = session.inputs[0].input_type.tensor_dimensions() {
            let expected = config.input_layout.shape(config.input_size as usize);
            if !dims_match(&expected, dims) {
                return Err(ModelLoadError::Incompatible(format!(
                    "input `{}` has shape {:?}, configured for {:?}", input_name, dims, expected
                )));
            }
        }

        if let Some(dims) = session.outputs[0].output_type.tensor_dimensions() {
            let n = config.num_detections;
            let accepted = [
                vec![1, CANDIDATE_FIELDS, n],
                vec![CANDIDATE_FIELDS, n],
                vec![1, n, CANDIDATE_FIELDS],
                vec![n, CANDIDATE_FIELDS],
            ];
            if !accepted.iter().any(|expected| dims_match(expected, dims)) {
                return Err(ModelLoadError::Incompatible(format!(
                    "output `{}` has shape {:?}, configured for [1, {}, {}]", output_name, dims, CANDIDATE_FIELDS, n
                )));
            }
        }

        log::info!(
            "Backend: ONNXRuntime | Device: {} | Input: {} {:?} | Output: {}",
            device, input_name, config.input_layout, output_name,
        );

        Ok(Self {
            session,
            device,
            input_name,
            output_name,
            num_detections: config.num_detections,
        })
    }

    fn init_session(config: &DetectorConfig) -> Result<(Session, InferenceDevice)> {
        if let Some(lib_path) = &config.ort_lib_path {
            ort::init_from(lib_path)
                .commit()
                .map_err(|e| anyhow::anyhow!("failed to commit ONNX Runtime library {lib_path}: {e}"))?;
        }
        Self::build_session(config)
    }

    fn build_session(config: &DetectorConfig) -> Result<(Session, InferenceDevice)> {
        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.num_threads)?;

        let mut device = config.device;
        match device {
            InferenceDevice::TensorRT(device_id) => {
                let ep = TensorRTExecutionProvider::default()
                    .with_device_id(device_id as i32)
                    .with_engine_cache(true);
                if !ep.is_available()? {
                    anyhow::bail!("TensorRT execution provider is not available");
                }
                log::info!("Initial model serialization with TensorRT may take some time...");
                builder = builder.with_execution_providers([ep.build()])?;
            }
            InferenceDevice::CUDA(device_id) => {
                let ep = CUDAExecutionProvider::default().with_device_id(device_id as i32);
                builder = Self::register_or_cpu(builder, ep, &mut device)?;
            }
            InferenceDevice::CoreML => {
                builder = Self::register_or_cpu(builder, CoreMLExecutionProvider::default(), &mut device)?;
            }
            InferenceDevice::CPU => {}
        }

        let session = builder.commit_from_file(&config.model_path)?;
        Ok((session, device))
    }

    /// Registers `ep` when the runtime supports it, otherwise stays on CPU.
    fn register_or_cpu<EP>(builder: SessionBuilder, ep: EP, device: &mut InferenceDevice) -> Result<SessionBuilder>
    where
        EP: ExecutionProvider + Into<ExecutionProviderDispatch>,
    {
        match ep.is_available() {
            Ok(true) => {
                let dispatch: ExecutionProviderDispatch = ep.into();
                Ok(builder.with_execution_providers([dispatch])?)
            }
            Ok(false) => {
                log::warn!("{} execution provider is not available, Using cpu", device.str());
                *device = InferenceDevice::CPU;
                Ok(builder)
            }
            Err(err) => {
                log::warn!("{err}, Using cpu");
                *device = InferenceDevice::CPU;
                Ok(builder)
            }
        }
    }

    fn run(&self, input: &ModelInput) -> Result<ArrayD<f32>> {
        let outputs = self.session.run(ort::inputs![self.input_name.as_str() => input.view()]?)?;
        let output = &outputs[self.output_name.as_str()];

        // fp16 exports hand back half floats
        let xs = match output.try_extract_tensor::<f32>() {
            Ok(x) => x.into_owned(),
            Err(_) => output.try_extract_tensor::<f16>()?.mapv(f16::to_f32),
        };
        Ok(xs)
    }

    pub fn device(&self) -> InferenceDevice {
        self.device
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Releases the model. Equivalent to dropping the engine.
    pub fn release(self) {}
}

impl InferenceEngine for OrtEngine {
    fn name(&self) -> &'static str {
        "onnxruntime"
    }

    fn infer(&mut self, input: &ModelInput) -> Result<RawDetections, InferenceError> {
        let raw = RawDetections::from_output(self.run(input)?)?;
        if raw.num_candidates() != self.num_detections {
            return Err(InferenceError::OutputShape {
                expected: self.num_detections,
                got: vec![CANDIDATE_FIELDS, raw.num_candidates()],
            });
        }
        Ok(raw)
    }
}

impl Drop for OrtEngine {
    fn drop(&mut self) {
        log::debug!("Releasing ONNXRuntime session ({})", self.device);
    }
}

/// Static dims must equal `expected`; dynamic (negative) dims match anything.
fn dims_match(expected: &[usize], got: &[i64]) -> bool {
    expected.len() == got.len()
        && expected.iter().zip(got).all(|(&e, &g)| g < 0 || g as usize == e)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| payload.downcast_ref::<&str>().map(|x| x.to_string()))
        .unwrap_or_else(|| "runtime initialization panicked".to_string())
}
