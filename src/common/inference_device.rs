use serde::{Deserialize, Serialize};

/// Execution provider the ONNX Runtime session should run on.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum InferenceDevice {
    #[default] CPU,
    CUDA(usize),
    TensorRT(usize),
    CoreML,
}

// Hardcoded device names. Storing the "proper" spelling and the lowercase version.
const CPU: [&str; 2] = ["CPU", "cpu"];
const CUDA: [&str; 2] = ["CUDA", "cuda"];
const TENSOR_RT: [&str; 2] = ["TensorRT", "tensorrt"];
const CORE_ML: [&str; 2] = ["CoreML", "coreml"];

impl InferenceDevice {
    pub fn from_str(device: &str, device_id: usize) -> Option<Self> {
        match device.to_lowercase().as_str() {
            "cpu" => Some(InferenceDevice::CPU),
            "cuda" => Some(InferenceDevice::CUDA(device_id)),
            "tensorrt" => Some(InferenceDevice::TensorRT(device_id)),
            "coreml" => Some(InferenceDevice::CoreML),
            _ => None,
        }
    }

    pub fn str(&self) -> &'static str {
        self.names()[0]
    }

    pub fn str_lowercase(&self) -> &'static str {
        self.names()[1]
    }

    fn names(&self) -> &'static [&'static str; 2] {
        match self {
            InferenceDevice::CPU => &CPU,
            InferenceDevice::CUDA(_) => &CUDA,
            InferenceDevice::TensorRT(_) => &TENSOR_RT,
            InferenceDevice::CoreML => &CORE_ML,
        }
    }
}

impl std::fmt::Display for InferenceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceDevice::CUDA(id) | InferenceDevice::TensorRT(id) => write!(f, "{}:{}", self.str(), id),
            _ => f.write_str(self.str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(InferenceDevice::from_str("CUDA", 1), Some(InferenceDevice::CUDA(1)));
        assert_eq!(InferenceDevice::from_str("TensorRT", 0), Some(InferenceDevice::TensorRT(0)));
        assert_eq!(InferenceDevice::from_str("cpu", 3), Some(InferenceDevice::CPU));
        assert_eq!(InferenceDevice::from_str("npu", 0), None);
    }

    #[test]
    fn display_includes_device_id() {
        assert_eq!(InferenceDevice::CUDA(2).to_string(), "CUDA:2");
        assert_eq!(InferenceDevice::CoreML.to_string(), "CoreML");
        assert_eq!(InferenceDevice::CPU.str_lowercase(), "cpu");
    }
}
