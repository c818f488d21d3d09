use thiserror::Error;

/// Raised while constructing a detector when its model cannot be used.
///
/// Callers should treat this as fatal to detection only: disable detection and
/// keep the rest of the application running.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model file not found: {0}")]
    NotFound(String),

    #[error("failed to load model {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("ONNX Runtime is unavailable: {0}")]
    Runtime(String),

    #[error("model is incompatible with the detector configuration: {0}")]
    Incompatible(String),

    #[error("invalid detector configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Failure of a single inference call. Recoverable: the frame yields no detections.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("preprocessing failed: {0}")]
    Preprocess(String),

    #[error("inference engine failure: {0}")]
    Engine(#[from] anyhow::Error),

    #[error("unexpected output tensor shape {got:?}, expected [5, {expected}]")]
    OutputShape { expected: usize, got: Vec<usize> },

    #[error("unsupported output tensor shape {0:?}")]
    UnsupportedShape(Vec<usize>),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(String),
}
