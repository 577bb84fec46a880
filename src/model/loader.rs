use crate::error::InferenceError;
use crate::model::Classifier;
use ndarray::{Array4, ArrayViewD, Axis};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

// Name the global ORT environment (only needed once, before any session)
pub fn init_ort() {
    // Ok(false) means an environment already exists, which is fine
    if let Err(e) = ort::init().with_name("reptile-classifier").commit() {
        tracing::warn!(error = %e, "Failed to configure the ONNX Runtime environment");
    }
}

/// ONNX Runtime backed classifier.
pub struct OnnxClassifier {
    // `Session::run` needs exclusive access
    session: Mutex<Session>,
    input_name: String,
}

impl OnnxClassifier {
    /// Loads an ONNX model from disk and creates an inference session.
    ///
    /// # Arguments
    /// * `model_path` - Path to the .onnx file
    /// * `intra_threads` - Parallelism within a single operator
    pub fn load(model_path: impl AsRef<Path>, intra_threads: usize) -> Result<Self, InferenceError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(InferenceError::ModelNotFound(path.display().to_string()));
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(path)?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| InferenceError::Internal("model declares no inputs".to_string()))?;

        tracing::info!(path = %path.display(), "Loaded model");
        for (i, input) in session.inputs.iter().enumerate() {
            tracing::info!("  Input {}: {} ({:?})", i, input.name, input.input_type);
        }

        Ok(Self {
            session: Mutex::new(session),
            input_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError> {
        let shape = input.shape().to_vec();
        let (data, _) = input.into_raw_vec_and_offset();
        let input_value = Tensor::from_array((shape, data.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| InferenceError::Internal("session lock poisoned".to_string()))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input_value])?;

        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
        let output = ArrayViewD::from_shape(dims.as_slice(), data)?;

        Ok(scores_from_output(output))
    }
}

/// Scores of the single batch item: a leading batch axis is stripped when the
/// output has rank 2 or more, a rank-1 output is used as-is.
pub fn scores_from_output(output: ArrayViewD<f32>) -> Vec<f32> {
    if output.ndim() > 1 {
        output.index_axis(Axis(0), 0).iter().copied().collect()
    } else {
        output.iter().copied().collect()
    }
}
