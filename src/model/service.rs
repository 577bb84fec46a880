use crate::error::InferenceError;
use crate::model::Classifier;
use crate::preprocessing::image::process_bytes;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Prediction {
    #[serde(rename = "class")]
    pub label: String,
    pub confidence: f32,
}

/// Owns the classifier handle together with the labels its output is aligned to.
///
/// A service without a classifier is in degraded mode: construction succeeds so
/// the server can still answer health checks, but every classification fails.
pub struct ClassifierService {
    classifier: Option<Arc<dyn Classifier>>,
    labels: Arc<[String]>,
    input_size: u32,
}

impl ClassifierService {
    pub fn new(classifier: Arc<dyn Classifier>, labels: Vec<String>, input_size: u32) -> Self {
        Self {
            classifier: Some(classifier),
            labels: labels.into(),
            input_size,
        }
    }

    pub fn degraded(labels: Vec<String>, input_size: u32) -> Self {
        Self {
            classifier: None,
            labels: labels.into(),
            input_size,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Decode, resize, infer and rank. CPU bound; call from a blocking context.
    pub fn classify(&self, image_bytes: &[u8]) -> Result<Vec<Prediction>, InferenceError> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or(InferenceError::ModelNotLoaded)?;

        let input_tensor = process_bytes(image_bytes, self.input_size)?;
        let scores = classifier.predict(input_tensor)?;

        rank(&self.labels, &scores)
    }
}

/// Pairs scores with labels by position and sorts by descending confidence.
/// Equal scores keep label order.
pub fn rank(labels: &[String], scores: &[f32]) -> Result<Vec<Prediction>, InferenceError> {
    if labels.len() != scores.len() {
        return Err(InferenceError::OutputMismatch {
            expected: labels.len(),
            got: scores.len(),
        });
    }

    let mut predictions: Vec<Prediction> = labels
        .iter()
        .zip(scores)
        .map(|(label, &confidence)| Prediction {
            label: label.clone(),
            confidence,
        })
        .collect();
    predictions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    Ok(predictions)
}
