use crate::error::InferenceError;
use crate::models::{EncodedFeatureVector, PredictionResult};

/// Anything that maps one feature vector to a class in {0, 1}.
pub trait Classifier {
    fn predict(&self, features: &[f64]) -> Result<u8, InferenceError>;
}

/// Runs the classifier once and maps its class to a label.
pub fn predict_churn<C: Classifier + ?Sized>(
    classifier: &C,
    vector: &EncodedFeatureVector,
) -> Result<PredictionResult, InferenceError> {
    match classifier.predict(vector.as_slice())? {
        1 => Ok(PredictionResult::Churn),
        0 => Ok(PredictionResult::Stay),
        other => Err(InferenceError::InvalidClass(other)),
    }
}
