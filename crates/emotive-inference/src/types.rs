//! Core types for the emotion inference pipeline.

use serde::Serialize;

/// Number of MFCC coefficients the model consumes. Fixed by training.
pub const N_MFCC: usize = 40;

/// Number of emotion classes the model scores. Fixed by training.
pub const N_EMOTIONS: usize = 7;

/// The seven emotion classes, in model output order.
///
/// The discriminant order is an external contract: index `i` of the model's
/// score vector corresponds to `EmotionLabel::ALL[i]`, matching the label
/// order used when the classifier was trained. Do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    /// Anger.
    Angry,
    /// Disgust.
    Disgust,
    /// Fear.
    Fear,
    /// Happiness.
    Happy,
    /// Neutral affect.
    Neutral,
    /// Surprise.
    Surprise,
    /// Sadness.
    Sad,
}

impl EmotionLabel {
    /// All labels in model output order.
    pub const ALL: [EmotionLabel; N_EMOTIONS] = [
        EmotionLabel::Angry,
        EmotionLabel::Disgust,
        EmotionLabel::Fear,
        EmotionLabel::Happy,
        EmotionLabel::Neutral,
        EmotionLabel::Surprise,
        EmotionLabel::Sad,
    ];

    /// Label for a model output index, or `None` if out of range.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The lowercase string tag for this label.
    pub fn as_str(self) -> &'static str {
        match self {
            EmotionLabel::Angry => "angry",
            EmotionLabel::Disgust => "disgust",
            EmotionLabel::Fear => "fear",
            EmotionLabel::Happy => "happy",
            EmotionLabel::Neutral => "neutral",
            EmotionLabel::Surprise => "surprise",
            EmotionLabel::Sad => "sad",
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A time-averaged MFCC feature vector — always exactly [`N_MFCC`] values.
///
/// Conceptually a 40×1 column; the model implementation batches it into the
/// 1×40×1 shape the classifier expects. Produced once per request and
/// consumed once.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector([f32; N_MFCC]);

impl FeatureVector {
    /// Wrap a raw coefficient array.
    pub fn new(coefficients: [f32; N_MFCC]) -> Self {
        Self(coefficients)
    }

    /// The coefficients as a slice (length [`N_MFCC`]).
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

/// Errors that can occur in the inference pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EmotionError {
    /// Audio decoding failure (unreadable, empty, or unrecognized input).
    #[error("audio decode error: {0}")]
    Decode(String),

    /// Feature extraction failure (malformed numeric input).
    #[error("feature extraction error: {0}")]
    Feature(String),

    /// Model artifact missing or corrupt. Fatal: no inference is possible.
    #[error("model load error: {0}")]
    ModelLoad(String),

    /// Any other failure while running the classifier.
    #[error("inference error: {0}")]
    Inference(String),
}

/// Extension trait to reduce `.map_err()` boilerplate when wrapping errors
/// into [`EmotionError`].
pub trait ResultExt<T> {
    /// Wrap the error as [`EmotionError::Decode`] with `context` prefix.
    fn decode_err(self, context: &str) -> Result<T, EmotionError>;
    /// Wrap the error as [`EmotionError::Feature`] with `context` prefix.
    fn feature_err(self, context: &str) -> Result<T, EmotionError>;
    /// Wrap the error as [`EmotionError::ModelLoad`] with `context` prefix.
    fn model_load_err(self, context: &str) -> Result<T, EmotionError>;
    /// Wrap the error as [`EmotionError::Inference`] with `context` prefix.
    fn inference_err(self, context: &str) -> Result<T, EmotionError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn decode_err(self, context: &str) -> Result<T, EmotionError> {
        self.map_err(|e| EmotionError::Decode(format!("{context}: {e}")))
    }
    fn feature_err(self, context: &str) -> Result<T, EmotionError> {
        self.map_err(|e| EmotionError::Feature(format!("{context}: {e}")))
    }
    fn model_load_err(self, context: &str) -> Result<T, EmotionError> {
        self.map_err(|e| EmotionError::ModelLoad(format!("{context}: {e}")))
    }
    fn inference_err(self, context: &str) -> Result<T, EmotionError> {
        self.map_err(|e| EmotionError::Inference(format!("{context}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_order_matches_model_contract() {
        let tags: Vec<&str> = EmotionLabel::ALL.iter().map(|l| l.as_str()).collect();
        assert_eq!(
            tags,
            ["angry", "disgust", "fear", "happy", "neutral", "surprise", "sad"]
        );
    }

    #[test]
    fn label_from_index() {
        assert_eq!(EmotionLabel::from_index(0), Some(EmotionLabel::Angry));
        assert_eq!(EmotionLabel::from_index(3), Some(EmotionLabel::Happy));
        assert_eq!(EmotionLabel::from_index(6), Some(EmotionLabel::Sad));
        assert_eq!(EmotionLabel::from_index(7), None);
    }

    #[test]
    fn label_serializes_lowercase() {
        let json = serde_json::to_string(&EmotionLabel::Surprise).unwrap();
        assert_eq!(json, "\"surprise\"");
    }

    #[test]
    fn label_display() {
        assert_eq!(EmotionLabel::Neutral.to_string(), "neutral");
    }

    #[test]
    fn feature_vector_length() {
        let v = FeatureVector::new([0.0; N_MFCC]);
        assert_eq!(v.as_slice().len(), 40);
    }

    #[test]
    fn error_display() {
        let e = EmotionError::Decode("no audio track".into());
        assert!(e.to_string().contains("no audio track"));

        let e = EmotionError::ModelLoad("artifact missing".into());
        assert!(e.to_string().starts_with("model load error"));
    }

    #[test]
    fn result_ext_decode_context() {
        let err: Result<(), &str> = Err("probe failed");
        let mapped = err.decode_err("open");
        assert!(matches!(mapped, Err(EmotionError::Decode(s)) if s == "open: probe failed"));
    }

    #[test]
    fn result_ext_inference_context() {
        let err: Result<(), &str> = Err("session run");
        let mapped = err.inference_err("predict");
        assert!(matches!(mapped, Err(EmotionError::Inference(s)) if s == "predict: session run"));
    }

    #[test]
    fn result_ext_ok_passthrough() {
        let ok: Result<i32, &str> = Ok(7);
        assert_eq!(ok.model_load_err("ctx").unwrap(), 7);
        let ok: Result<i32, &str> = Ok(11);
        assert_eq!(ok.feature_err("ctx").unwrap(), 11);
    }
}
