//! The classifier seam: [`EmotionModel`] trait and the ONNX implementation.

use std::path::Path;

use parking_lot::Mutex;
use tracing::info;

use crate::types::{EmotionError, FeatureVector, N_EMOTIONS, N_MFCC, ResultExt};

/// A scored emotion classifier: feature vector in, one score per label out.
///
/// Implementations must be safe to call from concurrent requests; the model
/// is read-only after construction.
pub trait EmotionModel: Send + Sync {
    /// Score a feature vector. Index `i` of the result corresponds to
    /// `EmotionLabel::ALL[i]`.
    fn predict(&self, features: &FeatureVector) -> Result<[f32; N_EMOTIONS], EmotionError>;
}

/// ONNX-backed emotion classifier.
///
/// The session sits behind a `Mutex` because `Session::run` takes `&mut`;
/// the graph itself is never mutated after load.
#[derive(Debug)]
pub struct OnnxEmotionModel {
    session: Mutex<ort::session::Session>,
}

impl OnnxEmotionModel {
    /// Load the classifier from a single `.onnx` artifact file.
    ///
    /// Expensive (file I/O plus graph construction) — callers go through
    /// [`ModelRegistry`](crate::registry::ModelRegistry) so this runs at
    /// most once per process.
    pub fn load(path: &Path) -> Result<Self, EmotionError> {
        if !path.is_file() {
            // Client-visible message stays path-free; the path goes to the log.
            tracing::error!(model = %path.display(), "model artifact not found");
            return Err(EmotionError::ModelLoad("model artifact not found".into()));
        }

        info!(model = %path.display(), "loading emotion model");
        let session = ort::session::Session::builder()
            .model_load_err("session builder")?
            .with_intra_threads(2)
            .model_load_err("thread config")?
            .with_log_level(ort::logging::LogLevel::Warning)
            .model_load_err("log level")?
            .commit_from_file(path)
            .model_load_err("model load")?;

        info!("emotion model ready");
        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl EmotionModel for OnnxEmotionModel {
    fn predict(&self, features: &FeatureVector) -> Result<[f32; N_EMOTIONS], EmotionError> {
        // Batch the 40×1 column into the 1×40×1 shape the graph expects.
        #[allow(clippy::cast_possible_wrap)]
        let shape = vec![1i64, N_MFCC as i64, 1i64];
        let input = ort::value::Tensor::from_array((shape, features.as_slice().to_vec()))
            .inference_err("input tensor")?;

        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input])
            .inference_err("session run")?;

        let (out_shape, data) = outputs[0]
            .try_extract_tensor::<f32>()
            .inference_err("extract output")?;

        #[allow(clippy::cast_sign_loss)]
        let total: usize = out_shape.iter().map(|&d| d as usize).product();
        if total != N_EMOTIONS {
            return Err(EmotionError::Inference(format!(
                "unexpected output shape: {out_shape:?}"
            )));
        }

        let mut scores = [0.0f32; N_EMOTIONS];
        scores.copy_from_slice(&data[..N_EMOTIONS]);
        Ok(scores)
    }
}
