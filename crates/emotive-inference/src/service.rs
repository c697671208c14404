//! Pipeline orchestration: staged audio file → emotion label.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::registry::ModelRegistry;
use crate::types::{EmotionError, EmotionLabel, N_EMOTIONS};
use crate::{audio, features};

/// Runs the full inference pipeline against the shared model.
///
/// The pipeline is synchronous and CPU/IO-bound; callers on an async runtime
/// should run [`classify_file`](Self::classify_file) on a blocking thread.
pub struct InferenceService {
    registry: Arc<ModelRegistry>,
}

impl InferenceService {
    /// Create a service backed by `registry`.
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// The backing registry (for preload and health reporting).
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Classify the clip at `path`: decode → extract → predict → argmax.
    ///
    /// Collaborator errors surface unchanged; the caller maps them to a
    /// response class at the boundary.
    pub fn classify_file(&self, path: &Path) -> Result<EmotionLabel, EmotionError> {
        let waveform = audio::decode_waveform(path)?;
        debug!(
            samples = waveform.samples.len(),
            sample_rate = waveform.sample_rate,
            "decoded waveform"
        );

        let features = features::extract(&waveform)?;
        let model = self.registry.get()?;
        let scores = model.predict(&features)?;

        let label = EmotionLabel::ALL[argmax(&scores)];
        debug!(%label, "classified clip");
        Ok(label)
    }
}

/// Index of the maximum score. Exact ties resolve to the lowest index —
/// the first occurrence in label order wins.
fn argmax(scores: &[f32; N_EMOTIONS]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}
