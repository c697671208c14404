//! Process-wide model singleton with guarded lazy initialization.

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::{EmotionModel, OnnxEmotionModel};
use crate::types::EmotionError;

type Loader = Box<dyn Fn() -> Result<Arc<dyn EmotionModel>, EmotionError> + Send + Sync>;

/// Owns the single shared [`EmotionModel`] instance.
///
/// The load-and-publish step runs under the write half of a double-checked
/// `RwLock`: at most one load is ever in flight, racing callers block until
/// the winner publishes, and everyone observes the same `Arc`. A failed load
/// publishes nothing — a later call re-attempts a full load rather than
/// accepting partial state.
pub struct ModelRegistry {
    loader: Loader,
    slot: RwLock<Option<Arc<dyn EmotionModel>>>,
}

impl ModelRegistry {
    /// Registry that lazily loads an ONNX artifact from `artifact_path`.
    pub fn onnx(artifact_path: PathBuf) -> Self {
        Self {
            loader: Box::new(move || {
                let model = OnnxEmotionModel::load(&artifact_path)?;
                Ok(Arc::new(model) as Arc<dyn EmotionModel>)
            }),
            slot: RwLock::new(None),
        }
    }

    /// Registry pre-populated with an already-constructed model.
    ///
    /// Used for eager-load deployments and for test fixtures.
    pub fn with_model(model: Arc<dyn EmotionModel>) -> Self {
        let for_loader = model.clone();
        Self {
            loader: Box::new(move || Ok(for_loader.clone())),
            slot: RwLock::new(Some(model)),
        }
    }

    /// The shared model, loading it on first call.
    pub fn get(&self) -> Result<Arc<dyn EmotionModel>, EmotionError> {
        {
            let slot = self.slot.read();
            if let Some(model) = slot.as_ref() {
                return Ok(model.clone());
            }
        }

        // Writer wins the initialization race; losers block here and then
        // see the published instance on the re-check.
        let mut slot = self.slot.write();
        if let Some(model) = slot.as_ref() {
            return Ok(model.clone());
        }

        let model = (self.loader)()?;
        *slot = Some(model.clone());
        Ok(model)
    }

    /// Force the load now instead of on first inference.
    pub fn preload(&self) -> Result<(), EmotionError> {
        self.get().map(|_| ())
    }

    /// Whether the model has been loaded and published.
    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }
}
