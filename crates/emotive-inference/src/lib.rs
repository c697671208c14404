//! Speech emotion classification pipeline.
//!
//! # Architecture
//!
//! ```text
//! staged audio file → symphonia decode → mono f32, first 3s, native rate
//! → MFCC (40 coefficients, time-averaged) → model.onnx (1×40×1 in, 7 scores out)
//! → deterministic argmax → emotion label
//! ```
//!
//! The model is loaded lazily, at most once per process, through
//! [`ModelRegistry`]. Every stage returns a typed [`EmotionError`] instead of
//! panicking; the hosting layer translates errors to responses.
//!
//! ## Crate position
//!
//! Standalone. Depended on by: `emotive-server`, `emotived`.

pub mod audio;
pub mod features;
pub mod model;
pub mod registry;
pub mod service;
pub mod test_wav;
pub mod types;

pub use audio::Waveform;
pub use model::{EmotionModel, OnnxEmotionModel};
pub use registry::ModelRegistry;
pub use service::InferenceService;
pub use types::{EmotionError, EmotionLabel, FeatureVector, N_EMOTIONS, N_MFCC, ResultExt};
