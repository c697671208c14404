//! HTTP boundary for the emotion classification service.
//!
//! Owns request validation, per-request upload staging (with structurally
//! guaranteed cleanup), and the translation of pipeline errors into JSON
//! response envelopes. The pipeline itself lives in `emotive-inference`.
//!
//! ## Crate position
//!
//! Depends on: `emotive-inference`.
//! Depended on by: `emotived`.

pub mod config;
pub mod health;
pub mod server;
pub mod staging;

pub use config::ServerConfig;
pub use server::{AppState, build_router};
pub use staging::StagedAudio;
