//! Batch evaluation harness for convolutional depth-estimation snapshots.
//!
//! Discovers trained snapshots, runs single-image inference over a test
//! set, post-processes the output, scores it against ground-truth depth
//! maps with a fixed 10-metric suite, writes visualization PNGs, and ranks
//! snapshots per metric.

#![recursion_limit = "256"]

pub mod config;
pub mod dataset;
pub mod error;
pub mod harness;
pub mod metrics;
pub mod model;
pub mod output;
pub mod postprocess;
pub mod report;

pub use error::{Error, Result};

#[cfg(feature = "backend_ndarray")]
pub type InferenceBackend = burn::backend::NdArray<f32>;

#[cfg(all(feature = "backend_wgpu", not(feature = "backend_ndarray")))]
pub type InferenceBackend = burn::backend::Wgpu;
