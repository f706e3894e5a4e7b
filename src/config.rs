//! Evaluation configuration.
//!
//! All fixed dimensions and constants of the pipeline live here and are
//! passed explicitly into the processing functions; nothing reads globals.

/// Log-depth constant used by both the training-space codec and the display
/// transform.
pub const LOG_DEPTH_K: f32 = 0.179581;

/// Configuration for one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Width the input images are resized to before inference.
    pub input_width: usize,
    /// Height the input images are resized to before inference.
    pub input_height: usize,
    /// Width of the ground-truth depth maps (and of the upsampled output).
    pub gt_width: usize,
    /// Height of the ground-truth depth maps (and of the upsampled output).
    pub gt_height: usize,
    /// Undo log-depth encoding on the raw model output.
    pub log_depth: bool,
    /// Scale applied to both prediction and ground truth before metrics,
    /// counteracting the dataset's depth normalization.
    pub depth_scale: f32,
    /// Constant of the log-depth encoding.
    pub log_depth_k: f32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            input_width: 298,
            input_height: 218,
            gt_width: 420,
            gt_height: 320,
            log_depth: false,
            depth_scale: 10.0,
            log_depth_k: LOG_DEPTH_K,
        }
    }
}

impl EvalConfig {
    /// Target size of the upsampled output, `[height, width]`.
    pub fn gt_size(&self) -> [usize; 2] {
        [self.gt_height, self.gt_width]
    }
}
