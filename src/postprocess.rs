//! Output post-processing: log-depth codec, upsampling, statistical
//! alignment and the display transform.

use burn::{
    nn::interpolate::{Interpolate2dConfig, InterpolateMode},
    prelude::*,
};

/// Lower clamp applied before any logarithm or division on depth values.
pub const MIN_DEPTH: f32 = 0.001;

/// Upper clamp of the display transform.
pub const MAX_DEPTH: f32 = 1000.0;

/// Training-space log-depth encoding: `k * ln(d) + 1`.
pub fn log_depth_encode(depth: f32, k: f32) -> f32 {
    k * depth.max(MIN_DEPTH).ln() + 1.0
}

/// Inverse of [`log_depth_encode`]: `exp((y - 1) / k)`.
pub fn log_depth_decode(encoded: f32, k: f32) -> f32 {
    ((encoded - 1.0) / k).exp()
}

/// Undoes the log-depth encoding on a raw model output blob.
pub fn decode_log_depth<B: Backend>(output: Tensor<B, 4>, k: f32) -> Tensor<B, 4> {
    output.sub_scalar(1.0).div_scalar(k).exp()
}

/// Cubic upsampling of a depth blob to `[height, width]`.
pub fn upsample_to<B: Backend>(output: Tensor<B, 4>, size: [usize; 2]) -> Tensor<B, 4> {
    Interpolate2dConfig::new()
        .with_output_size(Some(size))
        .with_mode(InterpolateMode::Cubic)
        .init()
        .forward(output)
}

/// Population mean and standard deviation of a plane.
pub fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    (mean as f32, variance.sqrt() as f32)
}

/// Rescales `values` in place so its mean and standard deviation match the
/// reference plane. A constant plane collapses onto the reference mean.
pub fn align_to_reference(values: &mut [f32], reference: &[f32]) {
    let (own_mean, own_std) = mean_std(values);
    let (ref_mean, ref_std) = mean_std(reference);
    let scale = if own_std > f32::EPSILON {
        ref_std / own_std
    } else {
        0.0
    };
    for value in values.iter_mut() {
        *value = (*value - own_mean) * scale + ref_mean;
    }
}

/// Maps a depth value onto `[0, 1]` for visualization: clamp to the valid
/// depth range, then `clamp(2k * ln(d) + 1, 0, 1)`.
pub fn compress_for_display(depth: f32, k: f32) -> f32 {
    let depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);
    (2.0 * k * depth.ln() + 1.0).clamp(0.0, 1.0)
}

/// In-place [`compress_for_display`] over a whole plane.
pub fn compress_plane(values: &mut [f32], k: f32) {
    for value in values.iter_mut() {
        *value = compress_for_display(*value, k);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InferenceBackend;
    use crate::config::LOG_DEPTH_K;

    #[test]
    fn log_depth_codec_roundtrips() {
        for depth in [0.01, 0.1, 0.5, 1.0, 2.0, 10.0, 100.0] {
            let encoded = log_depth_encode(depth, LOG_DEPTH_K);
            let decoded = log_depth_decode(encoded, LOG_DEPTH_K);
            assert!(
                (decoded - depth).abs() / depth < 1e-4,
                "roundtrip failed for {depth}: got {decoded}"
            );
        }
    }

    #[test]
    fn decode_log_depth_matches_scalar_decode() {
        let device = Default::default();
        let encoded = [0.2f32, 0.5, 1.0, 1.4];
        let tensor = Tensor::<InferenceBackend, 1>::from_floats(encoded.as_slice(), &device)
            .reshape([1, 1, 2, 2]);

        let decoded = decode_log_depth(tensor, LOG_DEPTH_K)
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .unwrap();
        for (value, expected) in decoded
            .iter()
            .zip(encoded.iter().map(|&v| log_depth_decode(v, LOG_DEPTH_K)))
        {
            assert!((value - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn upsample_scales_each_axis_independently() {
        let device = Default::default();
        let output = Tensor::<InferenceBackend, 4>::zeros([1, 1, 27, 37], &device);
        let upsampled = upsample_to(output, [320, 420]);
        assert_eq!(upsampled.dims(), [1, 1, 320, 420]);
    }

    #[test]
    fn alignment_matches_reference_statistics() {
        let mut values: Vec<f32> = (0..100).map(|i| i as f32 / 10.0).collect();
        let reference: Vec<f32> = (0..100).map(|i| 5.0 + (i % 7) as f32).collect();

        align_to_reference(&mut values, &reference);

        let (mean, std) = mean_std(&values);
        let (ref_mean, ref_std) = mean_std(&reference);
        assert!((mean - ref_mean).abs() < 1e-3);
        assert!((std - ref_std).abs() < 1e-3);
    }

    #[test]
    fn alignment_of_constant_plane_is_reference_mean() {
        let mut values = vec![2.0f32; 16];
        let reference: Vec<f32> = (0..16).map(|i| i as f32).collect();

        align_to_reference(&mut values, &reference);

        let (ref_mean, _) = mean_std(&reference);
        for value in values {
            assert!((value - ref_mean).abs() < 1e-4);
        }
    }

    #[test]
    fn display_transform_clamps_to_unit_interval() {
        assert_eq!(compress_for_display(0.0, LOG_DEPTH_K), 0.0);
        assert_eq!(compress_for_display(1e6, LOG_DEPTH_K), 1.0);
        // Unit depth sits exactly at the top of the display range.
        assert!((compress_for_display(1.0, LOG_DEPTH_K) - 1.0).abs() < 1e-6);

        let mid = compress_for_display(0.5, LOG_DEPTH_K);
        assert!(mid > 0.0 && mid < 1.0);
    }
}
