//! Sample manifest and image loading.

use std::fs;
use std::path::{Path, PathBuf};

use burn::prelude::*;
use image::imageops::{self, FilterType};

use crate::error::{Error, Result};

/// The substring that distinguishes input images from their depth/gt
/// counterparts in the dataset's naming scheme.
const INPUT_MARKER: &str = "colors";

/// One input image paired with its ground-truth depth map.
#[derive(Debug, Clone)]
pub struct ImageSample {
    /// Input file name (no directory).
    pub name: String,
    pub input_path: PathBuf,
    pub gt_path: PathBuf,
}

/// Derives a counterpart file name from an input file name by substituting
/// the `colors` marker, falling back to a stem suffix when the marker is
/// absent.
pub fn paired_name(name: &str, replacement: &str) -> String {
    if name.contains(INPUT_MARKER) {
        return name.replace(INPUT_MARKER, replacement);
    }
    match name.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_{replacement}.{ext}"),
        None => format!("{name}_{replacement}"),
    }
}

/// Builds the evaluation manifest: every file in `input_dir` paired with its
/// ground-truth counterpart in `gt_dir`.
///
/// Entries are sorted by file name so repeated runs visit samples in the
/// same order. A missing ground-truth counterpart is an error rather than a
/// silent mispairing.
pub fn build_manifest(input_dir: &Path, gt_dir: &Path) -> Result<Vec<ImageSample>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => {
                return Err(Error::manifest(format!(
                    "input file name is not valid UTF-8: {raw:?}"
                )));
            }
        }
    }
    names.sort();

    let mut samples = Vec::with_capacity(names.len());
    for name in names {
        let gt_name = paired_name(&name, "depth");
        let gt_path = gt_dir.join(&gt_name);
        if !gt_path.exists() {
            return Err(Error::manifest(format!(
                "no ground truth `{gt_name}` for input `{name}` in {}",
                gt_dir.display()
            )));
        }
        samples.push(ImageSample {
            input_path: input_dir.join(&name),
            gt_path,
            name,
        });
    }
    Ok(samples)
}

/// Loads an image, resizes it to `width` x `height` with cubic filtering and
/// packs it into a channel-first `[1, channels, height, width]` tensor with
/// values in `[0, 1]`.
///
/// `channels` must be 1 (depth/ground-truth maps) or 3 (RGB inputs).
pub fn load_image_tensor<B: Backend>(
    path: &Path,
    channels: usize,
    width: usize,
    height: usize,
    device: &B::Device,
) -> Result<Tensor<B, 4>> {
    let image = image::open(path)?;
    let hw = width * height;
    let mut data = vec![0.0f32; channels * hw];

    match channels {
        3 => {
            let rgb = image.to_rgb32f();
            let resized = imageops::resize(&rgb, width as u32, height as u32, FilterType::CatmullRom);
            for (idx, pixel) in resized.pixels().enumerate() {
                for channel in 0..3 {
                    data[channel * hw + idx] = pixel[channel];
                }
            }
        }
        1 => {
            let gray = image.to_luma32f();
            let resized =
                imageops::resize(&gray, width as u32, height as u32, FilterType::CatmullRom);
            for (idx, pixel) in resized.pixels().enumerate() {
                data[idx] = pixel[0];
            }
        }
        other => {
            return Err(Error::config(format!(
                "unsupported channel count {other} for `{}`",
                path.display()
            )));
        }
    }

    Ok(
        Tensor::<B, 1>::from_floats(data.as_slice(), device).reshape([
            1,
            channels as i32,
            height as i32,
            width as i32,
        ]),
    )
}

/// Reads a tensor back into a host vector of f32 values.
pub fn tensor_values<B: Backend>(tensor: Tensor<B, 4>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|err| Error::shape(format!("failed to read tensor data: {err:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InferenceBackend;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn paired_name_substitutes_marker() {
        assert_eq!(paired_name("room1_colors.png", "depth"), "room1_depth.png");
        assert_eq!(paired_name("room1_colors.png", "gt"), "room1_gt.png");
    }

    #[test]
    fn paired_name_falls_back_to_suffix() {
        assert_eq!(paired_name("room1.png", "depth"), "room1_depth.png");
        assert_eq!(paired_name("room1", "gt"), "room1_gt");
    }

    #[test]
    fn manifest_pairs_inputs_with_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("input");
        let gt_dir = dir.path().join("gt");
        fs::create_dir_all(&input_dir).unwrap();
        fs::create_dir_all(&gt_dir).unwrap();

        for scene in ["b_colors.png", "a_colors.png"] {
            RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
                .save(input_dir.join(scene))
                .unwrap();
            GrayImage::from_pixel(4, 4, Luma([100]))
                .save(gt_dir.join(paired_name(scene, "depth")))
                .unwrap();
        }

        let manifest = build_manifest(&input_dir, &gt_dir).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest[0].name, "a_colors.png");
        assert_eq!(manifest[1].name, "b_colors.png");
        assert!(manifest[0].gt_path.ends_with("a_depth.png"));
    }

    #[test]
    fn manifest_rejects_missing_ground_truth() {
        let dir = tempfile::tempdir().unwrap();
        let input_dir = dir.path().join("input");
        let gt_dir = dir.path().join("gt");
        fs::create_dir_all(&input_dir).unwrap();
        fs::create_dir_all(&gt_dir).unwrap();
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 0]))
            .save(input_dir.join("a_colors.png"))
            .unwrap();

        let result = build_manifest(&input_dir, &gt_dir);
        assert!(matches!(result, Err(Error::Manifest(_))));
    }

    #[test]
    fn load_image_tensor_resizes_to_channel_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.png");
        RgbImage::from_pixel(8, 6, Rgb([255, 0, 128]))
            .save(&path)
            .unwrap();

        let device = Default::default();
        let tensor = load_image_tensor::<InferenceBackend>(&path, 3, 4, 3, &device).unwrap();
        assert_eq!(tensor.dims(), [1, 3, 3, 4]);

        let values = tensor_values(tensor).unwrap();
        // Red channel saturated, green channel empty.
        assert!((values[0] - 1.0).abs() < 1e-4);
        assert!(values[12].abs() < 1e-4);
    }

    #[test]
    fn load_image_tensor_handles_single_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depth.png");
        GrayImage::from_pixel(8, 6, Luma([128]))
            .save(&path)
            .unwrap();

        let device = Default::default();
        let tensor = load_image_tensor::<InferenceBackend>(&path, 1, 4, 3, &device).unwrap();
        assert_eq!(tensor.dims(), [1, 1, 3, 4]);

        let values = tensor_values(tensor).unwrap();
        for value in values {
            assert!((value - 128.0 / 255.0).abs() < 1e-2);
        }
    }
}
