//! Visualization output: PNG writing and output directory preparation.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::error::Result;

/// The standard and `_abs` output bases for one run.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    base: PathBuf,
    base_abs: PathBuf,
}

/// Per-snapshot output directories.
#[derive(Debug, Clone)]
pub struct SnapshotDirs {
    pub standard: PathBuf,
    pub absolute: PathBuf,
}

fn abs_variant(base: &Path) -> PathBuf {
    let mut name = base
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("output"));
    name.push("_abs");
    base.with_file_name(name)
}

impl OutputLayout {
    /// Creates (or reuses) the two base output directories.
    pub fn new(base: &Path) -> Result<Self> {
        let base_abs = abs_variant(base);
        fs::create_dir_all(base)?;
        fs::create_dir_all(&base_abs)?;
        Ok(Self {
            base: base.to_path_buf(),
            base_abs,
        })
    }

    /// Prepares a clean pair of per-snapshot directories, deleting any
    /// leftovers from a previous run first. IO failures propagate.
    pub fn prepare_snapshot(&self, snapshot: &str) -> Result<SnapshotDirs> {
        let dirs = SnapshotDirs {
            standard: self.base.join(snapshot),
            absolute: self.base_abs.join(snapshot),
        };
        for dir in [&dirs.standard, &dirs.absolute] {
            if dir.exists() {
                debug!(dir = %dir.display(), "removing stale snapshot output");
                fs::remove_dir_all(dir)?;
            }
            fs::create_dir_all(dir)?;
        }
        Ok(dirs)
    }
}

fn quantize(values: &[f32]) -> Vec<u8> {
    values
        .iter()
        .map(|&v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect()
}

fn encode_png(path: &Path, bytes: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    // Best compression, matching the original's pinned zlib level.
    let encoder = PngEncoder::new_with_quality(writer, CompressionType::Best, FilterType::Adaptive);
    encoder.write_image(bytes, width, height, color)?;
    Ok(())
}

/// Writes a `[0, 1]` single-channel plane as an 8-bit grayscale PNG.
pub fn write_gray_png(path: &Path, values: &[f32], width: u32, height: u32) -> Result<()> {
    encode_png(path, &quantize(values), width, height, ExtendedColorType::L8)
}

/// Writes a `[0, 1]` channel-first RGB plane as an 8-bit color PNG.
pub fn write_rgb_png(path: &Path, chw: &[f32], width: u32, height: u32) -> Result<()> {
    let hw = (width * height) as usize;
    let mut interleaved = vec![0.0f32; chw.len()];
    for idx in 0..hw {
        for channel in 0..3 {
            interleaved[idx * 3 + channel] = chw[channel * hw + idx];
        }
    }
    encode_png(
        path,
        &quantize(&interleaved),
        width,
        height,
        ExtendedColorType::Rgb8,
    )
}
