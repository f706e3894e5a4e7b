//! The evaluation loops: every snapshot over every image sample.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use burn::prelude::*;
use tracing::{info, warn};

use crate::config::EvalConfig;
use crate::dataset::{self, ImageSample, build_manifest, load_image_tensor, tensor_values};
use crate::error::{Error, Result};
use crate::metrics::{self, MetricAccumulator};
use crate::model::{Snapshot, discover_snapshots, global_context::GlobalContextNet};
use crate::output::{OutputLayout, SnapshotDirs, write_gray_png, write_rgb_png};
use crate::postprocess::{align_to_reference, compress_plane, decode_log_depth, upsample_to};
use crate::report::ResultsTable;

/// The four directories an evaluation run works with.
#[derive(Debug, Clone)]
pub struct EvalPaths {
    /// Directory of input "colors" images.
    pub input_dir: PathBuf,
    /// Directory of matching ground-truth depth maps.
    pub gt_dir: PathBuf,
    /// Base output directory; an `_abs` sibling is created next to it.
    pub output: PathBuf,
    /// Directory of snapshot config/weight pairs.
    pub snaps: PathBuf,
}

/// Runs the full evaluation: every snapshot in `paths.snaps` over every
/// sample pair, returning the averaged metric table.
pub fn run<B: Backend>(
    config: &EvalConfig,
    paths: &EvalPaths,
    device: &B::Device,
) -> Result<ResultsTable> {
    let manifest = build_manifest(&paths.input_dir, &paths.gt_dir)?;
    if manifest.is_empty() {
        return Err(Error::manifest(format!(
            "no input images in {}",
            paths.input_dir.display()
        )));
    }

    let snapshots = discover_snapshots(&paths.snaps)?;
    if snapshots.is_empty() {
        warn!(dir = %paths.snaps.display(), "no snapshots found");
    }

    let layout = OutputLayout::new(&paths.output)?;
    let mut table = ResultsTable::new();

    for snapshot in &snapshots {
        let metrics = evaluate_snapshot::<B>(config, snapshot, &manifest, &layout, device)?;
        table.insert(snapshot.name.clone(), metrics);
    }

    Ok(table)
}

fn evaluate_snapshot<B: Backend>(
    config: &EvalConfig,
    snapshot: &Snapshot,
    manifest: &[ImageSample],
    layout: &OutputLayout,
    device: &B::Device,
) -> Result<metrics::MetricVector> {
    info!(snapshot = %snapshot.name, images = manifest.len(), "evaluating snapshot");
    let dirs = layout.prepare_snapshot(&snapshot.name)?;
    let (model, _model_config) = snapshot.load::<B>(device)?;

    let mut accumulator = MetricAccumulator::default();
    for (index, sample) in manifest.iter().enumerate() {
        print!("\r{}/{}: {}", index, manifest.len(), sample.name);
        io::stdout().flush()?;

        evaluate_sample::<B>(config, &model, sample, &dirs, &mut accumulator, device)?;
    }
    println!();

    Ok(accumulator.mean())
}

fn evaluate_sample<B: Backend>(
    config: &EvalConfig,
    model: &GlobalContextNet<B>,
    sample: &ImageSample,
    dirs: &SnapshotDirs,
    accumulator: &mut MetricAccumulator,
    device: &B::Device,
) -> Result<()> {
    let gt = load_image_tensor::<B>(
        &sample.gt_path,
        1,
        config.gt_width,
        config.gt_height,
        device,
    )?;
    let input = load_image_tensor::<B>(
        &sample.input_path,
        3,
        config.input_width,
        config.input_height,
        device,
    )?;

    // The network was trained on mean-shifted byte-range inputs.
    let net_input = input.clone().mul_scalar(255.0).sub_scalar(127.0);
    let mut output = model.forward(net_input);
    if config.log_depth {
        output = decode_log_depth(output, config.log_depth_k);
    }
    let output = upsample_to(output, config.gt_size());

    let gt_values = tensor_values(gt)?;
    let out_values = tensor_values(output)?;

    // Metrics run on the raw upsampled output, before any alignment.
    accumulator.add(&metrics::evaluate(
        &out_values,
        &gt_values,
        config.depth_scale,
    )?);

    write_visualizations(config, sample, dirs, &input, &out_values, &gt_values)
}

fn write_visualizations<B: Backend>(
    config: &EvalConfig,
    sample: &ImageSample,
    dirs: &SnapshotDirs,
    input: &Tensor<B, 4>,
    out_values: &[f32],
    gt_values: &[f32],
) -> Result<()> {
    let k = config.log_depth_k;

    let mut absolute = out_values.to_vec();
    let mut aligned = out_values.to_vec();
    align_to_reference(&mut aligned, gt_values);

    let mut gt_display = gt_values.to_vec();
    compress_plane(&mut absolute, k);
    compress_plane(&mut aligned, k);
    compress_plane(&mut gt_display, k);

    let input_values = tensor_values(input.clone())?;

    let stem = Path::new(&sample.name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| sample.name.clone());
    let input_png = format!("{stem}.png");
    let depth_png = dataset::paired_name(&input_png, "depth");
    let gt_png = dataset::paired_name(&input_png, "gt");

    let (in_w, in_h) = (config.input_width as u32, config.input_height as u32);
    let (gt_w, gt_h) = (config.gt_width as u32, config.gt_height as u32);

    write_rgb_png(&dirs.standard.join(&input_png), &input_values, in_w, in_h)?;
    write_rgb_png(&dirs.absolute.join(&input_png), &input_values, in_w, in_h)?;
    write_gray_png(&dirs.standard.join(&depth_png), &aligned, gt_w, gt_h)?;
    write_gray_png(&dirs.absolute.join(&depth_png), &absolute, gt_w, gt_h)?;
    write_gray_png(&dirs.standard.join(&gt_png), &gt_display, gt_w, gt_h)?;
    write_gray_png(&dirs.absolute.join(&gt_png), &gt_display, gt_w, gt_h)?;

    Ok(())
}
