//! Snapshot discovery and loading.
//!
//! A snapshot is a filename-stem-paired couple in the snapshot directory:
//! `<stem>.json` holds the network topology ([`GlobalContextNetConfig`]),
//! `<stem>.mpk` holds the trained weights as a named message-pack record.

pub mod global_context;

use std::fs;
use std::path::{Path, PathBuf};

use burn::{
    module::Module,
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
};

use crate::error::{Error, Result};
use global_context::{GlobalContextNet, GlobalContextNetConfig};

/// A trained snapshot, identified by its filename stem.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub name: String,
    pub config_path: PathBuf,
    pub weights_path: PathBuf,
}

impl Snapshot {
    /// Loads the network description and weights into a model instance.
    pub fn load<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<(GlobalContextNet<B>, GlobalContextNetConfig)> {
        let config = GlobalContextNetConfig::load(&self.config_path).map_err(|err| {
            Error::model(format!(
                "failed to load network config `{}`: {err}",
                self.config_path.display()
            ))
        })?;

        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let model = config
            .init::<B>(device)
            .load_file(self.weights_path.clone(), &recorder, device)
            .map_err(|err| {
                Error::model(format!(
                    "failed to load weights `{}`: {err}",
                    self.weights_path.display()
                ))
            })?;

        Ok((model, config))
    }
}

/// Scans a directory for snapshots, pairing each `.mpk` weight record with
/// its `.json` config by stem. Other files are skipped; a weight record
/// without a config is an error.
pub fn discover_snapshots(dir: &Path) -> Result<Vec<Snapshot>> {
    let mut snapshots = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("mpk") {
            continue;
        }
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| {
                Error::model(format!("snapshot `{}` has no valid stem", path.display()))
            })?
            .to_string();

        let config_path = path.with_extension("json");
        if !config_path.exists() {
            return Err(Error::model(format!(
                "snapshot `{name}` has no network config `{}`",
                config_path.display()
            )));
        }

        snapshots.push(Snapshot {
            name,
            config_path,
            weights_path: path,
        });
    }
    snapshots.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(snapshots)
}
