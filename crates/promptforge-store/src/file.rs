//! Filesystem implementation of `ArtifactSink`.
//!
//! Each write goes to a `.tmp` sibling first and is then renamed over the
//! target, so an aggregate artifact being rewritten is never observed
//! half-written. Titled artifacts never replace an existing file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use promptforge_contracts::{
    artifact::{Artifact, ArtifactReceipt},
    error::{ForgeError, ForgeResult},
};
use promptforge_core::traits::ArtifactSink;

use crate::{document, naming};

/// Writes artifacts as JSON files under one output directory.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The path `artifact` will be written to: the run's aggregate file, or
    /// the first titled name not already on disk.
    pub fn path_for(&self, artifact: &Artifact) -> PathBuf {
        let name = naming::unique_file_name(&artifact.name, |candidate| {
            self.dir.join(candidate).exists()
        });
        self.dir.join(name)
    }
}

fn storage_error(action: &str, path: &Path, e: std::io::Error) -> ForgeError {
    ForgeError::Storage {
        reason: format!("failed to {action} {}: {e}", path.display()),
    }
}

impl ArtifactSink for FileArtifactStore {
    fn persist(&self, artifact: &Artifact) -> ForgeResult<ArtifactReceipt> {
        let bytes = document::encode(artifact)?;
        let path = self.path_for(artifact);

        fs::create_dir_all(&self.dir).map_err(|e| storage_error("create", &self.dir, e))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).map_err(|e| storage_error("write", &tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| storage_error("replace", &path, e))?;

        let sha256 = document::sha256_hex(&bytes);
        debug!(path = %path.display(), bytes = bytes.len(), %sha256, "artifact written");
        info!(
            path = %path.display(),
            records = artifact.records.len(),
            "saved artifact"
        );

        Ok(ArtifactReceipt {
            path,
            records: artifact.records.len(),
            sha256,
        })
    }
}
