use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::clusterer::{KMeansMiner, MiningError};

/// File extension of snapshot archives
pub const SNAPSHOT_EXTENSION: &str = "kms";

/// Conventional snapshot name for a (table, k) pair
pub fn snapshot_name(table: &str, k: usize) -> String {
    format!("{}{}", table, k)
}

/// Directory of named snapshots
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", name, SNAPSHOT_EXTENSION))
    }

    /// Save `miner` under `name`, creating the directory if needed
    pub fn save(&self, name: &str, miner: &KMeansMiner) -> Result<PathBuf, MiningError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        miner.save(&path)?;
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<KMeansMiner, MiningError> {
        KMeansMiner::load(self.path_for(name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Names of the stored snapshots, sorted. A missing directory is empty.
    pub fn list(&self) -> Result<Vec<String>, MiningError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| MiningError::Io(e.into()))?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXTENSION)
            {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
