//! Versioned on-disk form of a [`ClusterSet`].
//!
//! A snapshot is a ZIP archive with two entries:
//!
//! ```text
//! manifest.json    - format version, id, timestamps, checksum of clusters.json
//! clusters.json    - schema, centroid values and member indices
//! ```

mod format;
mod store;


pub use format::{AttributeRecord, ClusterRecord, ClusterSetRecord};
pub use store::{SNAPSHOT_EXTENSION, SnapshotStore, snapshot_name};

use chrono::{Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::clusterer::{ClusterSet, MiningError};

/// Current snapshot format version
pub const FORMAT_VERSION: u32 = 1;

const MANIFEST_ENTRY: &str = "manifest.json";
const CLUSTERS_ENTRY: &str = "clusters.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub id: Uuid,
    pub created_at: String,
    pub generator: String,
    pub table: Option<String>,
    pub k: usize,
    pub attributes: Vec<String>,
    /// Hex SHA-256 of the clusters entry
    pub checksum: String,
}

fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Write `clusters` to `path`, replacing any existing file
pub fn write(
    path: &Path,
    clusters: &ClusterSet,
    table: Option<&str>,
) -> Result<Manifest, MiningError> {
    let record = ClusterSetRecord::encode(clusters);
    let clusters_json = serde_json::to_vec_pretty(&record)?;

    let manifest = Manifest {
        version: FORMAT_VERSION,
        id: Uuid::new_v4(),
        created_at: Utc::now().to_rfc3339(),
        generator: format!("mixclust v{}", env!("CARGO_PKG_VERSION")),
        table: table.map(str::to_string),
        k: clusters.len(),
        attributes: record.schema.iter().map(|a| a.name().to_string()).collect(),
        checksum: checksum(&clusters_json),
    };
    let manifest_json = serde_json::to_vec_pretty(&manifest)?;

    let file = File::create(path)?;
    let mut zip = ZipWriter::new(file);
    let now = chrono::Local::now();
    let options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(
            zip::DateTime::from_date_and_time(
                now.year() as u16,
                now.month() as u8,
                now.day() as u8,
                now.hour() as u8,
                now.minute() as u8,
                now.second() as u8,
            )
            .unwrap_or_default(),
        );

    zip.start_file(MANIFEST_ENTRY, options)?;
    zip.write_all(&manifest_json)?;
    zip.start_file(CLUSTERS_ENTRY, options)?;
    zip.write_all(&clusters_json)?;
    zip.finish()?;

    Ok(manifest)
}

/// Read a snapshot written by [`write`], verifying version and checksum
pub fn read(path: &Path) -> Result<(Manifest, ClusterSet), MiningError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let manifest: Manifest = {
        let mut entry = archive.by_name(MANIFEST_ENTRY)?;
        let mut contents = String::new();
        entry.read_to_string(&mut contents)?;
        serde_json::from_str(&contents)?
    };
    if manifest.version != FORMAT_VERSION {
        return Err(MiningError::UnsupportedVersion {
            found: manifest.version,
            expected: FORMAT_VERSION,
        });
    }

    let clusters_json = {
        let mut entry = archive.by_name(CLUSTERS_ENTRY)?;
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        contents
    };
    if checksum(&clusters_json) != manifest.checksum {
        return Err(MiningError::Corrupt(format!(
            "{} does not match its checksum",
            CLUSTERS_ENTRY
        )));
    }

    let record: ClusterSetRecord = serde_json::from_slice(&clusters_json)?;
    let clusters = record.decode()?;
    if clusters.len() != manifest.k {
        return Err(MiningError::Corrupt(format!(
            "manifest declares k={} but {} clusters were stored",
            manifest.k,
            clusters.len()
        )));
    }

    Ok((manifest, clusters))
}
