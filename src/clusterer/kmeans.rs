use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::Path;
use tracing::{debug, info};

use super::{ClusterSet, MiningError};
use crate::data::{Attribute, RowTable};
use crate::snapshot;

/// Lifecycle of a miner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerState {
    /// k fixed, no centroids yet
    Created,
    /// Centroids sampled
    Initialized,
    /// Assign/update passes in progress
    Iterating,
    /// Last pass made no reassignment
    Converged,
    /// Restored from a snapshot
    Loaded,
}

/// k-means over a mixed discrete/continuous row table
#[derive(Debug)]
pub struct KMeansMiner {
    k: usize,
    state: MinerState,
    clusters: ClusterSet,
    passes: usize,
    table_name: Option<String>,
    rng: ChaCha8Rng,
}

impl KMeansMiner {
    /// New miner for `k` clusters, sampling from an entropy-seeded generator
    pub fn new(k: usize) -> Self {
        Self {
            k,
            state: MinerState::Created,
            clusters: ClusterSet::default(),
            passes: 0,
            table_name: None,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Use a fixed seed for centroid sampling
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// Restore a miner from a snapshot file.
    ///
    /// The result needs no row table: schema queries are answered from the
    /// centroids.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MiningError> {
        let (manifest, clusters) = snapshot::read(path.as_ref())?;
        info!(
            path = %path.as_ref().display(),
            k = clusters.len(),
            table = manifest.table.as_deref().unwrap_or("-"),
            "loaded clustering snapshot"
        );

        Ok(Self {
            k: clusters.len(),
            state: MinerState::Loaded,
            clusters,
            passes: 0,
            table_name: manifest.table,
            rng: ChaCha8Rng::from_entropy(),
        })
    }

    /// Write the current clusters to a snapshot file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MiningError> {
        if self.clusters.is_empty() {
            return Err(MiningError::NoModel);
        }
        let manifest = snapshot::write(path.as_ref(), &self.clusters, self.table_name.as_deref())?;
        info!(
            path = %path.as_ref().display(),
            id = %manifest.id,
            k = self.k,
            "saved clustering snapshot"
        );
        Ok(())
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn state(&self) -> MinerState {
        self.state
    }

    pub fn clusters(&self) -> &ClusterSet {
        &self.clusters
    }

    /// Passes taken by the last run (0 before any run or after a load)
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Name of the table the clusters were mined from, if known
    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    pub fn attributes(&self) -> Vec<Attribute> {
        self.clusters.attributes()
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.attributes()
            .iter()
            .map(|a| a.name().to_string())
            .collect()
    }

    pub fn attribute(&self, index: usize) -> Option<Attribute> {
        self.clusters
            .get(0)
            .and_then(|c| c.centroid().get(index))
            .map(|item| item.attribute())
    }

    /// Cluster `table` until a full pass reassigns no row.
    ///
    /// Returns the number of passes. A `k` outside `1..=distinct rows` fails
    /// with the sampling error and leaves the miner in `Created`.
    pub fn run(&mut self, table: &RowTable) -> Result<usize, MiningError> {
        self.state = MinerState::Created;
        self.clusters = ClusterSet::default();
        self.passes = 0;

        // 1. Pick k distinct rows as initial centroids
        self.clusters = ClusterSet::initialize(table, self.k, &mut self.rng)?;
        self.table_name = Some(table.name().to_string());
        self.state = MinerState::Initialized;
        info!(table = table.name(), rows = table.len(), k = self.k, "starting k-means");

        self.state = MinerState::Iterating;
        loop {
            self.passes += 1;

            // 2. Move every row to its nearest centroid
            let moved = self.assign_rows(table);

            // 3. Recompute centroids from the new memberships
            self.clusters.update_centroids(table);
            debug!(pass = self.passes, moved, "k-means pass");

            if moved == 0 {
                break; // converged
            }
        }

        self.state = MinerState::Converged;
        info!(passes = self.passes, "k-means converged");
        Ok(self.passes)
    }

    /// One membership pass; returns how many rows changed cluster
    fn assign_rows(&mut self, table: &RowTable) -> usize {
        let mut moved = 0;
        for row in 0..table.len() {
            let Some(nearest) = self.clusters.nearest_cluster(&table.tuple(row)) else {
                continue;
            };
            let current = self.clusters.current_cluster(row);
            if current == Some(nearest) {
                continue;
            }

            if let Some(cluster) = self.clusters.get_mut(nearest) {
                cluster.add_row(row);
            }
            if let Some(old) = current.and_then(|old| self.clusters.get_mut(old)) {
                old.remove_row(row);
            }
            moved += 1;
        }
        moved
    }
}
