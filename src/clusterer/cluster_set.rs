use rand::Rng;
use std::fmt;

use super::cluster::Cluster;
use crate::data::{Attribute, DataError, RowTable, Tuple};

/// The fixed collection of k clusters produced by one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSet {
    clusters: Vec<Cluster>,
}

impl ClusterSet {
    /// Sample `k` distinct rows and open one empty cluster per sampled row,
    /// in sampling order
    pub fn initialize<R: Rng + ?Sized>(
        table: &RowTable,
        k: usize,
        rng: &mut R,
    ) -> Result<Self, DataError> {
        let clusters = table
            .sample(k, rng)?
            .into_iter()
            .map(|row| Cluster::new(table.tuple(row)))
            .collect();
        Ok(Self { clusters })
    }

    pub(crate) fn from_clusters(clusters: Vec<Cluster>) -> Self {
        Self { clusters }
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Cluster> {
        self.clusters.get(i)
    }

    pub(crate) fn get_mut(&mut self, i: usize) -> Option<&mut Cluster> {
        self.clusters.get_mut(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    /// Index of the cluster whose centroid is closest to `tuple`.
    ///
    /// Ties keep the lowest index. `None` only for an empty set.
    pub fn nearest_cluster(&self, tuple: &Tuple) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, cluster) in self.clusters.iter().enumerate() {
            let dist = tuple.distance(cluster.centroid());
            match best {
                Some((_, min)) if dist >= min => {}
                _ => best = Some((i, dist)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Index of the cluster owning `row`.
    ///
    /// Scans every cluster; if more than one claims the row, the last one wins.
    pub fn current_cluster(&self, row: usize) -> Option<usize> {
        self.clusters
            .iter()
            .enumerate()
            .filter(|(_, cluster)| cluster.contains(row))
            .map(|(i, _)| i)
            .last()
    }

    pub fn update_centroids(&mut self, table: &RowTable) {
        for cluster in &mut self.clusters {
            cluster.recompute_centroid(table);
        }
    }

    /// Schema read off the first centroid; all centroids share it
    pub fn attributes(&self) -> Vec<Attribute> {
        self.clusters
            .first()
            .map(|c| c.centroid().items().iter().map(|i| i.attribute()).collect())
            .unwrap_or_default()
    }

    /// Detailed listing of every cluster against the table it was built from
    pub fn report(&self, table: &RowTable) -> String {
        self.clusters
            .iter()
            .enumerate()
            .map(|(i, cluster)| format!("{}: {}\n", i, cluster.report(table)))
            .collect()
    }
}

impl fmt::Display for ClusterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cluster) in self.clusters.iter().enumerate() {
            writeln!(f, "{}: {}", i, cluster)?;
        }
        Ok(())
    }
}
