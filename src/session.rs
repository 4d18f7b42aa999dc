use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

use crate::clusterer::{ClusterSet, KMeansMiner, MinerState, MiningError};
use crate::data::{Attribute, RowTable};
use crate::snapshot::{SnapshotStore, snapshot_name};

/// Outcome of a clustering run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub passes: usize,
    /// Per-cluster listing against the source table
    pub report: String,
}

/// State owned by one client: its table, its miner and an operation log.
///
/// Sessions share nothing; each connection builds its own.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    table: Option<RowTable>,
    miner: Option<KMeansMiner>,
    seed: Option<u64>,
    history: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "session opened");
        Self {
            id,
            table: None,
            miner: None,
            seed: None,
            history: Vec::new(),
        }
    }

    /// Seed centroid sampling for every run of this session
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Operations performed so far, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn table(&self) -> Option<&RowTable> {
        self.table.as_ref()
    }

    pub fn miner(&self) -> Option<&KMeansMiner> {
        self.miner.as_ref()
    }

    pub fn clusters(&self) -> Option<&ClusterSet> {
        self.miner.as_ref().map(KMeansMiner::clusters)
    }

    /// Use `table` for the following runs
    pub fn attach_table(&mut self, table: RowTable) {
        info!(session = %self.id, table = table.name(), rows = table.len(), "table attached");
        self.history.push(format!("attach table {}", table.name()));
        self.table = Some(table);
    }

    /// Cluster the attached table into `k` groups
    pub fn run(&mut self, k: usize) -> Result<RunSummary, MiningError> {
        let table = self.table.as_ref().ok_or(MiningError::NoTable)?;
        self.history.push(format!("k-means on {} (k = {})", table.name(), k));

        let mut miner = KMeansMiner::new(k);
        if let Some(seed) = self.seed {
            miner = miner.with_seed(seed);
        }
        let passes = miner.run(table)?;
        let report = miner.clusters().report(table);

        self.miner = Some(miner);
        Ok(RunSummary { passes, report })
    }

    /// Snapshot name for the current model: table name followed by k
    pub fn snapshot_name(&self) -> Option<String> {
        let miner = self.miner.as_ref()?;
        let table = miner
            .table_name()
            .or_else(|| self.table.as_ref().map(RowTable::name))?;
        Some(snapshot_name(table, miner.k()))
    }

    /// Save the current model under its conventional name
    pub fn save(&mut self, store: &SnapshotStore) -> Result<PathBuf, MiningError> {
        let name = self.snapshot_name().ok_or(MiningError::NoModel)?;
        self.save_as(store, &name)
    }

    /// Save the current model under `name`
    pub fn save_as(&mut self, store: &SnapshotStore, name: &str) -> Result<PathBuf, MiningError> {
        let miner = self.miner.as_ref().ok_or(MiningError::NoModel)?;
        let path = store.save(name, miner)?;
        info!(session = %self.id, snapshot = name, "model saved");
        self.history.push(format!("save {}", name));
        Ok(path)
    }

    /// Replace the current model with the snapshot saved for (`table`, `k`).
    ///
    /// Returns the centroid summary of the restored clusters.
    pub fn restore(
        &mut self,
        store: &SnapshotStore,
        table: &str,
        k: usize,
    ) -> Result<String, MiningError> {
        let name = snapshot_name(table, k);
        let miner = store.load(&name)?;
        let summary = miner.clusters().to_string();
        self.history.push(format!("restore {}", name));
        self.miner = Some(miner);
        Ok(summary)
    }

    fn restored(&self) -> Option<&KMeansMiner> {
        self.miner
            .as_ref()
            .filter(|m| m.state() == MinerState::Loaded)
    }

    /// Attribute names of the restored model, or of the attached table
    pub fn attribute_names(&self) -> Result<Vec<String>, MiningError> {
        if let Some(miner) = self.restored() {
            return Ok(miner.attribute_names());
        }
        if let Some(table) = &self.table {
            return Ok(table.attribute_names());
        }
        self.miner
            .as_ref()
            .map(KMeansMiner::attribute_names)
            .ok_or(MiningError::NoTable)
    }

    pub fn attribute(&self, index: usize) -> Result<Attribute, MiningError> {
        let found = if let Some(miner) = self.restored() {
            miner.attribute(index)
        } else if let Some(table) = &self.table {
            table.attribute(index).cloned()
        } else if let Some(miner) = &self.miner {
            miner.attribute(index)
        } else {
            return Err(MiningError::NoTable);
        };

        found.ok_or_else(|| MiningError::NoSuchAttribute {
            index,
            count: self.attribute_names().map(|n| n.len()).unwrap_or(0),
        })
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
