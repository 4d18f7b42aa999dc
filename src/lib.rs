// Public API exports
pub mod clusterer;
pub mod data;
pub mod db;
pub mod session;
pub mod snapshot;

// Re-export main types for convenience
pub use data::{
    Attribute, ColumnKind, ContinuousAttribute, DataError, DiscreteAttribute, Item, RowTable,
    RowTableBuilder, Tuple, Value,
};

pub use clusterer::{Cluster, ClusterSet, KMeansMiner, MinerState, MiningError};

pub use snapshot::{SnapshotStore, snapshot_name};

pub use db::TableSource;

pub use session::{RunSummary, Session};
