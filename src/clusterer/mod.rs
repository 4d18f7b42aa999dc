mod cluster;
mod cluster_set;
mod error;
mod kmeans;


pub use cluster::Cluster;
pub use cluster_set::ClusterSet;
pub use error::MiningError;
pub use kmeans::{KMeansMiner, MinerState};
