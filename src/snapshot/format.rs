use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::clusterer::{Cluster, ClusterSet, MiningError};
use crate::data::{Attribute, ContinuousAttribute, DiscreteAttribute, Item, Tuple, Value};

/// Serialized column descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttributeRecord {
    Discrete {
        name: String,
        index: usize,
        values: Vec<String>,
    },
    Continuous {
        name: String,
        index: usize,
        min: f64,
        max: f64,
    },
}

impl AttributeRecord {
    pub fn name(&self) -> &str {
        match self {
            AttributeRecord::Discrete { name, .. } | AttributeRecord::Continuous { name, .. } => {
                name
            }
        }
    }

    fn encode(attribute: &Attribute) -> Self {
        match attribute {
            Attribute::Discrete(a) => AttributeRecord::Discrete {
                name: a.name().to_string(),
                index: a.index(),
                values: a.values().map(str::to_string).collect(),
            },
            Attribute::Continuous(a) => AttributeRecord::Continuous {
                name: a.name().to_string(),
                index: a.index(),
                min: a.min(),
                max: a.max(),
            },
        }
    }

    fn decode(self) -> Attribute {
        match self {
            AttributeRecord::Discrete {
                name,
                index,
                values,
            } => Attribute::from(DiscreteAttribute::new(
                name,
                index,
                values.into_iter().collect(),
            )),
            AttributeRecord::Continuous {
                name,
                index,
                min,
                max,
            } => Attribute::from(ContinuousAttribute::new(name, index, min, max)),
        }
    }
}

/// Serialized cluster: centroid values in schema order plus sorted members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub centroid: Vec<Value>,
    pub members: Vec<usize>,
}

/// Serialized cluster set; the schema is stored once and shared on decode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSetRecord {
    pub schema: Vec<AttributeRecord>,
    pub clusters: Vec<ClusterRecord>,
}

impl ClusterSetRecord {
    pub fn encode(clusters: &ClusterSet) -> Self {
        Self {
            schema: clusters.attributes().iter().map(AttributeRecord::encode).collect(),
            clusters: clusters
                .iter()
                .map(|c| ClusterRecord {
                    centroid: c.centroid().values(),
                    members: c.members().iter().copied().collect(),
                })
                .collect(),
        }
    }

    pub fn decode(self) -> Result<ClusterSet, MiningError> {
        let schema: Vec<Attribute> = self
            .schema
            .into_iter()
            .map(AttributeRecord::decode)
            .collect();

        for (position, attribute) in schema.iter().enumerate() {
            if attribute.index() != position {
                return Err(MiningError::Corrupt(format!(
                    "attribute {} stored at position {} claims index {}",
                    attribute.name(),
                    position,
                    attribute.index()
                )));
            }
        }

        let mut clusters = Vec::with_capacity(self.clusters.len());
        for (i, record) in self.clusters.into_iter().enumerate() {
            if record.centroid.len() != schema.len() {
                return Err(MiningError::Corrupt(format!(
                    "centroid {} has {} values for {} attributes",
                    i,
                    record.centroid.len(),
                    schema.len()
                )));
            }

            let items = schema
                .iter()
                .zip(record.centroid)
                .map(|(attribute, value)| Item::try_new(attribute, value))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| MiningError::Corrupt(format!("centroid {}: {}", i, e)))?;

            let members: BTreeSet<usize> = record.members.into_iter().collect();
            clusters.push(Cluster::with_members(Tuple::new(items), members));
        }

        Ok(ClusterSet::from_clusters(clusters))
    }
}
