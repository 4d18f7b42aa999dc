use std::collections::BTreeSet;
use std::fmt;

use crate::data::{RowTable, Tuple};

/// A centroid tuple plus the indices of the rows assigned to it
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    centroid: Tuple,
    members: BTreeSet<usize>,
}

impl Cluster {
    /// New cluster with no members
    pub fn new(centroid: Tuple) -> Self {
        Self {
            centroid,
            members: BTreeSet::new(),
        }
    }

    pub(crate) fn with_members(centroid: Tuple, members: BTreeSet<usize>) -> Self {
        Self { centroid, members }
    }

    pub fn centroid(&self) -> &Tuple {
        &self.centroid
    }

    /// Member row indices in ascending order
    pub fn members(&self) -> &BTreeSet<usize> {
        &self.members
    }

    /// Returns true if `row` was not already a member
    pub fn add_row(&mut self, row: usize) -> bool {
        self.members.insert(row)
    }

    pub fn remove_row(&mut self, row: usize) -> bool {
        self.members.remove(&row)
    }

    pub fn contains(&self, row: usize) -> bool {
        self.members.contains(&row)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Overwrite every centroid item with the prototype of the current members
    pub fn recompute_centroid(&mut self, table: &RowTable) {
        for item in self.centroid.items_mut() {
            item.update(table, &self.members);
        }
    }

    /// Centroid, member rows with their distance to it, and the mean distance
    pub fn report(&self, table: &RowTable) -> String {
        Report {
            cluster: self,
            table,
        }
        .to_string()
    }
}

/// Display adapter pairing a cluster with the table its members index
struct Report<'a> {
    cluster: &'a Cluster,
    table: &'a RowTable,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Report { cluster, table } = self;
        writeln!(f, "{}", cluster)?;
        writeln!(f, "Examples:")?;
        for &id in &cluster.members {
            let cells: Vec<String> = table.row(id).iter().map(|v| v.to_string()).collect();
            writeln!(
                f,
                "[{}] dist={}",
                cells.join(" "),
                cluster.centroid.distance(&table.tuple(id))
            )?;
        }
        writeln!(
            f,
            "AvgDistance={}",
            cluster.centroid.avg_distance(table, &cluster.members)
        )
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Centroid=({})", self.centroid)
    }
}
