use std::collections::BTreeSet;
use std::fmt;

use super::item::Item;
use super::table::{RowTable, Value};

/// One full row: an item per schema column, index-aligned with the schema
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    items: Vec<Item>,
}

impl Tuple {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Item> {
        self.items.get(i)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    // Slice, not Vec: the length of a tuple never changes.
    pub(crate) fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    pub fn values(&self) -> Vec<Value> {
        self.items.iter().map(Item::value).collect()
    }

    /// City-block sum of the per-column item distances
    pub fn distance(&self, other: &Tuple) -> f64 {
        self.items
            .iter()
            .zip(other.items.iter())
            .map(|(a, b)| a.distance(b))
            .sum()
    }

    /// Mean distance from this tuple to the rows in `ids` (0 when empty)
    pub fn avg_distance(&self, table: &RowTable, ids: &BTreeSet<usize>) -> f64 {
        if ids.is_empty() {
            return 0.0;
        }
        let total: f64 = ids
            .iter()
            .map(|&id| self.distance(&table.tuple(id)))
            .sum();
        total / ids.len() as f64
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            write!(f, " {} ", item)?;
        }
        Ok(())
    }
}
