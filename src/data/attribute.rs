use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::table::{RowTable, Value};

/// A categorical column with a lexicographically ordered domain
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteAttribute {
    name: String,
    index: usize,
    values: BTreeSet<String>,
}

impl DiscreteAttribute {
    pub fn new(name: impl Into<String>, index: usize, values: BTreeSet<String>) -> Self {
        Self {
            name: name.into(),
            index,
            values,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Domain cardinality
    pub fn distinct_values(&self) -> usize {
        self.values.len()
    }

    /// Domain values in lexicographic order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    /// Count the rows in `ids` whose value in this column equals `value`
    pub fn frequency<'a>(
        &self,
        table: &RowTable,
        ids: impl IntoIterator<Item = &'a usize>,
        value: &str,
    ) -> usize {
        ids.into_iter()
            .filter(|&&id| matches!(table.value(id, self.index), Value::Text(v) if v == value))
            .count()
    }
}

/// A numeric column with the range observed over the whole table
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuousAttribute {
    name: String,
    index: usize,
    min: f64,
    max: f64,
}

impl ContinuousAttribute {
    pub fn new(name: impl Into<String>, index: usize, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            index,
            min,
            max,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Min-max normalization into [0, 1].
    ///
    /// A degenerate range (every observed value equal) scales to 0.
    pub fn scaled_value(&self, v: f64) -> f64 {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 0.0;
        }
        (v - self.min) / range
    }
}

/// Column descriptor shared by every item of that column.
///
/// Cloning is cheap: both variants are reference counted.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Discrete(Arc<DiscreteAttribute>),
    Continuous(Arc<ContinuousAttribute>),
}

impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Attribute::Discrete(a) => a.name(),
            Attribute::Continuous(a) => a.name(),
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Attribute::Discrete(a) => a.index(),
            Attribute::Continuous(a) => a.index(),
        }
    }

    pub fn is_discrete(&self) -> bool {
        matches!(self, Attribute::Discrete(_))
    }
}

impl From<DiscreteAttribute> for Attribute {
    fn from(attribute: DiscreteAttribute) -> Self {
        Attribute::Discrete(Arc::new(attribute))
    }
}

impl From<ContinuousAttribute> for Attribute {
    fn from(attribute: ContinuousAttribute) -> Self {
        Attribute::Continuous(Arc::new(attribute))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
