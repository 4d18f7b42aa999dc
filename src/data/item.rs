use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::attribute::{Attribute, ContinuousAttribute, DiscreteAttribute};
use super::error::DataError;
use super::table::{RowTable, Value};

/// A single cell bound to the attribute of its column
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Discrete {
        attribute: Arc<DiscreteAttribute>,
        value: String,
    },
    Continuous {
        attribute: Arc<ContinuousAttribute>,
        value: f64,
    },
}

impl Item {
    /// Bind `value` to `attribute`, checking that the value kind matches
    pub fn try_new(attribute: &Attribute, value: Value) -> Result<Self, DataError> {
        match (attribute, value) {
            (Attribute::Discrete(a), Value::Text(value)) => Ok(Item::Discrete {
                attribute: Arc::clone(a),
                value,
            }),
            (Attribute::Continuous(a), Value::Number(value)) => Ok(Item::Continuous {
                attribute: Arc::clone(a),
                value,
            }),
            (attribute, _) => Err(DataError::TypeMismatch {
                column: attribute.name().to_string(),
                expected: if attribute.is_discrete() {
                    "text"
                } else {
                    "numeric"
                },
            }),
        }
    }

    pub fn attribute(&self) -> Attribute {
        match self {
            Item::Discrete { attribute, .. } => Attribute::Discrete(Arc::clone(attribute)),
            Item::Continuous { attribute, .. } => Attribute::Continuous(Arc::clone(attribute)),
        }
    }

    pub fn value(&self) -> Value {
        match self {
            Item::Discrete { value, .. } => Value::Text(value.clone()),
            Item::Continuous { value, .. } => Value::Number(*value),
        }
    }

    /// Per-column distance, always within [0, 1] for in-range values.
    ///
    /// Discrete cells contribute a 0/1 mismatch indicator; continuous cells
    /// contribute the absolute difference of their normalized values.
    ///
    /// # Panics
    /// If the two items belong to columns of different kinds.
    pub fn distance(&self, other: &Item) -> f64 {
        match (self, other) {
            (Item::Discrete { value: a, .. }, Item::Discrete { value: b, .. }) => {
                if a == b {
                    0.0
                } else {
                    1.0
                }
            }
            (
                Item::Continuous {
                    attribute: attr_a,
                    value: a,
                },
                Item::Continuous {
                    attribute: attr_b,
                    value: b,
                },
            ) => (attr_a.scaled_value(*a) - attr_b.scaled_value(*b)).abs(),
            _ => panic!(
                "distance between mismatched columns {} and {}",
                self.attribute(),
                other.attribute()
            ),
        }
    }

    /// Overwrite this cell with the prototype of `ids` for its column.
    ///
    /// An empty membership set leaves the value untouched.
    pub fn update(&mut self, table: &RowTable, ids: &BTreeSet<usize>) {
        match self {
            Item::Discrete { attribute, value } => {
                if let Some(mode) = table.discrete_prototype(ids, attribute) {
                    *value = mode;
                }
            }
            Item::Continuous { attribute, value } => {
                if let Some(mean) = table.continuous_prototype(ids, attribute) {
                    *value = mean;
                }
            }
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Item::Discrete { value, .. } => f.write_str(value),
            Item::Continuous { value, .. } => write!(f, "{}", value),
        }
    }
}
