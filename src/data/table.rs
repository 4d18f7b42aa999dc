use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use super::attribute::{Attribute, ContinuousAttribute, DiscreteAttribute};
use super::error::DataError;
use super::item::Item;
use super::tuple::Tuple;

/// A raw cell as delivered by the data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Kind of a column, decided by the data source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Discrete,
    Continuous,
}

/// Hashable image of a row, used to collapse duplicates
#[derive(Hash, PartialEq, Eq)]
enum CellKey<'a> {
    Text(&'a str),
    Number(u64),
}

fn row_key(row: &[Value]) -> Vec<CellKey<'_>> {
    row.iter()
        .map(|v| match v {
            Value::Text(s) => CellKey::Text(s),
            // -0.0 and 0.0 compare equal, so they must share a key
            Value::Number(n) if *n == 0.0 => CellKey::Number(0.0f64.to_bits()),
            Value::Number(n) => CellKey::Number(n.to_bits()),
        })
        .collect()
}

/// Immutable table of distinct rows sharing one schema
#[derive(Debug, Clone)]
pub struct RowTable {
    name: String,
    schema: Vec<Attribute>,
    rows: Vec<Vec<Value>>,
}

/// Mutable builder for constructing a row table
pub struct RowTableBuilder {
    name: String,
    columns: Vec<(String, ColumnKind)>,
    rows: Vec<Vec<Value>>,
}

impl RowTableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Append a column to the schema
    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.push((name.into(), kind));
        self
    }

    pub fn discrete(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnKind::Discrete)
    }

    pub fn continuous(self, name: impl Into<String>) -> Self {
        self.column(name, ColumnKind::Continuous)
    }

    /// Add a row, checking its arity and cell kinds against the columns
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), DataError> {
        if row.len() != self.columns.len() {
            return Err(DataError::ArityMismatch {
                expected: self.columns.len(),
                found: row.len(),
            });
        }

        for ((name, kind), value) in self.columns.iter().zip(row.iter()) {
            match (kind, value) {
                (ColumnKind::Discrete, Value::Text(_)) => {}
                (ColumnKind::Continuous, Value::Number(n)) if n.is_finite() => {}
                (ColumnKind::Continuous, Value::Number(_)) => {
                    return Err(DataError::NonFinite {
                        column: name.clone(),
                    });
                }
                (ColumnKind::Discrete, _) => {
                    return Err(DataError::TypeMismatch {
                        column: name.clone(),
                        expected: "text",
                    });
                }
                (ColumnKind::Continuous, _) => {
                    return Err(DataError::TypeMismatch {
                        column: name.clone(),
                        expected: "numeric",
                    });
                }
            }
        }

        self.rows.push(row);
        Ok(())
    }

    /// Chaining form of [`push_row`](Self::push_row)
    pub fn row(mut self, row: Vec<Value>) -> Result<Self, DataError> {
        self.push_row(row)?;
        Ok(self)
    }

    /// Collapse duplicate rows and derive the schema from what remains
    pub fn build(self) -> Result<RowTable, DataError> {
        if self.columns.is_empty() {
            return Err(DataError::NoColumns(self.name));
        }
        if self.rows.is_empty() {
            return Err(DataError::EmptyTable(self.name));
        }

        // First occurrence wins
        let mut keep = Vec::with_capacity(self.rows.len());
        {
            let mut seen = HashSet::new();
            for row in &self.rows {
                keep.push(seen.insert(row_key(row)));
            }
        }
        let rows: Vec<Vec<Value>> = self
            .rows
            .into_iter()
            .zip(keep)
            .filter_map(|(row, keep)| keep.then_some(row))
            .collect();

        let schema = self
            .columns
            .into_iter()
            .enumerate()
            .map(|(index, (name, kind))| match kind {
                ColumnKind::Discrete => {
                    let values: BTreeSet<String> = rows
                        .iter()
                        .filter_map(|row| row[index].as_text())
                        .map(str::to_string)
                        .collect();
                    Ok(Attribute::from(DiscreteAttribute::new(name, index, values)))
                }
                ColumnKind::Continuous => {
                    let (min, max) = rows
                        .iter()
                        .filter_map(|row| row[index].as_number())
                        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                            (lo.min(v), hi.max(v))
                        });
                    // Scaling divides by the range, so it must be finite
                    if !(max - min).is_finite() {
                        return Err(DataError::RangeOverflow {
                            column: name,
                            min,
                            max,
                        });
                    }
                    Ok(Attribute::from(ContinuousAttribute::new(name, index, min, max)))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RowTable {
            name: self.name,
            schema,
            rows,
        })
    }
}

impl RowTable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of attribute-wise distinct rows; equal to `len()` since
    /// duplicates are collapsed on construction
    pub fn distinct_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.schema.len()
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.schema.get(index)
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.schema
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.schema.iter().map(|a| a.name().to_string()).collect()
    }

    /// Raw cell at (`row`, `column`)
    pub fn value(&self, row: usize, column: usize) -> &Value {
        &self.rows[row][column]
    }

    pub fn row(&self, row: usize) -> &[Value] {
        &self.rows[row]
    }

    /// Materialize a row as a tuple bound to the schema
    pub fn tuple(&self, row: usize) -> Tuple {
        let items = self
            .schema
            .iter()
            .zip(self.rows[row].iter())
            .map(|(attribute, value)| match (attribute, value) {
                (Attribute::Discrete(a), Value::Text(v)) => Item::Discrete {
                    attribute: a.clone(),
                    value: v.clone(),
                },
                (Attribute::Continuous(a), Value::Number(v)) => Item::Continuous {
                    attribute: a.clone(),
                    value: *v,
                },
                // The builder checks every cell against its column.
                _ => unreachable!("row {} does not match column {}", row, attribute),
            })
            .collect();
        Tuple::new(items)
    }

    /// Full attribute-vector comparison of two rows
    pub fn rows_equal(&self, i: usize, j: usize) -> bool {
        self.rows[i] == self.rows[j]
    }

    /// Draw `k` row indices uniformly without replacement, no two of them
    /// attribute-wise equal.
    pub fn sample<R: Rng + ?Sized>(&self, k: usize, rng: &mut R) -> Result<Vec<usize>, DataError> {
        let max = self.distinct_rows();
        if k == 0 || k > max {
            return Err(DataError::OutOfRange { k, max });
        }

        let mut chosen: Vec<usize> = Vec::with_capacity(k);
        for candidate in index::sample(rng, self.len(), self.len()).into_iter() {
            if chosen.iter().all(|&c| !self.rows_equal(c, candidate)) {
                chosen.push(candidate);
                if chosen.len() == k {
                    return Ok(chosen);
                }
            }
        }

        Err(DataError::OutOfRange {
            k,
            max: chosen.len(),
        })
    }

    /// Prototype value of `ids` for `attribute`: the mode for discrete
    /// columns, the mean for continuous ones. `None` for an empty set.
    pub fn compute_prototype(&self, ids: &BTreeSet<usize>, attribute: &Attribute) -> Option<Value> {
        match attribute {
            Attribute::Discrete(a) => self.discrete_prototype(ids, a).map(Value::Text),
            Attribute::Continuous(a) => self.continuous_prototype(ids, a).map(Value::Number),
        }
    }

    /// Most frequent domain value; ties go to the earliest value in domain order
    pub fn discrete_prototype(
        &self,
        ids: &BTreeSet<usize>,
        attribute: &DiscreteAttribute,
    ) -> Option<String> {
        let mut max_freq = 0;
        let mut mode = None;
        for value in attribute.values() {
            let freq = attribute.frequency(self, ids, value);
            if freq > max_freq {
                max_freq = freq;
                mode = Some(value);
            }
        }
        mode.map(str::to_string)
    }

    /// Mean of the raw values in the attribute's own column.
    ///
    /// Accumulated incrementally so the result stays inside [min, max] even
    /// when the plain sum would overflow.
    pub fn continuous_prototype(
        &self,
        ids: &BTreeSet<usize>,
        attribute: &ContinuousAttribute,
    ) -> Option<f64> {
        if ids.is_empty() {
            return None;
        }
        let column = attribute.index();
        let mut mean: f64 = 0.0;
        for (n, v) in ids
            .iter()
            .filter_map(|&id| self.value(id, column).as_number())
            .enumerate()
        {
            mean += (v - mean) / (n + 1) as f64;
        }
        Some(mean.max(attribute.min()).min(attribute.max()))
    }
}

impl fmt::Display for RowTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            write!(f, "{}: ", i + 1)?;
            let cells: Vec<String> = row.iter().map(Value::to_string).collect();
            writeln!(f, "{}", cells.join(", "))?;
        }
        Ok(())
    }
}
