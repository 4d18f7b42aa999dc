mod attribute;
mod error;
mod item;
mod table;
mod tuple;

#[cfg(test)]
mod tests;

pub use attribute::{Attribute, ContinuousAttribute, DiscreteAttribute};
pub use error::DataError;
pub use item::Item;
pub use table::{ColumnKind, RowTable, RowTableBuilder, Value};
pub use tuple::Tuple;
