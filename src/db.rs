use anyhow::{Context, Result, bail};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::data::{ColumnKind, RowTable, RowTableBuilder, Value};

/// Quote an identifier for direct use in SQL
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Classify a declared column type, checking substrings in SQLite's
/// affinity order: INT, then text types, then the other numeric types.
/// Anything unrecognized is discrete.
fn column_kind(declared: &str) -> ColumnKind {
    let declared = declared.to_uppercase();
    if declared.contains("INT") {
        return ColumnKind::Continuous;
    }
    if ["CHAR", "CLOB", "TEXT"].iter().any(|t| declared.contains(t)) {
        return ColumnKind::Discrete;
    }
    if ["REAL", "FLOA", "DOUB", "NUM", "DEC"]
        .iter()
        .any(|t| declared.contains(t))
    {
        return ColumnKind::Continuous;
    }
    ColumnKind::Discrete
}

/// SQLite-backed source of row tables
pub struct TableSource {
    conn: Connection,
}

impl TableSource {
    /// Open an existing database file
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .context(format!("Failed to open database at {}", path))?;
        Ok(Self { conn })
    }

    /// Create a new in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .context("Failed to create in-memory database")?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Names of the user tables, sorted
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .context("Failed to prepare statement")?;

        let names = stmt
            .query_map([], |row| row.get(0))
            .context("Failed to query table names")?
            .collect::<Result<Vec<String>, _>>()
            .context("Failed to collect table names")?;

        Ok(names)
    }

    /// Column names and kinds, in declaration order
    pub fn columns(&self, table: &str) -> Result<Vec<(String, ColumnKind)>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Failed to prepare statement")?;

        let columns = stmt
            .query_map([], |row| {
                let name: String = row.get(1)?;
                let declared: String = row.get(2)?;
                Ok((name, column_kind(&declared)))
            })
            .context(format!("Failed to read schema of {}", table))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to collect columns")?;

        if columns.is_empty() {
            bail!("Table {} does not exist", table);
        }
        Ok(columns)
    }

    /// Load the distinct rows of `table` with a schema derived from the
    /// declared column types
    pub fn load_table(&self, table: &str) -> Result<RowTable> {
        let columns = self.columns(table)?;
        debug!(table, columns = columns.len(), "discovered schema");

        let mut builder = columns
            .iter()
            .fold(RowTableBuilder::new(table), |b, (name, kind)| {
                b.column(name.clone(), *kind)
            });

        let sql = format!("SELECT DISTINCT * FROM {}", quote_ident(table));
        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Failed to prepare statement")?;
        let mut rows = stmt
            .query([])
            .context(format!("Failed to query {}", table))?;

        let mut count = 0usize;
        while let Some(row) = rows.next().context("Failed to get next row")? {
            let mut values = Vec::with_capacity(columns.len());
            for (i, (name, kind)) in columns.iter().enumerate() {
                let cell = row.get_ref(i)?;
                values.push(convert_cell(cell, *kind).context(format!(
                    "Bad value in column {} of {}",
                    name, table
                ))?);
            }
            builder.push_row(values)?;
            count += 1;
        }

        let table = builder.build()?;
        info!(
            table = table.name(),
            fetched = count,
            distinct = table.len(),
            "loaded table"
        );
        Ok(table)
    }

    /// Create `table` with the given columns and insert `rows`.
    ///
    /// Used to seed databases for the CLI and tests.
    pub fn create_table(
        &self,
        table: &str,
        columns: &[(&str, ColumnKind)],
        rows: &[Vec<Value>],
    ) -> Result<()> {
        let defs: Vec<String> = columns
            .iter()
            .map(|(name, kind)| {
                let ty = match kind {
                    ColumnKind::Discrete => "TEXT",
                    ColumnKind::Continuous => "REAL",
                };
                format!("{} {}", quote_ident(name), ty)
            })
            .collect();
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE {} ({});",
                quote_ident(table),
                defs.join(", ")
            ))
            .context(format!("Failed to create table {}", table))?;

        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} VALUES ({})",
            quote_ident(table),
            placeholders.join(", ")
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Failed to prepare statement")?;
        for row in rows {
            let params = rusqlite::params_from_iter(row.iter().map(|v| match v {
                Value::Text(s) => rusqlite::types::Value::Text(s.clone()),
                Value::Number(n) => rusqlite::types::Value::Real(*n),
            }));
            stmt.execute(params)
                .context(format!("Failed to insert into {}", table))?;
        }
        Ok(())
    }

    /// Number of rows in `table`, duplicates included
    pub fn row_count(&self, table: &str) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row(
                &format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
                params![],
                |row| row.get(0),
            )
            .context(format!("Failed to count rows of {}", table))?;
        Ok(count as u64)
    }
}

fn convert_cell(cell: ValueRef<'_>, kind: ColumnKind) -> Result<Value> {
    Ok(match (kind, cell) {
        (_, ValueRef::Null) => bail!("NULL values are not supported"),
        (ColumnKind::Continuous, ValueRef::Integer(i)) => Value::Number(i as f64),
        (ColumnKind::Continuous, ValueRef::Real(f)) => Value::Number(f),
        (ColumnKind::Continuous, ValueRef::Text(t)) => {
            let text = String::from_utf8_lossy(t);
            Value::Number(
                text.trim()
                    .parse()
                    .context(format!("{} is not a number", text))?,
            )
        }
        (ColumnKind::Discrete, ValueRef::Integer(i)) => Value::Text(i.to_string()),
        (ColumnKind::Discrete, ValueRef::Real(f)) => Value::Text(f.to_string()),
        (ColumnKind::Discrete, ValueRef::Text(t)) => {
            Value::Text(String::from_utf8_lossy(t).into_owned())
        }
        (_, ValueRef::Blob(_)) => bail!("BLOB values are not supported"),
    })
}
