use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::logic::json_text::decode_json_text;
use crate::turso::error::DatabaseError;
use crate::turso::protocol::{SqlValue, StmtResult};

/// Decoded result of one statement
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub affected_row_count: u64,
    pub last_insert_rowid: Option<i64>,
}

impl QueryResult {
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Decode every row into `T`
    pub fn decode<T: FromRow>(&self) -> Result<Vec<T>, DatabaseError> {
        self.rows.iter().map(T::from_row).collect()
    }

    pub fn decode_first<T: FromRow>(&self) -> Result<Option<T>, DatabaseError> {
        self.rows.first().map(T::from_row).transpose()
    }
}

impl From<StmtResult> for QueryResult {
    fn from(result: StmtResult) -> Self {
        let columns: Vec<String> = result
            .cols
            .iter()
            .enumerate()
            .map(|(i, c)| c.name.clone().unwrap_or_else(|| format!("col{}", i)))
            .collect();
        let index: Arc<HashMap<String, usize>> = Arc::new(
            columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect(),
        );
        let rows = result
            .rows
            .into_iter()
            .map(|values| Row {
                index: Arc::clone(&index),
                values,
            })
            .collect();

        Self {
            columns,
            rows,
            affected_row_count: result.affected_row_count,
            last_insert_rowid: result.last_insert_rowid.and_then(|id| id.parse().ok()),
        }
    }
}

/// One result row, addressable by column name
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    index: Arc<HashMap<String, usize>>,
    values: Vec<SqlValue>,
}

impl Row {
    /// Build a row from explicit (column, value) pairs
    pub fn from_pairs(pairs: Vec<(&str, SqlValue)>) -> Self {
        let index = pairs
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.to_string(), i))
            .collect();
        Self {
            index: Arc::new(index),
            values: pairs.into_iter().map(|(_, v)| v).collect(),
        }
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.index.get(column).and_then(|&i| self.values.get(i))
    }

    fn require(&self, column: &str) -> Result<&SqlValue, DatabaseError> {
        self.get(column)
            .ok_or_else(|| DatabaseError::Decode(format!("missing column `{}`", column)))
    }

    /// Text value; numbers are rendered, NULL is an error
    pub fn text(&self, column: &str) -> Result<String, DatabaseError> {
        self.opt_text(column)?
            .ok_or_else(|| DatabaseError::Decode(format!("column `{}` is NULL", column)))
    }

    /// Text value with NULL and absent columns read as empty
    pub fn text_or_empty(&self, column: &str) -> String {
        self.opt_text(column).ok().flatten().unwrap_or_default()
    }

    pub fn opt_text(&self, column: &str) -> Result<Option<String>, DatabaseError> {
        match self.require(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(s) => Ok(Some(s.clone())),
            SqlValue::Integer(n) => Ok(Some(n.to_string())),
            SqlValue::Float(f) => Ok(Some(f.to_string())),
            SqlValue::Blob(_) => Err(DatabaseError::Decode(format!(
                "column `{}` is a blob, expected text",
                column
            ))),
        }
    }

    /// Integer value; NULL, blank and absent read as 0
    pub fn int(&self, column: &str) -> Result<i64, DatabaseError> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(0),
            Some(SqlValue::Integer(n)) => Ok(*n),
            Some(SqlValue::Float(f)) => Ok(*f as i64),
            Some(SqlValue::Text(s)) if s.trim().is_empty() => Ok(0),
            Some(SqlValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .or_else(|_| s.trim().parse::<f64>().map(|f| f as i64))
                .map_err(|_| {
                    DatabaseError::Decode(format!("column `{}`: {:?} is not a number", column, s))
                }),
            Some(SqlValue::Blob(_)) => Err(DatabaseError::Decode(format!(
                "column `{}` is a blob, expected integer",
                column
            ))),
        }
    }

    /// Float value; NULL, blank and absent read as 0.0
    pub fn float(&self, column: &str) -> Result<f64, DatabaseError> {
        match self.get(column) {
            None | Some(SqlValue::Null) => Ok(0.0),
            Some(SqlValue::Integer(n)) => Ok(*n as f64),
            Some(SqlValue::Float(f)) => Ok(*f),
            Some(SqlValue::Text(s)) if s.trim().is_empty() => Ok(0.0),
            Some(SqlValue::Text(s)) => s.trim().parse::<f64>().map_err(|_| {
                DatabaseError::Decode(format!("column `{}`: {:?} is not a number", column, s))
            }),
            Some(SqlValue::Blob(_)) => Err(DatabaseError::Decode(format!(
                "column `{}` is a blob, expected number",
                column
            ))),
        }
    }

    pub fn bool(&self, column: &str) -> Result<bool, DatabaseError> {
        match self.get(column) {
            Some(SqlValue::Text(s)) => Ok(matches!(s.trim(), "1" | "true" | "TRUE" | "True")),
            _ => Ok(self.int(column)? != 0),
        }
    }

    /// JSON-in-text column, decoded leniently
    pub fn json<T: DeserializeOwned + Default>(&self, column: &str) -> T {
        let raw = match self.get(column) {
            Some(SqlValue::Text(s)) => Some(s.as_str()),
            _ => None,
        };
        decode_json_text(column, raw)
    }
}

/// Entities that can be decoded from a result row
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, DatabaseError>;
}

/// Entities that can be written as (column, value) pairs; `id` comes first
pub trait ToRow {
    fn to_row(&self) -> Vec<(&'static str, SqlValue)>;
}
