//! SQL text construction.
//!
//! Writes go through positional arguments; only identifiers (table and column
//! names) are spliced into the SQL text, and those are checked first.

use itertools::Itertools;

use crate::turso::error::DatabaseError;
use crate::turso::protocol::{SqlValue, Statement};

/// Double every single quote so the text can sit inside a SQL string literal
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\'', "''")
}

/// `value` as a complete SQL string literal, quotes included
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

pub fn validate_identifier(name: &str) -> Result<&str, DatabaseError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(name)
    } else {
        Err(DatabaseError::InvalidIdentifier(name.to_string()))
    }
}

pub fn insert(table: &str, values: Vec<(&str, SqlValue)>) -> Result<Statement, DatabaseError> {
    validate_identifier(table)?;
    let columns = values
        .iter()
        .map(|(column, _)| validate_identifier(column))
        .collect::<Result<Vec<_>, _>>()?;
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.iter().join(", "),
        std::iter::repeat("?").take(columns.len()).join(", ")
    );
    Ok(Statement::new(sql).with_args(values.into_iter().map(|(_, v)| v).collect()))
}

/// `INSERT ... ON CONFLICT(id) DO UPDATE` over every non-id column
pub fn upsert(table: &str, values: Vec<(&str, SqlValue)>) -> Result<Statement, DatabaseError> {
    let mut stmt = insert(table, values.clone())?;
    let assignments = values
        .iter()
        .filter(|(column, _)| *column != "id" && *column != "created_at")
        .map(|(column, _)| format!("{0} = excluded.{0}", column))
        .join(", ");
    stmt.sql = format!("{} ON CONFLICT(id) DO UPDATE SET {}", stmt.sql, assignments);
    Ok(stmt)
}

pub fn update(
    table: &str,
    id: &str,
    values: Vec<(&str, SqlValue)>,
) -> Result<Statement, DatabaseError> {
    validate_identifier(table)?;
    let assignments = values
        .iter()
        .map(|(column, _)| validate_identifier(column).map(|c| format!("{} = ?", c)))
        .collect::<Result<Vec<_>, _>>()?;
    let sql = format!("UPDATE {} SET {} WHERE id = ?", table, assignments.join(", "));
    let mut args: Vec<SqlValue> = values.into_iter().map(|(_, v)| v).collect();
    args.push(SqlValue::from(id));
    Ok(Statement::new(sql).with_args(args))
}

pub fn delete(table: &str, id: &str) -> Result<Statement, DatabaseError> {
    validate_identifier(table)?;
    Ok(Statement::new(format!("DELETE FROM {} WHERE id = ?", table)).arg(id))
}

pub fn delete_where(table: &str, column: &str, value: impl Into<SqlValue>) -> Result<Statement, DatabaseError> {
    validate_identifier(table)?;
    validate_identifier(column)?;
    Ok(Statement::new(format!("DELETE FROM {} WHERE {} = ?", table, column)).arg(value))
}

pub fn select_all(table: &str, order_by: &str) -> Result<Statement, DatabaseError> {
    validate_identifier(table)?;
    Ok(Statement::new(format!(
        "SELECT * FROM {} ORDER BY {}",
        table,
        order_clause(order_by)?
    )))
}

pub fn select_by_id(table: &str, id: &str) -> Result<Statement, DatabaseError> {
    validate_identifier(table)?;
    Ok(Statement::new(format!("SELECT * FROM {} WHERE id = ? LIMIT 1", table)).arg(id))
}

pub fn select_where(
    table: &str,
    column: &str,
    value: impl Into<SqlValue>,
    order_by: &str,
) -> Result<Statement, DatabaseError> {
    validate_identifier(table)?;
    validate_identifier(column)?;
    Ok(Statement::new(format!(
        "SELECT * FROM {} WHERE {} = ? ORDER BY {}",
        table,
        column,
        order_clause(order_by)?
    ))
    .arg(value))
}

/// Accepts `column` or `column ASC|DESC`
fn order_clause(order_by: &str) -> Result<String, DatabaseError> {
    let mut parts = order_by.split_whitespace();
    let column = validate_identifier(parts.next().unwrap_or(""))?;
    match (parts.next().map(|d| d.to_ascii_uppercase()), parts.next()) {
        (None, None) => Ok(column.to_string()),
        (Some(dir), None) if dir == "ASC" || dir == "DESC" => Ok(format!("{} {}", column, dir)),
        _ => Err(DatabaseError::InvalidIdentifier(order_by.to_string())),
    }
}
