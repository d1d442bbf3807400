//! Row and Record traits for mapping cursor rows to Rust structs

use crate::error::{Error, Result};
use crate::value::Value;

/// The row a cursor is currently positioned on.
///
/// Columns are addressed by position; names are available for name-based
/// mapping. The trait is object safe so row handlers can take `&dyn Row`
/// regardless of the backend.
pub trait Row {
    /// Number of columns in the row.
    fn column_count(&self) -> usize;

    /// Name of the column at `index`, if it exists.
    fn column_name(&self, index: usize) -> Option<&str>;

    /// Raw value of the column at `index`, if it exists.
    fn value(&self, index: usize) -> Option<&Value>;

    /// Whether the column at `index` holds SQL NULL.
    ///
    /// A missing column is not null; it is absent.
    fn is_null(&self, index: usize) -> bool {
        self.value(index).is_some_and(Value::is_null)
    }

    /// Position of the first column with exactly this name.
    fn column_index(&self, column: &str) -> Option<usize> {
        (0..self.column_count()).find(|&i| self.column_name(i) == Some(column))
    }

    /// Get a value from the row by column name as a dynamic Value.
    ///
    /// Returns an error if the column doesn't exist.
    fn get_value(&self, column: &str) -> Result<Value> {
        self.column_index(column)
            .and_then(|i| self.value(i))
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))
    }
}

/// Extension trait for typed access to row values.
pub trait RowExt: Row {
    /// Get a typed value from the row by position.
    fn get<T: crate::FromValue>(&self, index: usize) -> Result<T> {
        let value = self
            .value(index)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", index)))?;
        T::from_value(value)
    }

    /// Get a typed value from the row by column name.
    fn get_by_name<T: crate::FromValue>(&self, column: &str) -> Result<T> {
        let value = self.get_value(column)?;
        T::from_value(value).map_err(|e| Error::binding(column, e))
    }
}

// Implement RowExt for all Row types, trait objects included
impl<R: Row + ?Sized> RowExt for R {}

/// A record type that rows can be materialized into.
///
/// A record is built by starting from `Default::default()` and assigning one
/// field per matching column. `set_field` is the mapping descriptor: it
/// matches the column name exactly (case-sensitive) against the record's
/// field names and converts the value to the field's declared type. SQL
/// NULL leaves a plain field at its default and sets an `Option` field to
/// `None` (see [`FromValue::from_field_value`]).
///
/// This trait is typically implemented via `#[derive(Record)]`.
///
/// # Manual Implementation
///
/// ```ignore
/// use rowbind::{FromValue, Record, Result, Value};
///
/// #[derive(Default)]
/// pub struct User {
///     pub id: i64,
///     pub name: String,
/// }
///
/// impl Record for User {
///     fn set_field(&mut self, column: &str, value: Value) -> Result<bool> {
///         match column {
///             "id" => self.id = FromValue::from_field_value(value)?,
///             "name" => self.name = FromValue::from_field_value(value)?,
///             _ => return Ok(false),
///         }
///         Ok(true)
///     }
///
///     fn field_names() -> &'static [&'static str] {
///         &["id", "name"]
///     }
/// }
/// ```
pub trait Record: Default {
    /// Assign `value` to the field named `column`.
    ///
    /// Returns `Ok(false)` when the record has no such field; the value is
    /// then discarded. Conversion failures are returned as errors.
    fn set_field(&mut self, column: &str, value: Value) -> Result<bool>;

    /// Names of the fields this record can be bound from.
    fn field_names() -> &'static [&'static str];
}
