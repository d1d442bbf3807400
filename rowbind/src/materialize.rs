//! Materialization of a single row into values or records

use tracing::debug;

use crate::error::{Error, Result};
use crate::traits::{Record, Row};
use crate::value::Value;

/// How a field whose value cannot be converted is treated.
///
/// Columns with no matching field are skipped under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BindingPolicy {
    /// Fail the whole row on the first field that cannot be converted.
    #[default]
    Strict,
    /// Leave that field at its default and keep binding the rest.
    Lenient,
}

/// Outcome of assigning one column to a record under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// The value was converted and stored.
    Set,
    /// The record has no field with this name.
    NoSuchField,
    /// The field exists but the value could not be converted (lenient only).
    Skipped,
}

/// Builds a record from its default value, one `(field, value)` at a time.
///
/// ```ignore
/// let mut builder = RecordBuilder::<User>::new(BindingPolicy::Strict);
/// builder.set("Id", Value::I64(3))?;
/// builder.set("Name", Value::from("alice"))?;
/// let user = builder.finish();
/// ```
#[derive(Debug)]
pub struct RecordBuilder<T> {
    record: T,
    policy: BindingPolicy,
}

impl<T: Record> RecordBuilder<T> {
    pub fn new(policy: BindingPolicy) -> Self {
        Self {
            record: T::default(),
            policy,
        }
    }

    /// Assign `value` to the field named `column`.
    pub fn set(&mut self, column: &str, value: Value) -> Result<FieldOutcome> {
        match self.record.set_field(column, value) {
            Ok(true) => Ok(FieldOutcome::Set),
            Ok(false) => Ok(FieldOutcome::NoSuchField),
            Err(e) => match self.policy {
                BindingPolicy::Strict => Err(Error::binding(column, e)),
                BindingPolicy::Lenient => {
                    debug!(column, error = %e, "Skipping field that could not be bound");
                    Ok(FieldOutcome::Skipped)
                }
            },
        }
    }

    pub fn finish(self) -> T {
        self.record
    }
}

/// One value per column, in column order. SQL NULL stays `Value::Null`.
pub fn to_positional_array<R: Row + ?Sized>(row: &R) -> Vec<Value> {
    (0..row.column_count())
        .map(|i| row.value(i).cloned().unwrap_or(Value::Null))
        .collect()
}

/// Materialize a row into `T` with the strict policy.
pub fn to_record<T: Record, R: Row + ?Sized>(row: &R) -> Result<T> {
    to_record_with(row, BindingPolicy::Strict)
}

/// Materialize a row into `T`, matching column names to field names exactly.
///
/// Columns without a same-named field are ignored; fields without a column
/// keep their default value.
pub fn to_record_with<T: Record, R: Row + ?Sized>(row: &R, policy: BindingPolicy) -> Result<T> {
    let mut builder = RecordBuilder::<T>::new(policy);
    for index in 0..row.column_count() {
        let name = row
            .column_name(index)
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", index)))?;
        let value = row.value(index).cloned().unwrap_or(Value::Null);
        builder.set(name, value)?;
    }
    Ok(builder.finish())
}
