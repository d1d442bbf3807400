//! MySQL row implementation

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::traits::Row;
use crate::value::Value;
use mysql_async::Row as MySqlAsyncRow;

use super::types::from_mysql_value;

/// A MySQL result row with its values already converted.
///
/// Column names are shared between all rows of one result set.
#[derive(Debug, Clone)]
pub struct MySqlRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl MySqlRow {
    /// Convert a mysql_async Row, reusing `columns` when the caller already
    /// has the result set's names.
    pub fn from_mysql_row(row: MySqlAsyncRow, columns: Option<Arc<[String]>>) -> Result<Self> {
        let columns = columns.unwrap_or_else(|| column_names(&row));
        let values = (0..row.len())
            .map(|i| {
                row.as_ref(i).cloned().map(from_mysql_value).ok_or_else(|| {
                    Error::ColumnNotFound(columns.get(i).cloned().unwrap_or_default())
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &Arc<[String]> {
        &self.columns
    }
}

/// Column names of `row`, in order.
pub fn column_names(row: &MySqlAsyncRow) -> Arc<[String]> {
    row.columns_ref()
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect()
}

impl Row for MySqlRow {
    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn column_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}
