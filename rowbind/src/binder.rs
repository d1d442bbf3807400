//! Driving a cursor to completion and accumulating bound rows

use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::materialize::{to_positional_array, to_record_with, BindingPolicy};
use crate::traits::{Cursor, Record, Row};
use crate::value::Value;

/// Advance `cursor` to exhaustion, calling `handler` once per row in order.
///
/// The cursor is closed before returning on every path, including a failing
/// handler, which aborts the remaining iteration. Returns the number of rows
/// handed to `handler`.
pub async fn drain<'c, F>(cursor: &mut (dyn Cursor + 'c), mut handler: F) -> Result<u64>
where
    F: FnMut(&dyn Row) -> Result<()> + Send,
{
    let outcome: Result<u64> = async {
        let mut rows = 0u64;
        while cursor.advance().await? {
            let row = cursor
                .current()
                .ok_or_else(|| Error::Query("cursor advanced without a current row".into()))?;
            handler(row)?;
            rows += 1;
        }
        Ok(rows)
    }
    .await;

    let closed = cursor.close().await;
    match (outcome, closed) {
        (Ok(rows), Ok(())) => {
            trace!(rows, "Cursor drained");
            Ok(rows)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!(error = %close_err, "Failed to close cursor after an earlier error");
            Err(e)
        }
    }
}

/// Accumulates one transformed value per row, in row order.
///
/// Shared by the cursor-level `collect*` functions and by
/// [`StatementRunner`](crate::StatementRunner)'s query methods.
pub struct RowCollector<T, F> {
    items: Vec<T>,
    transform: F,
}

impl<T, F> RowCollector<T, F>
where
    F: FnMut(&dyn Row) -> Result<T>,
{
    pub fn new(transform: F) -> Self {
        Self {
            items: Vec::new(),
            transform,
        }
    }

    /// Transform `row` and append the result.
    pub fn push(&mut self, row: &dyn Row) -> Result<()> {
        let item = (self.transform)(row)?;
        self.items.push(item);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn finish(self) -> Vec<T> {
        self.items
    }
}

/// Record materializer for `T` under `policy`, usable as a collector transform.
pub fn record_transform<T: Record>(policy: BindingPolicy) -> impl FnMut(&dyn Row) -> Result<T> {
    move |row| to_record_with(row, policy)
}

/// Positional-array materializer, usable as a collector transform.
pub fn values_transform(row: &dyn Row) -> Result<Vec<Value>> {
    Ok(to_positional_array(row))
}

/// Collect every row through `transform`.
pub async fn collect_with<'c, T, F>(cursor: &mut (dyn Cursor + 'c), transform: F) -> Result<Vec<T>>
where
    T: Send,
    F: FnMut(&dyn Row) -> Result<T> + Send,
{
    let mut collector = RowCollector::new(transform);
    drain(cursor, |row| collector.push(row)).await?;
    Ok(collector.finish())
}

/// Collect every row materialized as `T` with the strict policy.
pub async fn collect<'c, T>(cursor: &mut (dyn Cursor + 'c)) -> Result<Vec<T>>
where
    T: Record + Send,
{
    collect_with(cursor, record_transform::<T>(BindingPolicy::Strict)).await
}

/// Collect every row as a positional array.
pub async fn collect_values<'c>(cursor: &mut (dyn Cursor + 'c)) -> Result<Vec<Vec<Value>>> {
    collect_with(cursor, values_transform).await
}

/// Collect every row as a positional array built by `transform`.
pub async fn collect_values_with<'c, F>(
    cursor: &mut (dyn Cursor + 'c),
    transform: F,
) -> Result<Vec<Vec<Value>>>
where
    F: FnMut(&dyn Row) -> Result<Vec<Value>> + Send,
{
    collect_with(cursor, transform).await
}
