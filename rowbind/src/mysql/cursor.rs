//! MySQL cursor implementation

use std::sync::Arc;

use crate::error::Result;
use crate::traits::{Cursor, Row};
use async_trait::async_trait;
use mysql_async::{BinaryProtocol, QueryResult};

use super::row::{column_names, MySqlRow};

/// Streams the rows of one statement's result set.
///
/// Rows are fetched one at a time as the cursor advances. The cursor
/// borrows its connection, so it must be closed (or dropped) before the
/// connection can be used or closed again.
pub struct MySqlCursor<'c> {
    result: Option<QueryResult<'c, 'static, BinaryProtocol>>,
    columns: Option<Arc<[String]>>,
    current: Option<MySqlRow>,
}

impl<'c> MySqlCursor<'c> {
    pub fn new(result: QueryResult<'c, 'static, BinaryProtocol>) -> Self {
        Self {
            result: Some(result),
            columns: None,
            current: None,
        }
    }
}

#[async_trait]
impl<'c> Cursor for MySqlCursor<'c> {
    async fn advance(&mut self) -> Result<bool> {
        let Some(result) = self.result.as_mut() else {
            self.current = None;
            return Ok(false);
        };

        match result.next().await? {
            Some(row) => {
                let columns = self
                    .columns
                    .get_or_insert_with(|| column_names(&row))
                    .clone();
                self.current = Some(MySqlRow::from_mysql_row(row, Some(columns))?);
                Ok(true)
            }
            None => {
                self.current = None;
                Ok(false)
            }
        }
    }

    fn current(&self) -> Option<&dyn Row> {
        self.current.as_ref().map(|row| row as &dyn Row)
    }

    async fn close(&mut self) -> Result<()> {
        self.current = None;
        if let Some(result) = self.result.take() {
            result.drop_result().await?;
        }
        Ok(())
    }
}
