//! MySQL connection implementation

use std::fmt;

use crate::error::{Error, Result};
use crate::statement::Statement;
use crate::traits::{Connection, Cursor};
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::{Conn, Opts};
use tracing::trace;

use super::cursor::MySqlCursor;
use super::types::to_mysql_params;

/// A single, unpooled MySQL connection.
///
/// Constructed closed; [`open`](Connection::open) establishes the session
/// and [`close`](Connection::close) disconnects it.
pub struct MySqlConnection {
    opts: Opts,
    conn: Option<Conn>,
}

impl MySqlConnection {
    pub fn new(opts: Opts) -> Self {
        Self { opts, conn: None }
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn conn_mut(&mut self) -> Result<&mut Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| Error::Connection("connection is not open".into()))
    }
}

// Opts carry the password
impl fmt::Debug for MySqlConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConnection")
            .field("host", &self.opts.ip_or_hostname())
            .field("port", &self.opts.tcp_port())
            .field("open", &self.is_open())
            .finish()
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    async fn open(&mut self) -> Result<()> {
        if self.conn.is_none() {
            let conn = Conn::new(self.opts.clone()).await?;
            trace!(connection_id = conn.id(), "MySQL connection opened");
            self.conn = Some(conn);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            let connection_id = conn.id();
            conn.disconnect().await?;
            trace!(connection_id, "MySQL connection closed");
        }
        Ok(())
    }

    async fn query<'c>(&'c mut self, statement: &Statement) -> Result<Box<dyn Cursor + 'c>> {
        let params = to_mysql_params(statement.parameters())?;
        let sql = statement.sql().to_owned();
        let result = self.conn_mut()?.exec_iter(sql, params).await?;
        Ok(Box::new(MySqlCursor::new(result)))
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        let params = to_mysql_params(statement.parameters())?;
        let conn = self.conn_mut()?;
        conn.exec_drop(statement.sql(), params).await?;
        Ok(conn.affected_rows())
    }
}
