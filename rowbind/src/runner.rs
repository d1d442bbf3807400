//! Statement execution with scoped connection lifecycle

use std::fmt;

use tracing::{debug, trace, warn};

use crate::binder::{self, record_transform, values_transform, RowCollector};
use crate::error::{Error, Result};
use crate::materialize::BindingPolicy;
use crate::statement::Statement;
use crate::traits::{Connection, ConnectionSource, Cursor, FromValue, Record, Row, RowExt};
use crate::value::Value;

/// Lifecycle of the connection owned by one execution.
///
/// `Idle -> Opened -> Iterating -> Closed` on success; `Closed` is reachable
/// from every phase on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Opened,
    Iterating,
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Opened => "opened",
            Phase::Iterating => "iterating",
            Phase::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Owns one connection for the duration of one call and closes it exactly
/// once, whatever the outcome of the work done with it.
struct ExecutionScope<C: Connection> {
    connection: C,
    phase: Phase,
    opened: bool,
}

impl<C: Connection> ExecutionScope<C> {
    fn new(connection: C) -> Self {
        Self {
            connection,
            phase: Phase::Idle,
            opened: false,
        }
    }

    fn transition(&mut self, next: Phase) {
        trace!(from = %self.phase, to = %next, "Connection phase");
        self.phase = next;
    }

    async fn open(&mut self) -> Result<()> {
        self.connection.open().await?;
        self.opened = true;
        self.transition(Phase::Opened);
        Ok(())
    }

    async fn query(&mut self, statement: &Statement) -> Result<Box<dyn Cursor + '_>> {
        self.transition(Phase::Iterating);
        self.connection.query(statement).await
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.transition(Phase::Iterating);
        self.connection.execute(statement).await
    }

    /// Close the connection and hand back `outcome`.
    ///
    /// The body's error wins over a close error; the latter is logged.
    async fn finish<T>(mut self, outcome: Result<T>) -> Result<T> {
        let closed = if self.opened {
            self.connection.close().await
        } else {
            Ok(())
        };
        self.transition(Phase::Closed);

        match (outcome, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                warn!(error = %close_err, "Failed to close connection after an earlier error");
                Err(e)
            }
        }
    }
}

impl<C: Connection> Drop for ExecutionScope<C> {
    fn drop(&mut self) {
        if self.opened && self.phase != Phase::Closed {
            warn!(phase = %self.phase, "Execution dropped before its connection was closed");
        }
    }
}

/// Executes statements against connections produced by a [`ConnectionSource`].
///
/// Every call constructs its own connection, opens it, runs one statement,
/// and closes it before returning, including when the statement, the
/// driver, or a row handler fails. Nothing is retried.
///
/// # Example
///
/// ```ignore
/// use rowbind::{MySqlSource, Statement, StatementRunner};
///
/// let runner = StatementRunner::new(MySqlSource::from_url("mysql://root@localhost/app"));
///
/// let users: Vec<User> = runner
///     .query(&Statement::new("SELECT Id, Name FROM Users WHERE Id = :id").bind("id", 3))
///     .await?;
///
/// let affected = runner
///     .execute_non_query(&Statement::new("DELETE FROM Users WHERE Id = :id").bind("id", 3))
///     .await?;
/// ```
pub struct StatementRunner<S> {
    source: S,
    policy: BindingPolicy,
}

impl<S: ConnectionSource> StatementRunner<S> {
    /// Create a runner with the strict binding policy.
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: BindingPolicy::Strict,
        }
    }

    /// Use `policy` when materializing records.
    pub fn with_policy(mut self, policy: BindingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn policy(&self) -> BindingPolicy {
        self.policy
    }

    /// Execute `statement` and call `handler` for every result row, in order.
    ///
    /// A handler error aborts the iteration; the cursor and connection are
    /// closed before it is returned.
    pub async fn execute<F>(&self, statement: &Statement, handler: F) -> Result<()>
    where
        F: FnMut(&dyn Row) -> Result<()> + Send,
    {
        debug!(
            sql = %statement.sql(),
            parameters = statement.parameters().len(),
            "Executing statement"
        );
        let mut scope = ExecutionScope::new(self.source.default_connection()?);

        let outcome: Result<u64> = async {
            scope.open().await?;
            let mut cursor = scope.query(statement).await?;
            binder::drain(cursor.as_mut(), handler).await
        }
        .await;

        let rows = scope.finish(outcome).await?;
        debug!(rows, "Statement completed");
        Ok(())
    }

    /// Execute `statement` and step through its rows without handling them.
    pub async fn execute_drop(&self, statement: &Statement) -> Result<()> {
        self.execute(statement, |_| Ok(())).await
    }

    /// Execute a statement that returns no rows and report the affected count.
    pub async fn execute_non_query(&self, statement: &Statement) -> Result<u64> {
        debug!(
            sql = %statement.sql(),
            parameters = statement.parameters().len(),
            "Executing non-query"
        );
        let mut scope = ExecutionScope::new(self.source.default_connection()?);

        let outcome: Result<u64> = async {
            scope.open().await?;
            scope.execute(statement).await
        }
        .await;

        let affected = scope.finish(outcome).await?;
        debug!(affected, "Non-query completed");
        Ok(affected)
    }

    /// Run a query and collect one `T` per row through `transform`.
    pub async fn query_with<T, F>(&self, statement: &Statement, transform: F) -> Result<Vec<T>>
    where
        T: Send,
        F: FnMut(&dyn Row) -> Result<T> + Send,
    {
        let mut collector = RowCollector::new(transform);
        self.execute(statement, |row| collector.push(row)).await?;
        Ok(collector.finish())
    }

    /// Run a query and materialize every row as `T` by column name.
    pub async fn query<T>(&self, statement: &Statement) -> Result<Vec<T>>
    where
        T: Record + Send,
    {
        self.query_with(statement, record_transform::<T>(self.policy))
            .await
    }

    /// Run a query and collect every row as a positional array.
    pub async fn query_values(&self, statement: &Statement) -> Result<Vec<Vec<Value>>> {
        self.query_with(statement, values_transform).await
    }

    /// Run a query and collect every row as the array built by `transform`.
    pub async fn query_values_with<F>(
        &self,
        statement: &Statement,
        transform: F,
    ) -> Result<Vec<Vec<Value>>>
    where
        F: FnMut(&dyn Row) -> Result<Vec<Value>> + Send,
    {
        self.query_with(statement, transform).await
    }

    /// Materialize the first row, if any. Remaining rows are still drained.
    pub async fn query_first<T>(&self, statement: &Statement) -> Result<Option<T>>
    where
        T: Record + Send,
    {
        let mut transform = record_transform::<T>(self.policy);
        let mut first = None;
        self.execute(statement, |row| {
            if first.is_none() {
                first = Some(transform(row)?);
            }
            Ok(())
        })
        .await?;
        Ok(first)
    }

    /// The first column of the first row.
    ///
    /// Fails if the query returns no rows or no columns.
    pub async fn query_scalar<T>(&self, statement: &Statement) -> Result<T>
    where
        T: FromValue + Send,
    {
        let mut first = None;
        self.execute(statement, |row| {
            if first.is_none() {
                first = Some(row.get::<T>(0)?);
            }
            Ok(())
        })
        .await?;
        first.ok_or_else(|| Error::Query("Expected one row, found none".to_string()))
    }
}

impl<S: fmt::Debug> fmt::Debug for StatementRunner<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatementRunner")
            .field("source", &self.source)
            .field("policy", &self.policy)
            .finish()
    }
}
