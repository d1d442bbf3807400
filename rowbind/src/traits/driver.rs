//! Driver traits the engine executes against

use crate::error::Result;
use crate::statement::Statement;
use crate::traits::Row;
use async_trait::async_trait;

/// A single database connection with an explicit open/close lifecycle.
///
/// A connection is owned by exactly one in-flight execution. It is
/// constructed closed by a [`ConnectionSource`](crate::ConnectionSource),
/// opened by the runner, and closed again before the runner returns.
#[async_trait]
pub trait Connection: Send {
    /// Establish the physical session.
    async fn open(&mut self) -> Result<()>;

    /// Release the physical session.
    ///
    /// Closing a connection that was never opened is a no-op.
    async fn close(&mut self) -> Result<()>;

    /// Bind the statement's parameters and open a forward-only cursor over
    /// its result rows. The cursor borrows the connection.
    async fn query<'c>(&'c mut self, statement: &Statement) -> Result<Box<dyn Cursor + 'c>>;

    /// Bind the statement's parameters and execute it, returning the number
    /// of affected rows.
    async fn execute(&mut self, statement: &Statement) -> Result<u64>;
}

/// A forward-only, single-pass cursor over result rows.
///
/// Every call to [`advance`](Cursor::advance) that returns `true` positions
/// the cursor on the next row; `current` then yields it until the next
/// advance.
#[async_trait]
pub trait Cursor: Send {
    /// Move to the next row. Returns `false` once the rows are exhausted.
    async fn advance(&mut self) -> Result<bool>;

    /// The row the cursor is positioned on.
    fn current(&self) -> Option<&dyn Row>;

    /// Discard any remaining rows. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}
