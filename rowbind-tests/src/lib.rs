//! In-memory fixture driver for exercising rowbind without a database.
//!
//! A [`FixtureSource`] serves canned rows or affected counts and records what
//! the engine did with its connections and cursors in a shared [`Probe`], so
//! tests can assert that every opened connection was closed exactly once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rowbind::{Connection, ConnectionSource, Cursor, Error, Result, Row, Statement, Value};

/// URL scheme the fixture source accepts.
pub const FIXTURE_URL: &str = "fixture://memory";

#[derive(Default)]
struct Counters {
    constructed: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    cursors_opened: AtomicUsize,
    cursors_closed: AtomicUsize,
    advances: AtomicUsize,
    statements: Mutex<Vec<Statement>>,
}

/// Shared view of everything the fixture driver was asked to do.
#[derive(Clone, Default)]
pub struct Probe {
    counters: Arc<Counters>,
}

impl Probe {
    /// Connections constructed by the source.
    pub fn constructed(&self) -> usize {
        self.counters.constructed.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Calls to `Connection::close`, whether or not the connection was open.
    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    /// Connections opened and not yet closed.
    pub fn open_connections(&self) -> usize {
        self.opened().saturating_sub(self.closed())
    }

    pub fn cursors_opened(&self) -> usize {
        self.counters.cursors_opened.load(Ordering::SeqCst)
    }

    pub fn cursors_closed(&self) -> usize {
        self.counters.cursors_closed.load(Ordering::SeqCst)
    }

    /// Calls to `Cursor::advance`, including the one reporting exhaustion.
    pub fn advances(&self) -> usize {
        self.counters.advances.load(Ordering::SeqCst)
    }

    /// Statements received, in order.
    pub fn statements(&self) -> Vec<Statement> {
        self.counters.statements.lock().unwrap().clone()
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::SeqCst);
    }

    fn record(&self, statement: &Statement) {
        self.counters
            .statements
            .lock()
            .unwrap()
            .push(statement.clone());
    }
}

/// Canned result and failure injection for one source.
#[derive(Debug, Clone, Default)]
pub struct Fixture {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    affected: u64,
    fail_open: bool,
    fail_statement: bool,
    fail_read_at: Option<usize>,
    fail_close: bool,
}

impl Fixture {
    /// A result set with these column names and no rows yet.
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn row(mut self, values: Vec<Value>) -> Self {
        self.rows.push(values);
        self
    }

    /// Affected-row count reported for non-queries.
    pub fn affected(mut self, count: u64) -> Self {
        self.affected = count;
        self
    }

    /// Refuse to open connections.
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Reject every statement.
    pub fn fail_statement(mut self) -> Self {
        self.fail_statement = true;
        self
    }

    /// Lose the connection while reading row `index` (zero-based).
    pub fn fail_read_at(mut self, index: usize) -> Self {
        self.fail_read_at = Some(index);
        self
    }

    /// Fail when closing an open connection.
    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }
}

/// Connection source serving a [`Fixture`].
pub struct FixtureSource {
    url: Option<String>,
    fixture: Fixture,
    probe: Probe,
}

impl FixtureSource {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            url: Some(FIXTURE_URL.to_string()),
            fixture,
            probe: Probe::default(),
        }
    }

    /// A source whose connection string is unavailable.
    pub fn unconfigured(fixture: Fixture) -> Self {
        Self {
            url: None,
            ..Self::new(fixture)
        }
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }
}

impl ConnectionSource for FixtureSource {
    type Connection = FixtureConnection;

    fn connection_string(&self) -> Result<String> {
        self.url
            .clone()
            .ok_or_else(|| Error::Configuration("fixture url is not configured".into()))
    }

    fn open_connection(&self, connection_string: &str) -> Result<FixtureConnection> {
        if connection_string != FIXTURE_URL {
            return Err(Error::Configuration(format!(
                "unsupported fixture url: {}",
                connection_string
            )));
        }
        Probe::bump(&self.probe.counters.constructed);
        Ok(FixtureConnection {
            fixture: self.fixture.clone(),
            probe: self.probe.clone(),
            open: false,
        })
    }
}

pub struct FixtureConnection {
    fixture: Fixture,
    probe: Probe,
    open: bool,
}

impl FixtureConnection {
    fn ensure_open(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(Error::Connection("fixture connection is not open".into()))
        }
    }

    fn accept(&self, statement: &Statement) -> Result<()> {
        self.ensure_open()?;
        self.probe.record(statement);
        if self.fixture.fail_statement {
            return Err(Error::Query(format!("fixture rejected `{}`", statement.sql())));
        }
        Ok(())
    }
}

#[async_trait]
impl Connection for FixtureConnection {
    async fn open(&mut self) -> Result<()> {
        if self.fixture.fail_open {
            return Err(Error::Connection("fixture refused connection".into()));
        }
        if self.open {
            return Err(Error::Connection("fixture connection opened twice".into()));
        }
        self.open = true;
        Probe::bump(&self.probe.counters.opened);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        Probe::bump(&self.probe.counters.closed);
        if !self.open {
            return Ok(());
        }
        self.open = false;
        if self.fixture.fail_close {
            return Err(Error::Connection("fixture failed to close".into()));
        }
        Ok(())
    }

    async fn query<'c>(&'c mut self, statement: &Statement) -> Result<Box<dyn Cursor + 'c>> {
        self.accept(statement)?;
        Probe::bump(&self.probe.counters.cursors_opened);
        Ok(Box::new(FixtureCursor {
            columns: self.fixture.columns.iter().cloned().collect(),
            rows: self.fixture.rows.clone().into_iter(),
            current: None,
            read: 0,
            fail_read_at: self.fixture.fail_read_at,
            probe: self.probe.clone(),
            closed: false,
        }))
    }

    async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        self.accept(statement)?;
        Ok(self.fixture.affected)
    }
}

pub struct FixtureRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row for FixtureRow {
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

pub struct FixtureCursor {
    columns: Arc<[String]>,
    rows: std::vec::IntoIter<Vec<Value>>,
    current: Option<FixtureRow>,
    read: usize,
    fail_read_at: Option<usize>,
    probe: Probe,
    closed: bool,
}

#[async_trait]
impl Cursor for FixtureCursor {
    async fn advance(&mut self) -> Result<bool> {
        if self.closed {
            return Ok(false);
        }
        Probe::bump(&self.probe.counters.advances);
        if self.fail_read_at == Some(self.read) {
            self.current = None;
            return Err(Error::Query("fixture lost the connection".into()));
        }
        self.current = self.rows.next().map(|values| FixtureRow {
            columns: self.columns.clone(),
            values,
        });
        if self.current.is_some() {
            self.read += 1;
        }
        Ok(self.current.is_some())
    }

    fn current(&self) -> Option<&dyn Row> {
        self.current.as_ref().map(|row| row as &dyn Row)
    }

    async fn close(&mut self) -> Result<()> {
        Probe::bump(&self.probe.counters.cursors_closed);
        self.closed = true;
        self.current = None;
        Ok(())
    }
}
