//! Statements and their parameters

use crate::error::Result;
use crate::runner::StatementRunner;
use crate::traits::{ConnectionSource, Parameters, Record, ToValue};
use crate::value::Value;

/// A single statement parameter.
///
/// The name may be written with its placeholder sigil (`@id`, `:id`) or
/// without (`id`); [`bare_name`](Parameter::bare_name) strips it. An empty
/// name marks a positional parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    name: String,
    value: Value,
}

impl Parameter {
    /// Create a named parameter.
    pub fn new(name: impl Into<String>, value: impl ToValue) -> Self {
        Self {
            name: name.into(),
            value: value.to_value(),
        }
    }

    /// Create a positional parameter.
    pub fn positional(value: impl ToValue) -> Self {
        Self {
            name: String::new(),
            value: value.to_value(),
        }
    }

    /// The name exactly as given.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name without a leading `@` or `:` sigil.
    pub fn bare_name(&self) -> &str {
        self.name
            .strip_prefix('@')
            .or_else(|| self.name.strip_prefix(':'))
            .unwrap_or(&self.name)
    }

    pub fn is_positional(&self) -> bool {
        self.name.is_empty()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

/// SQL text plus its ordered parameters, ready for execution.
///
/// The SQL is passed to the driver untouched; it is neither parsed nor
/// validated here.
///
/// # Example
///
/// ```ignore
/// use rowbind::Statement;
///
/// let users: Vec<User> = Statement::new("SELECT Id, Name FROM Users WHERE Id = :id")
///     .bind("id", 3)
///     .fetch_all(&runner)
///     .await?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    parameters: Vec<Parameter>,
}

impl Statement {
    /// Create a new statement with the given SQL and no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            parameters: Vec::new(),
        }
    }

    /// Bind a named parameter.
    pub fn bind<T: ToValue>(mut self, name: impl Into<String>, value: T) -> Self {
        self.parameters.push(Parameter::new(name, value));
        self
    }

    /// Bind a positional parameter.
    ///
    /// Positional and named parameters cannot be mixed in one statement.
    pub fn push<T: ToValue>(mut self, value: T) -> Self {
        self.parameters.push(Parameter::positional(value));
        self
    }

    /// Bind every field of `record` as a named parameter.
    pub fn bind_record<T: Parameters>(mut self, record: &T) -> Self {
        self.parameters.extend(record.to_parameters());
        self
    }

    /// Append already-built parameters.
    pub fn with_parameters(mut self, parameters: impl IntoIterator<Item = Parameter>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    /// Get the SQL string.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Get the bound parameters.
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Fetch all rows, materialized as `T`.
    pub async fn fetch_all<T, S>(&self, runner: &StatementRunner<S>) -> Result<Vec<T>>
    where
        T: Record + Send,
        S: ConnectionSource,
    {
        runner.query(self).await
    }

    /// Execute as a non-query and return the affected row count.
    pub async fn execute_non_query<S: ConnectionSource>(
        &self,
        runner: &StatementRunner<S>,
    ) -> Result<u64> {
        runner.execute_non_query(self).await
    }
}

impl From<&str> for Statement {
    fn from(sql: &str) -> Self {
        Statement::new(sql)
    }
}

impl From<String> for Statement {
    fn from(sql: String) -> Self {
        Statement::new(sql)
    }
}
