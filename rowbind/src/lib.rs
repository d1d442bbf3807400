//! rowbind - statement execution and row binding
//!
//! The data-access layer underneath repository implementations: it opens a
//! connection per call, executes parameterized SQL, streams result rows
//! through a callback, and maps rows into record types by column name.
//!
//! # Features
//!
//! - **Scoped lifecycle**: every connection a call opens is closed exactly
//!   once before the call returns, including when a row handler fails
//! - **Name-based binding**: `#[derive(Record)]` builds a column -> field
//!   mapping; unknown columns are ignored, missing ones keep defaults
//! - **Nullable fields**: `Option<T>` fields get an explicit `None` for NULL
//! - **Pluggable drivers**: `Connection`/`Cursor`/`Row` traits, with a
//!   MySQL backend built on `mysql_async`
//!
//! # Example
//!
//! ```ignore
//! use rowbind::{MySqlSource, Record, Statement, StatementRunner};
//!
//! #[derive(Debug, Default, Record)]
//! pub struct User {
//!     #[rowbind(rename = "Id")]
//!     pub id: i64,
//!     #[rowbind(rename = "Name")]
//!     pub name: String,
//!     #[rowbind(rename = "Score")]
//!     pub score: Option<i32>,
//! }
//!
//! async fn find_user(runner: &StatementRunner<MySqlSource>, id: i64) -> rowbind::Result<Vec<User>> {
//!     runner
//!         .query(&Statement::new("SELECT Id, Name, Score FROM Users WHERE Id = :id").bind("id", id))
//!         .await
//! }
//! ```

pub mod binder;
pub mod error;
pub mod materialize;
pub mod mysql;
pub mod runner;
pub mod settings;
pub mod statement;
pub mod traits;
pub mod value;

// Re-export the derive macros
pub use rowbind_derive::{Parameters, Record};

// Re-export main types
pub use binder::RowCollector;
pub use error::{Error, ErrorKind, Result};
pub use materialize::{
    to_positional_array, to_record, to_record_with, BindingPolicy, FieldOutcome, RecordBuilder,
};
pub use mysql::{MySqlConnection, MySqlCursor, MySqlRow, MySqlSource};
pub use runner::{Phase, StatementRunner};
pub use settings::ConnectionSettings;
pub use statement::{Parameter, Statement};
pub use traits::{
    Connection, ConnectionSource, Cursor, FromValue, Parameters, Record, Row, RowExt, ToValue,
};
pub use value::Value;
