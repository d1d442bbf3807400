//! MySQL backend for rowbind
//!
//! One [`MySqlConnection`] wraps one `mysql_async::Conn`; there is no pool.
//! Statements run through the binary protocol, so named parameters use
//! `:name` placeholders and positional ones use `?`.

mod connection;
mod cursor;
mod row;
mod source;
mod types;

pub use connection::MySqlConnection;
pub use cursor::MySqlCursor;
pub use row::MySqlRow;
pub use source::MySqlSource;
pub use types::{from_mysql_value, to_mysql_params, to_mysql_value};
