//! Core traits for rowbind

mod driver;
mod from_value;
mod parameters;
mod row;
mod source;
mod to_value;

pub use driver::{Connection, Cursor};
pub use from_value::FromValue;
pub use parameters::Parameters;
pub use row::{Record, Row, RowExt};
pub use source::ConnectionSource;
pub use to_value::ToValue;
