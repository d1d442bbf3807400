//! Derive macros for the rowbind row binding engine
//!
//! This crate provides the following derive macros:
//! - `Record` - Maps result rows to Rust structs by column name
//! - `Parameters` - Converts Rust structs to named statement parameters
//!
//! These macros are re-exported from the `rowbind` crate, so users typically
//! don't need to depend on this crate directly.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attrs;
mod parameters;
mod record;

/// Derive macro for binding result rows to Rust structs.
///
/// Generates a `rowbind::Record` implementation whose `set_field` matches a
/// column name exactly (case-sensitive) against each field's name. The struct
/// must also implement `Default`, which supplies the value of every field
/// the row has no column for. Bound field types must implement `Default`
/// too: a SQL NULL leaves the field at that default (`None` for `Option`).
///
/// # Attributes
///
/// - `#[rowbind(rename = "ColumnName")]` - Match this column name instead of the field name
/// - `#[rowbind(skip)]` - Never bind this field
///
/// # Example
///
/// ```ignore
/// use rowbind::Record;
///
/// #[derive(Default, Record)]
/// pub struct User {
///     #[rowbind(rename = "Id")]
///     pub id: i64,
///     #[rowbind(rename = "Name")]
///     pub name: String,
///     #[rowbind(rename = "Score")]
///     pub score: Option<i32>,
/// }
/// ```
#[proc_macro_derive(Record, attributes(rowbind))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::derive_record_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive macro for converting Rust structs to named statement parameters.
///
/// Generates a `rowbind::Parameters` implementation with one parameter per
/// field, in declaration order.
///
/// # Attributes
///
/// - `#[rowbind(rename = "name")]` - Use a different parameter name for this field
/// - `#[rowbind(skip)]` - Leave this field out
///
/// # Example
///
/// ```ignore
/// use rowbind::{Parameters, Statement};
///
/// #[derive(Parameters)]
/// pub struct NewUser {
///     #[rowbind(rename = "Name")]
///     pub name: String,
///     #[rowbind(rename = "Score")]
///     pub score: Option<i32>,
/// }
///
/// let stmt = Statement::new("INSERT INTO Users (Name, Score) VALUES (:Name, :Score)")
///     .bind_record(&new_user);
/// ```
#[proc_macro_derive(Parameters, attributes(rowbind))]
pub fn derive_parameters(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    parameters::derive_parameters_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
