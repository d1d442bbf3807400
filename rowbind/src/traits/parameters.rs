//! Parameters trait for converting structs to named statement parameters

use crate::statement::Parameter;

/// Trait for types whose fields can be bound as named parameters.
///
/// This trait is typically implemented via `#[derive(Parameters)]`, which
/// emits one parameter per field (named after the field, or its
/// `#[rowbind(rename = "..")]`), skipping fields marked `#[rowbind(skip)]`.
pub trait Parameters {
    /// Parameter names, in field declaration order.
    fn parameter_names() -> &'static [&'static str];

    /// Named parameters, in field declaration order.
    fn to_parameters(&self) -> Vec<Parameter>;
}
