//! Parameters derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::parse_struct_fields;

pub fn derive_parameters_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let field_configs = parse_struct_fields(&input)?;
    let bound: Vec<_> = field_configs.iter().filter(|c| !c.skip).collect();

    let parameter_names: Vec<&str> = bound.iter().map(|c| c.name.as_str()).collect();

    let parameters: Vec<TokenStream> = bound
        .iter()
        .map(|config| {
            let field_ident = &config.ident;
            let parameter_name = &config.name;
            quote! {
                rowbind::Parameter::new(#parameter_name, &self.#field_ident)
            }
        })
        .collect();

    let expanded = quote! {
        impl #impl_generics rowbind::Parameters for #name #ty_generics #where_clause {
            fn parameter_names() -> &'static [&'static str] {
                &[#(#parameter_names),*]
            }

            fn to_parameters(&self) -> Vec<rowbind::Parameter> {
                vec![#(#parameters),*]
            }
        }
    };

    Ok(expanded)
}
