//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::parse_struct_fields;

pub fn derive_record_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let field_configs = parse_struct_fields(&input)?;
    let bound: Vec<_> = field_configs.iter().filter(|c| !c.skip).collect();

    // One match arm per bindable field; skipped fields keep their default
    let arms: Vec<TokenStream> = bound
        .iter()
        .map(|config| {
            let field_ident = &config.ident;
            let column_name = &config.name;
            let ty = &config.ty;
            quote! {
                #column_name => {
                    self.#field_ident = <#ty as rowbind::FromValue>::from_field_value(value)?;
                    true
                }
            }
        })
        .collect();

    let field_names: Vec<&str> = bound.iter().map(|c| c.name.as_str()).collect();

    let discard = if bound.is_empty() {
        quote! { let _ = value; }
    } else {
        TokenStream::new()
    };

    let expanded = quote! {
        impl #impl_generics rowbind::Record for #name #ty_generics #where_clause {
            fn set_field(&mut self, column: &str, value: rowbind::Value) -> rowbind::Result<bool> {
                #discard
                let matched = match column {
                    #(#arms)*
                    _ => false,
                };
                Ok(matched)
            }

            fn field_names() -> &'static [&'static str] {
                &[#(#field_names),*]
            }
        }
    };

    Ok(expanded)
}
