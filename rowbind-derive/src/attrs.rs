//! `#[rowbind(..)]` field attribute parsing shared by both derives

use syn::{spanned::Spanned, Data, DeriveInput, Error, Field, Fields, Ident, Result};

/// Per-field configuration
pub struct FieldConfig {
    /// The field identifier
    pub ident: Ident,
    /// Column / parameter name the field is matched against
    pub name: String,
    /// Whether the field takes no part in binding
    pub skip: bool,
    /// The field type
    pub ty: syn::Type,
}

fn parse_field_config(field: &Field) -> Result<FieldConfig> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new(field.span(), "tuple structs are not supported"))?;

    let mut name = ident.to_string();
    // Raw identifiers (`r#type`) bind under their plain name
    if let Some(stripped) = name.strip_prefix("r#") {
        name = stripped.to_string();
    }
    let mut skip = false;

    for attr in &field.attrs {
        if attr.path().is_ident("rowbind") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value = meta.value()?;
                    let lit: syn::LitStr = value.parse()?;
                    name = lit.value();
                } else if meta.path.is_ident("skip") {
                    skip = true;
                } else {
                    return Err(meta.error(format!(
                        "unknown rowbind attribute `{}`",
                        meta.path
                            .get_ident()
                            .map(|i| i.to_string())
                            .unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }
    }

    Ok(FieldConfig {
        ident,
        name,
        skip,
        ty: field.ty.clone(),
    })
}

/// Parse every named field of a struct, rejecting duplicate names.
pub fn parse_struct_fields(input: &DeriveInput) -> Result<Vec<FieldConfig>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(input.span(), "only structs are supported")),
    };

    let configs = fields
        .iter()
        .map(parse_field_config)
        .collect::<Result<Vec<_>>>()?;

    for (i, config) in configs.iter().enumerate() {
        if config.skip {
            continue;
        }
        let duplicate = configs[..i]
            .iter()
            .any(|other| !other.skip && other.name == config.name);
        if duplicate {
            return Err(Error::new(
                config.ident.span(),
                format!("duplicate rowbind name `{}`", config.name),
            ));
        }
    }

    Ok(configs)
}
