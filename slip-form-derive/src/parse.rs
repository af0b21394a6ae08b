//! Field attribute parsing for the `FieldGroup` derive.

use syn::{Data, DeriveInput, Fields, Ident, LitStr};

/// One addressable field of the struct being derived.
pub struct FieldSpec {
    pub ident: Ident,
    pub key: String,
    pub nested: bool,
}

/// Collects the addressable fields of a named-field struct.
pub fn fields(input: &DeriveInput) -> syn::Result<Vec<FieldSpec>> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "FieldGroup can only be derived for structs",
        ));
    };
    let Fields::Named(named) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "FieldGroup requires named fields",
        ));
    };

    let mut specs = Vec::new();
    for field in &named.named {
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        let mut nested = false;
        let mut skip = false;
        let mut rename = None;

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("field")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("nested") {
                    nested = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let value: LitStr = meta.value()?.parse()?;
                    rename = Some(value.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `nested`, `skip` or `rename = \"..\"`"))
                }
            })?;
        }

        if skip {
            if nested || rename.is_some() {
                return Err(syn::Error::new_spanned(
                    &ident,
                    "#[field(skip)] cannot be combined with other field options",
                ));
            }
            continue;
        }

        let key = rename.unwrap_or_else(|| camel_case(&ident.to_string()));
        if specs.iter().any(|s: &FieldSpec| s.key == key) {
            return Err(syn::Error::new_spanned(
                &ident,
                format!("duplicate field key '{key}'"),
            ));
        }
        specs.push(FieldSpec { ident, key, nested });
    }
    Ok(specs)
}

/// `bilty_freight` -> `biltyFreight`, matching serde's `camelCase`.
pub fn camel_case(snake: &str) -> String {
    let snake = snake.strip_prefix("r#").unwrap_or(snake);
    let mut out = String::with_capacity(snake.len());
    let mut upper_next = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    #[test]
    fn camel_case_converts_snake_identifiers() {
        assert_eq!(camel_case("bilty_freight"), "biltyFreight");
        assert_eq!(camel_case("date"), "date");
        assert_eq!(camel_case("r#type"), "type");
        assert_eq!(camel_case("tax_amount_2"), "taxAmount2");
    }

    #[test]
    fn parses_field_options() {
        let input: DeriveInput = parse_quote! {
            struct Party {
                from_location: String,
                #[field(nested)]
                sender: Sender,
                #[field(rename = "gstin")]
                sender_gstin: String,
                #[field(skip)]
                cached: u32,
            }
        };

        let specs = fields(&input).unwrap();

        let keys: Vec<_> = specs.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, vec!["fromLocation", "sender", "gstin"]);
        assert!(specs[1].nested);
        assert!(!specs[0].nested);
    }

    #[test]
    fn rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Amount(String);
        };

        assert!(fields(&input).is_err());
    }

    #[test]
    fn rejects_duplicate_keys() {
        let input: DeriveInput = parse_quote! {
            struct Party {
                from_location: String,
                #[field(rename = "fromLocation")]
                origin: String,
            }
        };

        assert!(fields(&input).is_err());
    }
}
