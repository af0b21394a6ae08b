//! Token generation for the `FieldGroup` derive.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{self, FieldSpec};

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let specs = parse::fields(input)?;

    let keys = specs.iter().map(|s| &s.key);
    let get_arms = specs.iter().map(get_arm);
    let set_arms = specs.iter().map(set_arm);
    let collect_stmts = specs.iter().map(collect_stmt);

    Ok(quote! {
        impl #impl_generics ::slip_core::form::FieldGroup for #name #ty_generics #where_clause {
            const KEYS: &'static [&'static str] = &[#(#keys),*];

            fn get_field(
                &self,
                path: &[&str],
            ) -> ::core::result::Result<::slip_core::form::FieldValue, ::slip_core::form::PathFault> {
                let ::core::option::Option::Some((head, rest)) = path.split_first() else {
                    return ::core::result::Result::Err(::slip_core::form::PathFault::NotALeaf);
                };
                match *head {
                    #(#get_arms)*
                    other => ::core::result::Result::Err(
                        ::slip_core::form::PathFault::UnknownKey(other.to_string()),
                    ),
                }
            }

            fn set_field(
                &mut self,
                path: &[&str],
                value: ::slip_core::form::FieldValue,
            ) -> ::core::result::Result<(), ::slip_core::form::PathFault> {
                let ::core::option::Option::Some((head, rest)) = path.split_first() else {
                    return ::core::result::Result::Err(::slip_core::form::PathFault::NotALeaf);
                };
                match *head {
                    #(#set_arms)*
                    other => ::core::result::Result::Err(
                        ::slip_core::form::PathFault::UnknownKey(other.to_string()),
                    ),
                }
            }

            fn collect_leaves(
                &self,
                prefix: &mut ::std::vec::Vec<&'static str>,
                out: &mut ::std::vec::Vec<::slip_core::form::LeafPath>,
            ) {
                #(#collect_stmts)*
            }
        }
    })
}

fn get_arm(spec: &FieldSpec) -> TokenStream {
    let FieldSpec { ident, key, nested } = spec;
    if *nested {
        quote! { #key => ::slip_core::form::FieldGroup::get_field(&self.#ident, rest), }
    } else {
        quote! { #key => ::slip_core::form::get_leaf(&self.#ident, rest), }
    }
}

fn set_arm(spec: &FieldSpec) -> TokenStream {
    let FieldSpec { ident, key, nested } = spec;
    if *nested {
        quote! { #key => ::slip_core::form::FieldGroup::set_field(&mut self.#ident, rest, value), }
    } else {
        quote! { #key => ::slip_core::form::set_leaf(&mut self.#ident, rest, value), }
    }
}

fn collect_stmt(spec: &FieldSpec) -> TokenStream {
    let FieldSpec { ident, key, nested } = spec;
    if *nested {
        quote! {
            prefix.push(#key);
            ::slip_core::form::FieldGroup::collect_leaves(&self.#ident, prefix, out);
            prefix.pop();
        }
    } else {
        quote! {
            prefix.push(#key);
            out.push(prefix.clone());
            prefix.pop();
        }
    }
}
