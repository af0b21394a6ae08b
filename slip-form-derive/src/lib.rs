//! Derive macro for `slip_core::form::FieldGroup`.
//!
//! ```ignore
//! use slip_core::form::FieldGroup;
//!
//! #[derive(Clone, Default, FieldGroup)]
//! struct PartyDetails {
//!     from_location: String,          // key "fromLocation"
//!     #[field(nested)]
//!     sender: Sender,                 // key "sender", itself a FieldGroup
//!     #[field(rename = "gstin")]
//!     sender_gstin: String,           // key "gstin"
//!     #[field(skip)]
//!     cached: Option<u32>,            // not addressable
//! }
//! ```
//!
//! Unmarked fields must implement `slip_core::form::FieldLeaf`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod codegen;
mod parse;

#[proc_macro_derive(FieldGroup, attributes(field))]
pub fn derive_field_group(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match codegen::expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
