//! Derive macro for `instruct` records.
//!
//! Use it through the `instruct` crate, which re-exports it:
//!
//! ```rust,ignore
//! use instruct::Record;
//!
//! #[derive(Default, Record)]
//! struct Request {
//!     #[instruct("header,name=x-request-id")]
//!     pub request_id: String,
//!     #[instruct(flatten)]
//!     pub paging: Paging,
//! }
//! ```
use proc_macro::TokenStream;

mod record;

/// Implements `Reflect` and `Record` for a struct with named fields.
///
/// Field attributes:
/// - `#[instruct("operation,key=value,...")]`: the directive for this field;
/// - `#[instruct(flatten)]`: the field embeds its record type, whose fields are
///   addressed as if declared on the containing struct.
///
/// Only `pub` fields are decoded. A non-`pub` field of type `StructOption`
/// holds the struct-level option directive.
#[proc_macro_derive(Record, attributes(instruct))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
