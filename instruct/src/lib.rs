#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![doc = include_str!("../README.md")]

// the derive macro emits `::instruct::` paths
extern crate self as instruct;

pub use instruct_core::*;
pub use instruct_macros::Record;

pub mod coerce;

mod context;
pub use context::*;

mod decoder;
pub use decoder::*;

mod error;
pub use error::*;

mod map_tags;
pub use map_tags::*;

mod operation;
pub use operation::*;

mod options;
pub use options::*;

pub mod resolver;

mod struct_info;
pub use struct_info::*;

mod tag;
pub use tag::*;

mod type_decoder;
pub use type_decoder::*;

#[cfg(feature = "tracing")]
#[allow(unused_imports)]
pub(crate) use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::trace when the tracing feature is enabled
macro_rules! trace {
    ($($tt:tt)*) => {};
}
#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
/// Forwards to tracing::debug when the tracing feature is enabled
macro_rules! debug {
    ($($tt:tt)*) => {};
}
