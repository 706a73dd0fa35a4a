#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![doc = include_str!("../README.md")]

mod error;
pub use error::*;

mod types;
pub use types::*;

mod value;
pub use value::*;

mod impls;

mod macros;

/// A type with a statically known [`Shape`].
///
/// Implemented for primitives, `String`, `Option<T>`, `Box<T>`, `Vec<T>`, time
/// types, and for records through `#[derive(Record)]`.
pub trait Reflect: 'static {
    /// The shape of this type.
    const SHAPE: &'static Shape;
}

/// Returns the shape of `T`.
///
/// Field tables store this as a function pointer: see [`Field::shape`].
pub fn shape_of<T: Reflect>() -> &'static Shape {
    T::SHAPE
}

/// A type with named fields that can be decoded into.
///
/// Records are always default-constructible: decoding starts from
/// `Default::default()` and nested records are allocated the same way.
pub trait Record: Reflect + Default {}

/// Marker for a struct-level option.
///
/// A non-`pub` field of this type carries the directive for the whole record:
///
/// ```rust,ignore
/// #[derive(Default, Record)]
/// struct Payload {
///     #[instruct("body,so_when=before")]
///     so: StructOption,
///     pub id: u64,
/// }
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct StructOption;
