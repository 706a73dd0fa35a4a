use core::any::Any;
use core::fmt;

use super::{Field, Shape};
use crate::ReflectError;

/// A type-erased, owned value, produced by the vtable functions.
pub type BoxedValue = Box<dyn Any>;

/// The semantic definition of a shape: what it is and how to manipulate it.
#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub enum Def {
    /// A primitive, coercible from loosely-typed values.
    Scalar(ScalarType),

    /// `Option<T>`, one level of optional indirection.
    Option(OptionDef),

    /// `Box<T>`, one level of owned indirection.
    Pointer(PointerDef),

    /// A growable sequence such as `Vec<T>`.
    List(ListDef),

    /// A record with named fields.
    Struct(StructType),

    /// Anything else. Opaque shapes are only reachable through the vtable hooks.
    Opaque,
}

/// The primitive kinds understood by the scalar coercion service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    ISize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    USize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// `char`
    Char,
    /// `String`
    String,
}

impl ScalarType {
    /// Name of the primitive, as written in Rust source.
    pub const fn name(self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::I8 => "i8",
            ScalarType::I16 => "i16",
            ScalarType::I32 => "i32",
            ScalarType::I64 => "i64",
            ScalarType::ISize => "isize",
            ScalarType::U8 => "u8",
            ScalarType::U16 => "u16",
            ScalarType::U32 => "u32",
            ScalarType::U64 => "u64",
            ScalarType::USize => "usize",
            ScalarType::F32 => "f32",
            ScalarType::F64 => "f64",
            ScalarType::Char => "char",
            ScalarType::String => "String",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wraps a value of the inner shape into `Some`.
pub type WrapFn = fn(BoxedValue) -> Result<BoxedValue, ReflectError>;

/// Produces the empty value of an optional shape.
pub type NoneFn = fn() -> BoxedValue;

/// Returns the inner value, allocating it first when it is absent.
///
/// Returns `None` when the value is not of the expected type or the inner
/// shape cannot be default-constructed.
pub type GetOrInitFn = fn(&mut dyn Any) -> Option<&mut dyn Any>;

/// Builds a sequence out of individually produced items.
pub type FromItemsFn = fn(Vec<BoxedValue>) -> Result<BoxedValue, ReflectError>;

/// Describes `Option<T>`.
#[derive(Clone, Copy, Debug)]
pub struct OptionDef {
    /// Shape of `T`
    pub inner: &'static Shape,
    /// Builds `Some(value)`
    pub wrap_some: WrapFn,
    /// Builds `None`
    pub none: NoneFn,
    /// `get_or_insert_with(Default::default)`, through the inner shape's vtable
    pub get_or_init: GetOrInitFn,
}

impl OptionDef {
    /// Create a new option definition.
    pub const fn new(
        inner: &'static Shape,
        wrap_some: WrapFn,
        none: NoneFn,
        get_or_init: GetOrInitFn,
    ) -> Self {
        Self {
            inner,
            wrap_some,
            none,
            get_or_init,
        }
    }
}

/// Describes an owning smart pointer such as `Box<T>`.
#[derive(Clone, Copy, Debug)]
pub struct PointerDef {
    /// Shape of the pointee
    pub inner: &'static Shape,
    /// Moves a pointee into a new pointer
    pub wrap: WrapFn,
    /// Borrows the pointee; a box is always allocated
    pub get_mut: GetOrInitFn,
}

impl PointerDef {
    /// Create a new pointer definition.
    pub const fn new(inner: &'static Shape, wrap: WrapFn, get_mut: GetOrInitFn) -> Self {
        Self {
            inner,
            wrap,
            get_mut,
        }
    }
}

/// Describes a list such as `Vec<T>`.
#[derive(Clone, Copy, Debug)]
pub struct ListDef {
    /// Shape of the items
    pub item: &'static Shape,
    /// Collects items into the list
    pub from_items: FromItemsFn,
}

impl ListDef {
    /// Create a new list definition.
    pub const fn new(item: &'static Shape, from_items: FromItemsFn) -> Self {
        Self { item, from_items }
    }
}

/// Common fields for record types.
#[derive(Clone, Copy, Debug)]
pub struct StructType {
    /// all fields, in declaration order
    pub fields: &'static [Field],
}

impl StructType {
    /// Create a new struct definition.
    pub const fn new(fields: &'static [Field]) -> Self {
        Self { fields }
    }

    /// Looks a field up by its declared name.
    pub fn field_by_name(&self, name: &str) -> Option<(usize, &'static Field)> {
        self.fields
            .iter()
            .enumerate()
            .find(|(_, field)| field.name == name)
    }
}
