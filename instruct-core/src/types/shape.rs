use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::marker::PhantomData;
use core::str::FromStr;

use super::{BoxedValue, ConstTypeId, Def, StructType};
use crate::{ReflectError, TryFromError, Value};

/// Schema for reflection of a type
#[derive(Clone, Copy, Debug)]
pub struct Shape {
    /// Unique type identifier, provided by the compiler.
    pub id: ConstTypeId,

    /// Short name of the type, without generic parameters.
    pub type_identifier: &'static str,

    /// Semantic definition (scalar, option, list, record, ...).
    pub def: Def,

    /// Functions for constructing and assigning values of this type.
    pub vtable: ValueVTable,
}

/// Default-constructs a value. Returns `None` if the type has no default.
pub type DefaultFn = fn() -> Option<BoxedValue>;

/// Moves a boxed value into a live slot of the same type.
pub type AssignFn = fn(&mut dyn Any, BoxedValue) -> Result<(), ReflectError>;

/// Parses text into a value, through `FromStr`.
pub type ParseFn = fn(&str) -> Result<BoxedValue, String>;

/// Converts a loosely-typed value into this type.
pub type TryFromFn = fn(Value) -> Result<BoxedValue, TryFromError>;

/// Type-erased operations on values of a shape.
#[derive(Clone, Copy, Debug)]
pub struct ValueVTable {
    /// see [`DefaultFn`]
    pub default: DefaultFn,
    /// see [`AssignFn`]
    pub assign: AssignFn,
    /// see [`ParseFn`]
    pub parse: Option<ParseFn>,
    /// see [`TryFromFn`]
    pub try_from: Option<TryFromFn>,
}

impl Shape {
    /// Check if this shape describes the type `T`.
    #[inline]
    pub fn is_type<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// Check if `value` is a live value of this shape.
    #[inline]
    pub fn is_shape_of(&self, value: &dyn Any) -> bool {
        self.id == value.type_id()
    }

    /// Follows `Option` and `Box` indirections down to the first other shape.
    pub fn strip_indirection(&'static self) -> &'static Shape {
        let mut shape = self;
        loop {
            match shape.def {
                Def::Option(option) => shape = option.inner,
                Def::Pointer(pointer) => shape = pointer.inner,
                _ => return shape,
            }
        }
    }

    /// Returns the struct definition, if this shape is a record.
    pub fn struct_type(&self) -> Option<StructType> {
        match self.def {
            Def::Struct(st) => Some(st),
            _ => None,
        }
    }

    /// Returns true if this shape is a record, ignoring indirections.
    pub fn is_struct_like(&'static self) -> bool {
        self.strip_indirection().struct_type().is_some()
    }

    /// Returns true if this shape is a list, ignoring indirections.
    pub fn is_list_like(&'static self) -> bool {
        matches!(self.strip_indirection().def, Def::List(_))
    }

    /// Creates the default value of this shape, if it has one.
    pub fn default_value(&self) -> Option<BoxedValue> {
        (self.vtable.default)()
    }

    /// Moves `value` into `target`. Both must be of this shape.
    pub fn assign(&self, target: &mut dyn Any, value: BoxedValue) -> Result<(), ReflectError> {
        (self.vtable.assign)(target, value)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.def {
            Def::Option(option) => write!(f, "{}<{}>", self.type_identifier, option.inner),
            Def::Pointer(pointer) => write!(f, "{}<{}>", self.type_identifier, pointer.inner),
            Def::List(list) => write!(f, "{}<{}>", self.type_identifier, list.item),
            _ => f.write_str(self.type_identifier),
        }
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Shape {}

/// Const builder for [`Shape`].
///
/// ```
/// use instruct_core::{Def, Reflect, Shape, ShapeBuilder};
///
/// #[derive(Debug, Default)]
/// struct UserId(u64);
///
/// impl core::str::FromStr for UserId {
///     type Err = core::num::ParseIntError;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.parse().map(UserId)
///     }
/// }
///
/// impl Reflect for UserId {
///     const SHAPE: &'static Shape = &const {
///         ShapeBuilder::<UserId>::new("UserId")
///             .with_default()
///             .with_parse()
///             .build()
///     };
/// }
///
/// assert!(UserId::SHAPE.is_type::<UserId>());
/// assert!(matches!(UserId::SHAPE.def, Def::Opaque));
/// assert!(UserId::SHAPE.vtable.parse.is_some());
/// ```
pub struct ShapeBuilder<T> {
    shape: Shape,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> ShapeBuilder<T> {
    /// Starts an opaque shape for `T`, with no default, parse or conversion.
    pub const fn new(type_identifier: &'static str) -> Self {
        Self {
            shape: Shape {
                id: ConstTypeId::of::<T>(),
                type_identifier,
                def: Def::Opaque,
                vtable: ValueVTable {
                    default: no_default,
                    assign: assign_erased::<T>,
                    parse: None,
                    try_from: None,
                },
            },
            _marker: PhantomData,
        }
    }

    /// Sets the semantic definition.
    pub const fn def(mut self, def: Def) -> Self {
        self.shape.def = def;
        self
    }

    /// Sets the conversion hook used when no other coercion applies.
    pub const fn with_try_from(mut self, try_from: TryFromFn) -> Self {
        self.shape.vtable.try_from = Some(try_from);
        self
    }

    /// Overrides the default-construction hook.
    pub const fn default_fn(mut self, default: DefaultFn) -> Self {
        self.shape.vtable.default = default;
        self
    }

    /// Finishes the shape.
    pub const fn build(self) -> Shape {
        self.shape
    }
}

impl<T: Default + 'static> ShapeBuilder<T> {
    /// Default-constructs through `Default`.
    pub const fn with_default(mut self) -> Self {
        self.shape.vtable.default = default_boxed::<T>;
        self
    }
}

impl<T> ShapeBuilder<T>
where
    T: FromStr + 'static,
    T::Err: fmt::Display,
{
    /// Parses text through `FromStr`.
    pub const fn with_parse(mut self) -> Self {
        self.shape.vtable.parse = Some(parse_boxed::<T>);
        self
    }
}

fn no_default() -> Option<BoxedValue> {
    None
}

fn default_boxed<T: Default + 'static>() -> Option<BoxedValue> {
    Some(Box::new(T::default()))
}

fn parse_boxed<T>(text: &str) -> Result<BoxedValue, String>
where
    T: FromStr + 'static,
    T::Err: fmt::Display,
{
    text.parse::<T>()
        .map(|value| Box::new(value) as BoxedValue)
        .map_err(|err| err.to_string())
}

fn assign_erased<T: 'static>(target: &mut dyn Any, value: BoxedValue) -> Result<(), ReflectError> {
    let Some(slot) = target.downcast_mut::<T>() else {
        return Err(ReflectError::WrongType {
            expected: type_name::<T>(),
        });
    };
    let value = value
        .downcast::<T>()
        .map_err(|_| ReflectError::WrongType {
            expected: type_name::<T>(),
        })?;
    *slot = *value;
    Ok(())
}

/// Downcasts a boxed value produced for `T`.
pub fn downcast_boxed<T: 'static>(value: BoxedValue) -> Result<T, ReflectError> {
    value
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| ReflectError::WrongType {
            expected: type_name::<T>(),
        })
}
