//! Committing extracted values into fields.
//!
//! A [`Resolver`] takes the loosely-typed [`Value`] returned by an operation and
//! writes it into the destination field. The [`DefaultResolver`] takes the
//! indirections and lists apart and hands each leaf to a [`ValueResolver`].

use core::any::Any;
use core::fmt;

use crate::coerce::CoerceError;
use crate::{BoxedValue, Def, ReflectError, Shape, Value};

mod types;
pub use types::*;

mod value;
pub use value::*;

/// Errors while committing a value.
#[derive(Debug)]
#[non_exhaustive]
pub enum ResolveError {
    /// A list destination got a source value that is not a list.
    ExpectedSequence {
        /// the list shape
        target: &'static Shape,
        /// kind of the source value
        source: &'static str,
    },

    /// Returned by custom-type handlers that do not handle the target; the
    /// next handler is tried.
    UnknownCoercion,

    /// No coercion exists from the source to the target.
    UnsupportedCoercion {
        /// kind of the source value
        source: &'static str,
        /// the target shape
        target: &'static Shape,
    },

    /// A primitive coercion failed.
    Coerce(CoerceError),

    /// Text could not be parsed into the target.
    Parse {
        /// the target shape
        target: &'static Shape,
        /// the parser's message
        message: String,
    },

    /// A value did not match the vtable of its shape.
    Reflect(ReflectError),

    /// A custom handler failed.
    Custom(Box<dyn core::error::Error + Send + Sync>),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::ExpectedSequence { target, source } => write!(
                f,
                "expected an array to coerce an array into ({target}), got {source}"
            ),
            ResolveError::UnknownCoercion => f.write_str("unknown coercion"),
            ResolveError::UnsupportedCoercion { source, target } => write!(
                f,
                "cannot coerce source of type '{source}' into target of type '{target}'"
            ),
            ResolveError::Coerce(err) => fmt::Display::fmt(err, f),
            ResolveError::Parse { target, message } => {
                write!(f, "cannot parse {target}: {message}")
            }
            ResolveError::Reflect(err) => fmt::Display::fmt(err, f),
            ResolveError::Custom(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ResolveError::Coerce(err) => Some(err),
            ResolveError::Reflect(err) => Some(err),
            ResolveError::Custom(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<CoerceError> for ResolveError {
    fn from(err: CoerceError) -> Self {
        ResolveError::Coerce(err)
    }
}

impl From<ReflectError> for ResolveError {
    fn from(err: ReflectError) -> Self {
        ResolveError::Reflect(err)
    }
}

/// Writes an extracted value into a destination.
pub trait Resolver: Send + Sync {
    /// Coerces `value` into `shape` and stores it in `target`, which must be a
    /// live value of `shape`.
    fn resolve(
        &self,
        target: &mut dyn Any,
        shape: &'static Shape,
        value: Value,
    ) -> Result<(), ResolveError>;
}

/// The standard resolver.
///
/// * lists need a [`Value::List`] (`Null` gives an empty list); each item is
///   resolved into a fresh value, and the list is assigned once all succeed;
/// * `Option<T>` is `None` for [`Value::Null`], else `Some` of a fresh `T`;
/// * `Box<T>` boxes a fresh `T`;
/// * everything else goes to the [`ValueResolver`].
///
/// An opaque source of exactly the destination type is assigned as is, at any
/// level.
pub struct DefaultResolver {
    value_resolver: Box<dyn ValueResolver>,
}

impl Default for DefaultResolver {
    fn default() -> Self {
        Self::new(DefaultValueResolver::default())
    }
}

impl fmt::Debug for DefaultResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultResolver").finish_non_exhaustive()
    }
}

impl DefaultResolver {
    /// Create a resolver that hands leaves to `value_resolver`.
    pub fn new<V: ValueResolver + 'static>(value_resolver: V) -> Self {
        Self {
            value_resolver: Box::new(value_resolver),
        }
    }

    /// Produces a fresh value of `shape` out of `value`.
    pub fn produce(&self, shape: &'static Shape, value: Value) -> Result<BoxedValue, ResolveError> {
        let value = match value {
            Value::Opaque(opaque) if shape.id == opaque.type_id() => {
                return Ok(opaque.into_boxed());
            }
            value => value,
        };

        match shape.def {
            Def::List(list) => {
                let items = match value {
                    Value::Null => Vec::new(),
                    Value::List(items) => items,
                    other => {
                        return Err(ResolveError::ExpectedSequence {
                            target: shape,
                            source: other.type_name(),
                        });
                    }
                };
                let items = items
                    .into_iter()
                    .map(|item| self.produce(list.item, item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((list.from_items)(items)?)
            }
            Def::Option(option) => {
                if value.is_null() {
                    return Ok((option.none)());
                }
                let inner = self.produce(option.inner, value)?;
                Ok((option.wrap_some)(inner)?)
            }
            Def::Pointer(pointer) => {
                let inner = self.produce(pointer.inner, value)?;
                Ok((pointer.wrap)(inner)?)
            }
            _ => self.value_resolver.resolve_value(shape, value),
        }
    }
}

impl Resolver for DefaultResolver {
    fn resolve(
        &self,
        target: &mut dyn Any,
        shape: &'static Shape,
        value: Value,
    ) -> Result<(), ResolveError> {
        let produced = self.produce(shape, value)?;
        shape.assign(target, produced)?;
        Ok(())
    }
}
