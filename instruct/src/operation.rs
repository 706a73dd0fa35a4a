use core::any::Any;
use core::marker::PhantomData;

use crate::{Field, Shape, Tag, Value};

/// Error type returned by extraction operations. Reported to the caller as is.
pub type OperationError = Box<dyn core::error::Error + Send + Sync>;

/// Outcome of an extraction operation.
#[derive(Debug)]
pub enum Decoded {
    /// Nothing was found for the field. The field is left untouched.
    NotFound,
    /// A value was found; the resolver coerces it into the field.
    Value(Value),
    /// The operation wrote the field itself.
    Handled,
}

impl Decoded {
    /// Returns true unless [`Decoded::NotFound`].
    pub fn is_found(&self) -> bool {
        !matches!(self, Decoded::NotFound)
    }
}

/// The destination of an extraction operation.
///
/// Holds the live value (a field, or the record itself for a struct-level
/// option) and its shape.
pub struct Target<'a> {
    value: &'a mut dyn Any,
    shape: &'static Shape,
    field: Option<&'static Field>,
}

impl<'a> Target<'a> {
    pub(crate) fn new(
        value: &'a mut dyn Any,
        shape: &'static Shape,
        field: Option<&'static Field>,
    ) -> Self {
        Self {
            value,
            shape,
            field,
        }
    }

    /// Shape of the destination, with indirections.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// The destination field; `None` for the struct-level option of the root.
    pub fn field(&self) -> Option<&'static Field> {
        self.field
    }

    /// True if the destination is a list, so the operation may want to return
    /// every value it finds rather than the first one.
    pub fn is_list(&self) -> bool {
        self.shape.is_list_like()
    }

    /// The live destination.
    pub fn value_mut(&mut self) -> &mut dyn Any {
        &mut *self.value
    }

    /// The live destination, if it is a `T`.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Consumes the target, returning the live destination.
    pub fn into_value(self) -> &'a mut dyn Any {
        self.value
    }
}

impl core::fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Target")
            .field("shape", &format_args!("{}", self.shape))
            .field("field", &self.field.map(|field| field.name))
            .finish()
    }
}

/// An extraction operation, e.g. "read header X".
///
/// Operations are registered on the decoder under the name that directives use
/// as their first token.
pub trait DecodeOperation<I, C>: Send + Sync {
    /// Extracts the value for `target` out of `input`.
    ///
    /// Return [`Decoded::Value`] when a value is at hand and let the resolver
    /// coerce it, or write the target directly and return
    /// [`Decoded::Handled`], e.g. when deserializing a body into it.
    fn decode(
        &self,
        ctx: &mut C,
        input: &I,
        target: Target<'_>,
        tag: &Tag,
    ) -> Result<Decoded, OperationError>;

    /// The validation hook of this operation, if it has one.
    fn as_validate(&self) -> Option<&dyn DecodeValidate<I, C>> {
        None
    }
}

/// Final check run once after a successful decode.
pub trait DecodeValidate<I, C> {
    /// Checks the decode as a whole, e.g. that every input value was used.
    fn validate(&self, ctx: &mut C, input: &I) -> Result<(), OperationError>;
}

/// Adapts a closure into a [`DecodeOperation`].
pub struct DecodeOperationFn<F, I, C> {
    f: F,
    _marker: PhantomData<fn(&I, &mut C)>,
}

impl<F, I, C> DecodeOperationFn<F, I, C> {
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

impl<F, I, C> DecodeOperation<I, C> for DecodeOperationFn<F, I, C>
where
    F: Fn(&mut C, &I, Target<'_>, &Tag) -> Result<Decoded, OperationError> + Send + Sync,
{
    fn decode(
        &self,
        ctx: &mut C,
        input: &I,
        target: Target<'_>,
        tag: &Tag,
    ) -> Result<Decoded, OperationError> {
        (self.f)(ctx, input, target, tag)
    }
}
