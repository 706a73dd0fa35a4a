use crate::coerce::{coerce_scalar, widen_opaque};
use crate::resolver::{ParseResolver, ResolveError};
use crate::{BoxedValue, Def, Shape, TryFromError, Value};

/// Resolves leaf values: anything that is not a list, an `Option` or a `Box`.
pub trait ValueResolver: Send + Sync {
    /// Produces a fresh value of `shape` out of `value`.
    fn resolve_value(&self, shape: &'static Shape, value: Value)
    -> Result<BoxedValue, ResolveError>;
}

/// A custom-type handler that decides on the target shape alone.
///
/// Return [`ResolveError::UnknownCoercion`] for shapes it does not handle.
pub trait TypeValueResolver: Send + Sync {
    /// Produces a fresh value of `shape` out of `value`.
    fn resolve_type_value(
        &self,
        shape: &'static Shape,
        value: &Value,
    ) -> Result<BoxedValue, ResolveError>;
}

/// A custom-type handler that also looks at the kind of the source value.
///
/// Runs after the primitive coercions. Return
/// [`ResolveError::UnknownCoercion`] to let the next handler try.
pub trait TypeValueResolverReflect: Send + Sync {
    /// Produces a fresh value of `shape` out of `value`.
    fn resolve_type_value_reflect(
        &self,
        shape: &'static Shape,
        value: &Value,
    ) -> Result<BoxedValue, ResolveError>;
}

/// The standard leaf resolver. In order:
///
/// 1. custom-type handlers,
/// 2. primitives, through [`coerce`](crate::coerce), opaque primitives widened
///    first,
/// 3. reflective custom-type handlers,
/// 4. an opaque source of the target type, assigned as is,
/// 5. the shape's `try_from` hook,
///
/// and fails with [`ResolveError::UnsupportedCoercion`] otherwise.
pub struct DefaultValueResolver {
    custom_types: Vec<Box<dyn TypeValueResolver>>,
    custom_types_reflect: Vec<Box<dyn TypeValueResolverReflect>>,
}

impl DefaultValueResolver {
    /// A resolver without any custom-type handlers.
    pub fn empty() -> Self {
        Self {
            custom_types: Vec::new(),
            custom_types_reflect: Vec::new(),
        }
    }

    /// Appends a custom-type handler.
    pub fn with_custom_type<R: TypeValueResolver + 'static>(mut self, resolver: R) -> Self {
        self.custom_types.push(Box::new(resolver));
        self
    }

    /// Appends a reflective custom-type handler.
    pub fn with_custom_type_reflect<R: TypeValueResolverReflect + 'static>(
        mut self,
        resolver: R,
    ) -> Self {
        self.custom_types_reflect.push(Box::new(resolver));
        self
    }
}

impl Default for DefaultValueResolver {
    /// Handles jiff's `Timestamp` and `SignedDuration` and std's `Duration`
    /// (with the `jiff02` feature), and text for shapes with a parse hook.
    fn default() -> Self {
        let resolver = Self::empty();
        #[cfg(feature = "jiff02")]
        let resolver = resolver
            .with_custom_type(crate::resolver::TimestampResolver::default())
            .with_custom_type(crate::resolver::SignedDurationResolver)
            .with_custom_type(crate::resolver::DurationResolver);
        resolver.with_custom_type_reflect(ParseResolver)
    }
}

impl ValueResolver for DefaultValueResolver {
    fn resolve_value(
        &self,
        shape: &'static Shape,
        value: Value,
    ) -> Result<BoxedValue, ResolveError> {
        for resolver in &self.custom_types {
            match resolver.resolve_type_value(shape, &value) {
                Err(ResolveError::UnknownCoercion) => continue,
                result => return result,
            }
        }

        if let Def::Scalar(kind) = shape.def {
            return Ok(coerce_scalar(kind, &widen_opaque(value))?);
        }

        for resolver in &self.custom_types_reflect {
            match resolver.resolve_type_value_reflect(shape, &value) {
                Err(ResolveError::UnknownCoercion) => continue,
                result => return result,
            }
        }

        let value = match value {
            Value::Opaque(opaque) if shape.id == opaque.type_id() => {
                return Ok(opaque.into_boxed());
            }
            value => value,
        };

        let source = value.type_name();
        if !matches!(shape.def, Def::List(_))
            && let Some(try_from) = shape.vtable.try_from
        {
            match try_from(value) {
                Ok(converted) => return Ok(converted),
                Err(TryFromError::Unsupported) => {}
                Err(err) => return Err(ResolveError::Custom(Box::new(err))),
            }
        }

        Err(ResolveError::UnsupportedCoercion {
            source,
            target: shape,
        })
    }
}
