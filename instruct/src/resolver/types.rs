use crate::resolver::{ResolveError, TypeValueResolverReflect};
use crate::{BoxedValue, Shape, Value};

/// Parses text through the `parse` hook of the target shape, e.g. one built
/// with [`ShapeBuilder::with_parse`](crate::ShapeBuilder::with_parse).
#[derive(Clone, Copy, Debug, Default)]
pub struct ParseResolver;

impl TypeValueResolverReflect for ParseResolver {
    fn resolve_type_value_reflect(
        &self,
        shape: &'static Shape,
        value: &Value,
    ) -> Result<BoxedValue, ResolveError> {
        match (value, shape.vtable.parse) {
            (Value::String(text), Some(parse)) => parse(text).map_err(|message| {
                ResolveError::Parse {
                    target: shape,
                    message,
                }
            }),
            _ => Err(ResolveError::UnknownCoercion),
        }
    }
}

#[cfg(feature = "jiff02")]
pub use self::time::*;

#[cfg(feature = "jiff02")]
mod time {
    use core::time::Duration;

    use jiff::{SignedDuration, Timestamp};

    use crate::coerce::{to_duration, to_signed_duration, to_timestamp};
    use crate::resolver::{ResolveError, TypeValueResolver};
    use crate::{BoxedValue, Shape, Value};

    /// Resolves `jiff::Timestamp`.
    #[derive(Clone, Debug, Default)]
    pub struct TimestampResolver {
        format: Option<String>,
    }

    impl TimestampResolver {
        /// Parses text with a strftime-style format, e.g. `%Y-%m-%d %H:%M:%S %z`,
        /// instead of RFC 3339.
        pub fn with_format(format: impl Into<String>) -> Self {
            Self {
                format: Some(format.into()),
            }
        }
    }

    impl TypeValueResolver for TimestampResolver {
        fn resolve_type_value(
            &self,
            shape: &'static Shape,
            value: &Value,
        ) -> Result<BoxedValue, ResolveError> {
            if !shape.is_type::<Timestamp>() {
                return Err(ResolveError::UnknownCoercion);
            }
            let timestamp = to_timestamp(value, self.format.as_deref())?;
            Ok(Box::new(timestamp))
        }
    }

    /// Resolves `jiff::SignedDuration`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct SignedDurationResolver;

    impl TypeValueResolver for SignedDurationResolver {
        fn resolve_type_value(
            &self,
            shape: &'static Shape,
            value: &Value,
        ) -> Result<BoxedValue, ResolveError> {
            if !shape.is_type::<SignedDuration>() {
                return Err(ResolveError::UnknownCoercion);
            }
            Ok(Box::new(to_signed_duration(value)?))
        }
    }

    /// Resolves `std::time::Duration`.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct DurationResolver;

    impl TypeValueResolver for DurationResolver {
        fn resolve_type_value(
            &self,
            shape: &'static Shape,
            value: &Value,
        ) -> Result<BoxedValue, ResolveError> {
            if !shape.is_type::<Duration>() {
                return Err(ResolveError::UnknownCoercion);
            }
            Ok(Box::new(to_duration(value)?))
        }
    }
}
