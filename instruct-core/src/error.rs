use core::fmt;

/// Errors raised by the type-erased vtable functions.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReflectError {
    /// A value or slot was not of the type the shape describes.
    WrongType {
        /// Name of the type the shape expected.
        expected: &'static str,
    },

    /// The shape has no way to construct a default value.
    NoDefault {
        /// Name of the type that could not be constructed.
        type_name: &'static str,
    },
}

impl fmt::Display for ReflectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectError::WrongType { expected } => {
                write!(f, "wrong type: expected a value of type {expected}")
            }
            ReflectError::NoDefault { type_name } => {
                write!(f, "type {type_name} cannot be default-constructed")
            }
        }
    }
}

impl core::error::Error for ReflectError {}

/// Error returned by a shape's `try_from` hook.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TryFromError {
    /// The hook does not convert values of this kind.
    Unsupported,

    /// The conversion was attempted and failed.
    Failed(String),
}

impl fmt::Display for TryFromError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TryFromError::Unsupported => f.write_str("unsupported source value"),
            TryFromError::Failed(message) => f.write_str(message),
        }
    }
}

impl core::error::Error for TryFromError {}
