use core::fmt;

use crate::resolver::ResolveError;
use crate::{OperationError, Shape, TagError};

/// Configuration errors, raised while building the struct info of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    /// A directive could not be parsed.
    Tag {
        /// dotted path of the field
        path: String,
        /// the parse error
        source: TagError,
    },

    /// A nested map tags entry on a field that is not a record.
    InvalidMapEntryType {
        /// dotted path of the field
        path: String,
    },

    /// More than one `StructOption` marker in one record.
    MultipleStructOptions {
        /// dotted path of the record, or its type name at the root
        path: String,
    },

    /// A struct-level option with the `-` operation.
    CannotIgnoreStructOption {
        /// dotted path of the record, or its type name at the root
        path: String,
    },

    /// `recurse` on a field that is not a record.
    RecurseOnNonStruct {
        /// dotted path of the field
        path: String,
        /// shape of the field
        shape: &'static Shape,
    },

    /// A visible field with no directive from any source.
    MissingFieldConfiguration {
        /// dotted path of the field
        path: String,
    },

    /// A map tags entry that matches no field.
    UnusedMapTagField {
        /// dotted path of the entry
        path: String,
    },

    /// Struct info can only be built for records.
    NotAStruct {
        /// the shape that was passed in
        shape: &'static Shape,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Tag { path, source } => write!(f, "error on field '{path}': {source}"),
            BuildError::InvalidMapEntryType { path } => write!(
                f,
                "invalid map tags entry for field '{path}': only directives are allowed on non-struct fields"
            ),
            BuildError::MultipleStructOptions { path } => {
                write!(f, "only one StructOption is allowed per struct for field '{path}'")
            }
            BuildError::CannotIgnoreStructOption { path } => {
                write!(f, "cannot ignore struct option for field '{path}'")
            }
            BuildError::RecurseOnNonStruct { path, shape } => write!(
                f,
                "field '{path}' must be a struct to use recurse but is '{shape}'"
            ),
            BuildError::MissingFieldConfiguration { path } => {
                write!(f, "field '{path}' configuration not found")
            }
            BuildError::UnusedMapTagField { path } => {
                write!(f, "map tags field '{path}' was declared but not used")
            }
            BuildError::NotAStruct { shape } => {
                write!(f, "can only decode to struct, received: {shape}")
            }
        }
    }
}

impl core::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            BuildError::Tag { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Errors raised while decoding.
#[derive(Debug)]
#[non_exhaustive]
pub enum DecodeError {
    /// The destination is not a record, through any `Option`/`Box` indirection,
    /// or an indirection level could not be allocated.
    InvalidDecodeTarget {
        /// shape of the destination
        shape: &'static Shape,
    },

    /// A prebuilt struct info was used with a destination of another type.
    TypeMismatch {
        /// the type the struct info was built for
        expected: &'static Shape,
        /// the type of the destination
        found: &'static str,
    },

    /// Building the struct info failed.
    Build(BuildError),

    /// A directive names an operation the decoder does not know.
    UnknownOperation {
        /// the operation name
        operation: String,
        /// dotted path of the field
        field: String,
    },

    /// A required field or struct-level option was not set.
    RequiredValueMissing {
        /// the directive is a struct-level option
        is_struct_option: bool,
        /// the operation that found nothing
        operation: String,
        /// dotted path of the field, or the record type name
        field: String,
        /// the name the operation looked for
        name: String,
    },

    /// A struct-level option returned a value, but it has no field to hold it.
    OperationNotSupported {
        /// the operation name
        operation: String,
        /// the record type name
        field: String,
    },

    /// The extracted value could not be coerced into the field.
    Resolve {
        /// dotted path of the field
        field: String,
        /// the coercion error
        source: ResolveError,
    },

    /// An operation failed. Reported as-is.
    Operation(OperationError),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidDecodeTarget { shape } => {
                write!(f, "invalid decode target: cannot decode into {shape}")
            }
            DecodeError::TypeMismatch { expected, found } => {
                write!(f, "invalid data type, expected {expected} got {found}")
            }
            DecodeError::Build(err) => fmt::Display::fmt(err, f),
            DecodeError::UnknownOperation { operation, field } => {
                write!(f, "unknown operation '{operation}' for field '{field}'")
            }
            DecodeError::RequiredValueMissing {
                is_struct_option,
                operation,
                field,
                name,
            } => {
                let kind = if *is_struct_option {
                    "struct option"
                } else {
                    "field"
                };
                write!(
                    f,
                    "{kind} '{field}' (tag name '{name}') with operation '{operation}' is required but was not set"
                )
            }
            DecodeError::OperationNotSupported { operation, field } => write!(
                f,
                "operation '{operation}' not supported (no field type, maybe struct option?) for field '{field}'"
            ),
            DecodeError::Resolve { field, source } => {
                write!(f, "error resolving field '{field}': {source}")
            }
            DecodeError::Operation(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            DecodeError::Build(err) => Some(err),
            DecodeError::Resolve { source, .. } => Some(source),
            DecodeError::Operation(err) => err.source(),
            _ => None,
        }
    }
}

impl From<BuildError> for DecodeError {
    fn from(err: BuildError) -> Self {
        DecodeError::Build(err)
    }
}

/// Returned by validation hooks when some input values were never consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValuesNotUsedError {
    /// the operation whose values were not all used
    pub operation: String,
}

impl fmt::Display for ValuesNotUsedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "some values were not used on operation '{}'",
            self.operation
        )
    }
}

impl core::error::Error for ValuesNotUsedError {}
