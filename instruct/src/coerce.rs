//! Conversions from loosely-typed [`Value`]s into primitives.
//!
//! `Null` coerces to the zero value of every primitive. Text is parsed,
//! numbers are range-checked, and lists or opaque values are never coerced.

use core::any::type_name;
use core::fmt;

use crate::{BoxedValue, ScalarType, Value};

/// Coercion failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CoerceError {
    /// The source could not be read as the target, e.g. unparsable text.
    Invalid {
        /// name of the target type
        target: &'static str,
        /// the offending value
        value: String,
    },

    /// The source is a number outside the range of the target.
    Overflow {
        /// name of the target type
        target: &'static str,
        /// the offending value
        value: String,
    },

    /// Values of this kind never coerce into the target.
    Unsupported {
        /// name of the target type
        target: &'static str,
        /// kind of the source value
        source: &'static str,
    },
}

impl fmt::Display for CoerceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoerceError::Invalid { target, value } => {
                write!(f, "invalid value {value} for type {target}")
            }
            CoerceError::Overflow { target, value } => {
                write!(f, "value {value} overflows type {target}")
            }
            CoerceError::Unsupported { target, source } => {
                write!(f, "unsupported: coerce {source} to {target}")
            }
        }
    }
}

impl core::error::Error for CoerceError {}

fn invalid<T>(value: &Value) -> CoerceError {
    CoerceError::Invalid {
        target: type_name::<T>(),
        value: value.to_string(),
    }
}

fn unsupported<T>(value: &Value) -> CoerceError {
    CoerceError::Unsupported {
        target: type_name::<T>(),
        source: value.type_name(),
    }
}

/// Coerces into the primitive `kind`, boxed.
pub fn coerce_scalar(kind: ScalarType, value: &Value) -> Result<BoxedValue, CoerceError> {
    fn boxed<T: 'static>(value: Result<T, CoerceError>) -> Result<BoxedValue, CoerceError> {
        value.map(|value| Box::new(value) as BoxedValue)
    }

    match kind {
        ScalarType::Bool => boxed(to_bool(value)),
        ScalarType::I8 => boxed(to_integer::<i8>(value)),
        ScalarType::I16 => boxed(to_integer::<i16>(value)),
        ScalarType::I32 => boxed(to_integer::<i32>(value)),
        ScalarType::I64 => boxed(to_integer::<i64>(value)),
        ScalarType::ISize => boxed(to_integer::<isize>(value)),
        ScalarType::U8 => boxed(to_integer::<u8>(value)),
        ScalarType::U16 => boxed(to_integer::<u16>(value)),
        ScalarType::U32 => boxed(to_integer::<u32>(value)),
        ScalarType::U64 => boxed(to_integer::<u64>(value)),
        ScalarType::USize => boxed(to_integer::<usize>(value)),
        ScalarType::F32 => boxed(to_f32(value)),
        ScalarType::F64 => boxed(to_f64(value)),
        ScalarType::Char => boxed(to_char(value)),
        ScalarType::String => boxed(to_string(value)),
    }
}

/// Replaces an opaque primitive by the plain value of its kind, so that e.g.
/// an `i32` of an operation coerces into an `i64` field. Anything else is
/// returned unchanged.
pub fn widen_opaque(value: Value) -> Value {
    macro_rules! widen {
        ($opaque:ident: $($ty:ty),*) => {
            $(
                let $opaque = match $opaque.downcast::<$ty>() {
                    Ok(primitive) => return Value::from(primitive),
                    Err(opaque) => opaque,
                };
            )*
        };
    }

    let Value::Opaque(opaque) = value else {
        return value;
    };
    widen!(opaque: bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, char, String);
    Value::Opaque(opaque)
}

/// Numbers are true when non-zero; text uses the `1 t true 0 f false` forms.
pub fn to_bool(value: &Value) -> Result<bool, CoerceError> {
    match value {
        Value::Null => Ok(false),
        Value::Bool(b) => Ok(*b),
        Value::I64(n) => Ok(*n != 0),
        Value::U64(n) => Ok(*n != 0),
        Value::F64(n) => Ok(*n != 0.0),
        Value::String(s) => crate::tag::parse_bool(s.trim()).ok_or_else(|| invalid::<bool>(value)),
        Value::List(_) | Value::Opaque(_) => Err(unsupported::<bool>(value)),
    }
}

/// Floats must be integral; text is parsed as a decimal integer.
pub fn to_integer<T>(value: &Value) -> Result<T, CoerceError>
where
    T: TryFrom<i128> + 'static,
{
    let wide: i128 = match value {
        Value::Null => 0,
        Value::Bool(b) => i128::from(*b),
        Value::I64(n) => i128::from(*n),
        Value::U64(n) => i128::from(*n),
        Value::F64(n) => {
            if !n.is_finite() || n.fract() != 0.0 {
                return Err(invalid::<T>(value));
            }
            // saturates; out of range values fail the conversion below
            *n as i128
        }
        Value::String(s) => s.trim().parse().map_err(|_| invalid::<T>(value))?,
        Value::List(_) | Value::Opaque(_) => return Err(unsupported::<T>(value)),
    };
    T::try_from(wide).map_err(|_| CoerceError::Overflow {
        target: type_name::<T>(),
        value: value.to_string(),
    })
}

/// Coerces into an `f64`. Large integers lose precision.
pub fn to_f64(value: &Value) -> Result<f64, CoerceError> {
    match value {
        Value::Null => Ok(0.0),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::I64(n) => Ok(*n as f64),
        Value::U64(n) => Ok(*n as f64),
        Value::F64(n) => Ok(*n),
        Value::String(s) => s.trim().parse().map_err(|_| invalid::<f64>(value)),
        Value::List(_) | Value::Opaque(_) => Err(unsupported::<f64>(value)),
    }
}

/// Coerces into an `f32`; finite values beyond its range overflow.
pub fn to_f32(value: &Value) -> Result<f32, CoerceError> {
    let wide = to_f64(value).map_err(|err| match err {
        CoerceError::Invalid { value, .. } => CoerceError::Invalid {
            target: type_name::<f32>(),
            value,
        },
        CoerceError::Unsupported { source, .. } => CoerceError::Unsupported {
            target: type_name::<f32>(),
            source,
        },
        other => other,
    })?;
    if wide.is_finite() && wide.abs() > f64::from(f32::MAX) {
        return Err(CoerceError::Overflow {
            target: type_name::<f32>(),
            value: value.to_string(),
        });
    }
    Ok(wide as f32)
}

/// Text must hold exactly one character; integers are read as code points.
pub fn to_char(value: &Value) -> Result<char, CoerceError> {
    match value {
        Value::Null => Ok('\0'),
        Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(invalid::<char>(value)),
            }
        }
        Value::I64(_) | Value::U64(_) => {
            let code: u32 = to_integer(value)?;
            char::from_u32(code).ok_or_else(|| invalid::<char>(value))
        }
        Value::Bool(_) | Value::F64(_) | Value::List(_) | Value::Opaque(_) => {
            Err(unsupported::<char>(value))
        }
    }
}

/// Scalars are formatted; `Null` is the empty string.
pub fn to_string(value: &Value) -> Result<String, CoerceError> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::I64(n) => Ok(n.to_string()),
        Value::U64(n) => Ok(n.to_string()),
        Value::F64(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        Value::List(_) | Value::Opaque(_) => Err(unsupported::<String>(value)),
    }
}

#[cfg(feature = "jiff02")]
pub use self::time::*;

#[cfg(feature = "jiff02")]
mod time {
    use core::any::type_name;
    use core::time::Duration;

    use jiff::{SignedDuration, Timestamp};

    use super::{CoerceError, invalid, unsupported};
    use crate::Value;

    /// Text is parsed with the strftime-style `format`, or as RFC 3339 when
    /// `None`. `Null` is the Unix epoch.
    pub fn to_timestamp(value: &Value, format: Option<&str>) -> Result<Timestamp, CoerceError> {
        match value {
            Value::Null => Ok(Timestamp::UNIX_EPOCH),
            Value::String(s) => {
                let parsed = match format {
                    Some(format) => Timestamp::strptime(format, s),
                    None => s.parse(),
                };
                parsed.map_err(|_| invalid::<Timestamp>(value))
            }
            Value::Opaque(opaque) => opaque
                .downcast_ref::<Timestamp>()
                .copied()
                .ok_or_else(|| unsupported::<Timestamp>(value)),
            _ => Err(unsupported::<Timestamp>(value)),
        }
    }

    /// Text is parsed in the friendly (`1h30m`) or ISO 8601 (`PT1H30M`) format.
    /// `Null` is zero.
    pub fn to_signed_duration(value: &Value) -> Result<SignedDuration, CoerceError> {
        match value {
            Value::Null => Ok(SignedDuration::ZERO),
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|_| invalid::<SignedDuration>(value)),
            Value::Opaque(opaque) => {
                if let Some(duration) = opaque.downcast_ref::<SignedDuration>() {
                    Ok(*duration)
                } else if let Some(duration) = opaque.downcast_ref::<Duration>() {
                    SignedDuration::try_from(*duration).map_err(|_| CoerceError::Overflow {
                        target: type_name::<SignedDuration>(),
                        value: format!("{duration:?}"),
                    })
                } else {
                    Err(unsupported::<SignedDuration>(value))
                }
            }
            _ => Err(unsupported::<SignedDuration>(value)),
        }
    }

    /// Like [`to_signed_duration`]; negative durations are invalid.
    pub fn to_duration(value: &Value) -> Result<Duration, CoerceError> {
        if let Value::Opaque(opaque) = value
            && let Some(duration) = opaque.downcast_ref::<Duration>()
        {
            return Ok(*duration);
        }
        let signed = to_signed_duration(value).map_err(|err| match err {
            CoerceError::Invalid { value, .. } => CoerceError::Invalid {
                target: type_name::<Duration>(),
                value,
            },
            CoerceError::Unsupported { source, .. } => CoerceError::Unsupported {
                target: type_name::<Duration>(),
                source,
            },
            other => other,
        })?;
        Duration::try_from(signed).map_err(|_| invalid::<Duration>(value))
    }
}
