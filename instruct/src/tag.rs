//! Directive parsing.
//!
//! A directive is a comma-separated list: `operation[,key=value]*`. The first
//! token names the extraction operation. `name`, `required`, `so_when` and
//! `so_recurse` are reserved keys; every other key is kept as an option for the
//! operation to interpret.

use core::fmt;

use indexmap::IndexMap;

use crate::FieldNameMapper;

/// Operation that skips a field entirely.
pub const OPERATION_IGNORE: &str = "-";

/// Operation that decodes a nested record field by field.
pub const OPERATION_RECURSE: &str = "recurse";

/// When a struct-level option runs, relative to the fields of its record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum When {
    /// Before any field of the record is decoded.
    Before,
    /// After all fields of the record are decoded.
    #[default]
    After,
}

impl When {
    fn parse(value: &str) -> Option<When> {
        match value {
            "before" => Some(When::Before),
            "after" => Some(When::After),
            _ => None,
        }
    }

    /// The textual form, as written in a directive.
    pub fn as_str(self) -> &'static str {
        match self {
            When::Before => "before",
            When::After => "after",
        }
    }
}

impl fmt::Display for When {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    /// Extraction operation, e.g. `header`.
    pub operation: String,
    /// Name of the value in the input, e.g. the header name.
    pub name: String,
    /// Whether decoding fails when the operation finds nothing.
    pub required: bool,
    /// Operation-specific options.
    pub options: TagOptions,
    /// The directive is a struct-level option.
    pub is_struct_option: bool,
    /// Struct-level options: when to run. `None` means [`When::After`].
    pub so_when: Option<When>,
    /// Struct-level options: whether the fields of the record are decoded too.
    pub so_recurse: bool,
}

impl Tag {
    /// A directive synthesized for nested records (`recurse`).
    pub(crate) fn implicit(operation: &str, field_name: &str, parser: &TagParser<'_>) -> Tag {
        Tag {
            operation: operation.to_owned(),
            name: (parser.field_name_mapper)(operation, field_name),
            required: parser.default_required,
            options: TagOptions::default(),
            is_struct_option: false,
            so_when: None,
            so_recurse: false,
        }
    }

    /// Phase of a struct-level option.
    pub fn when(&self) -> When {
        self.so_when.unwrap_or_default()
    }

    /// True for the `-` operation.
    pub fn is_ignore(&self) -> bool {
        self.operation == OPERATION_IGNORE
    }

    /// True for the `recurse` operation.
    pub fn is_recurse(&self) -> bool {
        self.operation == OPERATION_RECURSE
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(name={}", self.operation, self.name)?;
        if self.required {
            f.write_str(", required")?;
        }
        for (key, value) in self.options.iter() {
            write!(f, ", {key}={value}")?;
        }
        f.write_str(")")?;
        if self.is_struct_option {
            write!(f, " so(when={}, recurse={})", self.when(), self.so_recurse)?;
        }
        Ok(())
    }
}

/// Free-form options of a directive, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagOptions {
    options: IndexMap<String, String>,
}

impl TagOptions {
    /// Returns true if the option was declared.
    pub fn exists(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Returns the value of the option, if declared.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Returns the value of the option, or `default` if not declared.
    pub fn value<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }

    /// Returns the option parsed as a boolean, or `default` if not declared.
    pub fn bool_value(&self, name: &str, default: bool) -> Result<bool, TagError> {
        match self.get(name) {
            Some(value) => parse_bool(value).ok_or_else(|| TagError::InvalidBool {
                key: name.to_owned(),
                value: value.to_owned(),
            }),
            None => Ok(default),
        }
    }

    /// Iterates over the options in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns true if there are no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn insert(&mut self, key: &str, value: &str) {
        self.options.insert(key.to_owned(), value.to_owned());
    }
}

/// Errors in directive text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TagError {
    /// The first token is empty.
    EmptyOperation,

    /// An option without `=`.
    UnnamedOption {
        /// the offending token
        option: String,
    },

    /// `required` is not a boolean.
    InvalidRequired {
        /// the declared value
        value: String,
    },

    /// `so_when` is neither `before` nor `after`.
    InvalidStructOptionWhen {
        /// the declared value
        value: String,
    },

    /// `so_recurse` is not a boolean.
    InvalidStructOptionRecurse {
        /// the declared value
        value: String,
    },

    /// An `so_` key other than `so_when` and `so_recurse`.
    UnknownStructOption {
        /// the declared key
        key: String,
    },

    /// A free-form option read as a boolean is not one.
    InvalidBool {
        /// the option key
        key: String,
        /// the declared value
        value: String,
    },
}

impl fmt::Display for TagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagError::EmptyOperation => f.write_str("operation cannot be blank"),
            TagError::UnnamedOption { option } => write!(f, "unnamed tag option: {option}"),
            TagError::InvalidRequired { value } => {
                write!(f, "error parsing 'required' boolean option: {value:?}")
            }
            TagError::InvalidStructOptionWhen { value } => {
                write!(f, "invalid 'when' option value: {value}")
            }
            TagError::InvalidStructOptionRecurse { value } => {
                write!(f, "error parsing 'so_recurse' boolean option: {value:?}")
            }
            TagError::UnknownStructOption { key } => {
                write!(f, "unknown struct option name: {key}")
            }
            TagError::InvalidBool { key, value } => {
                write!(f, "error parsing '{key}' boolean option: {value:?}")
            }
        }
    }
}

impl core::error::Error for TagError {}

/// Parses the textual boolean forms `1 t T true TRUE True 0 f F false FALSE False`.
pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

/// Settings shared by every directive parsed for one decoder.
#[derive(Clone, Copy)]
pub struct TagParser<'a> {
    pub(crate) default_required: bool,
    pub(crate) field_name_mapper: &'a FieldNameMapper,
}

impl<'a> TagParser<'a> {
    /// Create a parser.
    pub fn new(default_required: bool, field_name_mapper: &'a FieldNameMapper) -> Self {
        Self {
            default_required,
            field_name_mapper,
        }
    }

    /// Parses directive text declared for `field_name`.
    pub fn parse(&self, field_name: &str, text: &str) -> Result<Tag, TagError> {
        parse_tag(
            field_name,
            text,
            self.default_required,
            self.field_name_mapper,
        )
    }
}

/// Parses one directive.
///
/// `field_name` is the declared field name; it is passed through
/// `field_name_mapper` when the directive does not set `name`.
pub fn parse_tag(
    field_name: &str,
    text: &str,
    default_required: bool,
    field_name_mapper: &FieldNameMapper,
) -> Result<Tag, TagError> {
    let mut tokens = text.split(',');

    let operation = match tokens.next() {
        Some(operation) if !operation.is_empty() => operation,
        _ => return Err(TagError::EmptyOperation),
    };

    let mut tag = Tag {
        operation: operation.to_owned(),
        name: String::new(),
        required: default_required,
        options: TagOptions::default(),
        is_struct_option: false,
        so_when: None,
        so_recurse: false,
    };

    for token in tokens.filter(|token| !token.is_empty()) {
        let Some((key, value)) = token.split_once('=') else {
            return Err(TagError::UnnamedOption {
                option: token.to_owned(),
            });
        };
        match key {
            "name" => tag.name = value.to_owned(),
            "required" => {
                tag.required = parse_bool(value).ok_or_else(|| TagError::InvalidRequired {
                    value: value.to_owned(),
                })?;
            }
            "so_when" => {
                tag.so_when = Some(When::parse(value).ok_or_else(|| {
                    TagError::InvalidStructOptionWhen {
                        value: value.to_owned(),
                    }
                })?);
            }
            "so_recurse" => {
                tag.so_recurse =
                    parse_bool(value).ok_or_else(|| TagError::InvalidStructOptionRecurse {
                        value: value.to_owned(),
                    })?;
            }
            _ if key.starts_with("so_") => {
                return Err(TagError::UnknownStructOption {
                    key: key.to_owned(),
                });
            }
            _ => tag.options.insert(key, value),
        }
    }

    if tag.name.is_empty() {
        tag.name = field_name_mapper(&tag.operation, field_name);
    }
    Ok(tag)
}
