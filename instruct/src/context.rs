use std::collections::{HashMap, HashSet};

use crate::{FieldNameMapper, default_field_name_mapper};

/// Per-operation sets of names that were consumed.
///
/// Decode contexts use it to let operations check that every input value was
/// used; the struct-info builder uses it to check that every map tags entry was
/// visited.
#[derive(Clone, Debug, Default)]
pub struct UsedValues {
    values: HashMap<String, HashSet<String>>,
}

impl UsedValues {
    /// Records `name` as used by `operation`.
    pub fn mark(&mut self, operation: &str, name: impl Into<String>) {
        self.values
            .entry(operation.to_owned())
            .or_default()
            .insert(name.into());
    }

    /// Names used by `operation`, if any.
    pub fn get(&self, operation: &str) -> Option<&HashSet<String>> {
        self.values.get(operation)
    }

    /// Returns true if `operation` used `name`.
    pub fn contains(&self, operation: &str, name: &str) -> bool {
        self.get(operation).is_some_and(|names| names.contains(name))
    }
}

/// Call-scoped state handed to every extraction operation.
pub trait DecodeContext {
    /// Signals that `operation` consumed the input value `name`.
    fn value_used(&mut self, operation: &str, name: &str);

    /// The names consumed by `operation` so far.
    fn used_values(&self, operation: &str) -> Option<&HashSet<String>>;

    /// The mapper used to derive names from field names.
    fn field_name_mapper(&self) -> &FieldNameMapper;
}

/// The standard decode context.
#[derive(Clone)]
pub struct DefaultDecodeContext {
    field_name_mapper: FieldNameMapper,
    used_values: UsedValues,
}

impl DefaultDecodeContext {
    /// Create a context with the given field name mapper.
    pub fn new(field_name_mapper: FieldNameMapper) -> Self {
        Self {
            field_name_mapper,
            used_values: UsedValues::default(),
        }
    }

    /// All values used so far.
    pub fn all_used_values(&self) -> &UsedValues {
        &self.used_values
    }
}

impl Default for DefaultDecodeContext {
    fn default() -> Self {
        Self::new(default_field_name_mapper())
    }
}

impl core::fmt::Debug for DefaultDecodeContext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DefaultDecodeContext")
            .field("used_values", &self.used_values)
            .finish_non_exhaustive()
    }
}

impl DecodeContext for DefaultDecodeContext {
    fn value_used(&mut self, operation: &str, name: &str) {
        self.used_values.mark(operation, name);
    }

    fn used_values(&self, operation: &str) -> Option<&HashSet<String>> {
        self.used_values.get(operation)
    }

    fn field_name_mapper(&self) -> &FieldNameMapper {
        &self.field_name_mapper
    }
}
