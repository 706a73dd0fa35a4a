use std::collections::HashSet;

use indexmap::IndexMap;

use crate::BuildError;

/// Map tags key holding the struct-level option of its level.
pub const STRUCT_OPTION_MAP_TAG: &str = "_";

/// Directives supplied as data, keyed by declared field name.
///
/// Map tags override the `#[instruct(...)]` attributes of a record. A nested
/// entry addresses the fields of a nested record; on a record-typed field it
/// also implies `recurse`. Every entry must be used while building, otherwise
/// the build fails with [`BuildError::UnusedMapTagField`].
///
/// ```
/// use instruct::map_tags;
///
/// let map_tags = map_tags! {
///     "Name" => "header,name=x-name",
///     "Paging" => {
///         "Page" => "query",
///     },
/// };
/// assert_eq!(map_tags.find_tag(&["Paging", "Page"]), Some("query"));
/// assert_eq!(map_tags.paths(), ["Name", "Paging", "Paging.Page"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapTags {
    entries: IndexMap<String, MapTag>,
}

/// One entry of [`MapTags`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapTag {
    /// Directive text, parsed like an `#[instruct("...")]` attribute.
    Tag(String),
    /// Directives for the fields of a nested record.
    Nested(MapTags),
}

impl From<&str> for MapTag {
    fn from(value: &str) -> Self {
        MapTag::Tag(value.to_owned())
    }
}

impl From<String> for MapTag {
    fn from(value: String) -> Self {
        MapTag::Tag(value)
    }
}

impl From<MapTags> for MapTag {
    fn from(value: MapTags) -> Self {
        MapTag::Nested(value)
    }
}

impl MapTags {
    /// Create empty map tags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directive for `field`.
    pub fn tag(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(field, MapTag::Tag(text.into()));
        self
    }

    /// Adds directives for the fields of the nested record `field`.
    pub fn nested(mut self, field: impl Into<String>, map_tags: MapTags) -> Self {
        self.insert(field, MapTag::Nested(map_tags));
        self
    }

    /// Adds the struct-level option of this level.
    pub fn struct_option(self, text: impl Into<String>) -> Self {
        self.tag(STRUCT_OPTION_MAP_TAG, text)
    }

    /// Inserts an entry, replacing any previous one for `field`.
    pub fn insert(&mut self, field: impl Into<String>, entry: impl Into<MapTag>) {
        self.entries.insert(field.into(), entry.into());
    }

    /// Returns the entry for `field`.
    pub fn get(&self, field: &str) -> Option<&MapTag> {
        self.entries.get(field)
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MapTag)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Finds the entry at `path`, descending into nested entries.
    pub fn find_path(&self, path: &[&str]) -> Option<&MapTag> {
        let (first, rest) = path.split_first()?;
        let entry = self.entries.get(*first)?;
        if rest.is_empty() {
            return Some(entry);
        }
        match entry {
            MapTag::Nested(nested) => nested.find_path(rest),
            MapTag::Tag(_) => None,
        }
    }

    /// Finds the directive text at `path`, ignoring nested entries.
    pub fn find_tag(&self, path: &[&str]) -> Option<&str> {
        match self.find_path(path)? {
            MapTag::Tag(text) => Some(text),
            MapTag::Nested(_) => None,
        }
    }

    /// Returns true if any entry lives at or below `path`.
    pub(crate) fn touches(&self, path: &[&str]) -> bool {
        (path.is_empty() && !self.is_empty()) || self.find_path(path).is_some()
    }

    /// Every entry, as a dotted path, in insertion order. Nested entries list
    /// themselves before their children.
    pub fn paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        self.collect_paths("", &mut paths);
        paths
    }

    fn collect_paths(&self, prefix: &str, paths: &mut Vec<String>) {
        for (key, entry) in &self.entries {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            if let MapTag::Nested(nested) = entry {
                paths.push(path.clone());
                nested.collect_paths(&path, paths);
            } else {
                paths.push(path);
            }
        }
    }

    /// Checks that every entry was visited while building.
    pub fn check_unused_fields(&self, used: Option<&HashSet<String>>) -> Result<(), BuildError> {
        for path in self.paths() {
            if !used.is_some_and(|used| used.contains(&path)) {
                return Err(BuildError::UnusedMapTagField { path });
            }
        }
        Ok(())
    }
}

/// Builds [`MapTags`].
///
/// Values are string literals, or braces holding the entries of a nested
/// record:
///
/// ```
/// use instruct::{MapTag, MapTags, map_tags};
///
/// let map_tags = map_tags! {
///     "_" => "body,so_when=before",
///     "Auth" => {
///         "Token" => "header,name=authorization",
///     },
/// };
/// assert_eq!(
///     map_tags,
///     MapTags::new()
///         .struct_option("body,so_when=before")
///         .nested("Auth", MapTags::new().tag("Token", "header,name=authorization")),
/// );
/// assert!(matches!(map_tags.get("Auth"), Some(MapTag::Nested(_))));
/// ```
#[macro_export]
macro_rules! map_tags {
    (@value { $($inner:tt)* }) => {
        $crate::MapTag::Nested($crate::map_tags! { $($inner)* })
    };
    (@value $value:expr) => {
        $crate::MapTag::from($value)
    };
    ($($key:literal => $value:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map_tags = $crate::MapTags::new();
        $(
            map_tags.insert($key, $crate::map_tags!(@value $value));
        )*
        map_tags
    }};
}
