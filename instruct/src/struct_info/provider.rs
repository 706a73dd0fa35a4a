use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{BuildError, ConstTypeId, MapTags, Shape, StructInfo, TagParser, trace};

use super::build_struct_info;

/// Supplies the decode plan of a record type, possibly from a cache.
pub trait StructInfoProvider: Send + Sync {
    /// Returns the plan of `shape`, built with the type's default `map_tags`.
    ///
    /// `revision` counts the changes of those defaults: a stored plan of an
    /// older revision is stale and must not be returned.
    fn provide(
        &self,
        shape: &'static Shape,
        map_tags: Option<&MapTags>,
        revision: u64,
        parser: &TagParser<'_>,
    ) -> Result<Arc<StructInfo>, BuildError>;

    /// Forgets any stored plan of `shape`.
    fn invalidate(&self, shape: &'static Shape) {
        let _ = shape;
    }
}

/// Builds a fresh plan on every call.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCacheStructInfoProvider;

impl StructInfoProvider for NoCacheStructInfoProvider {
    fn provide(
        &self,
        shape: &'static Shape,
        map_tags: Option<&MapTags>,
        _revision: u64,
        parser: &TagParser<'_>,
    ) -> Result<Arc<StructInfo>, BuildError> {
        build_struct_info(shape, map_tags, parser)
    }
}

/// Builds the plan of each type once per revision of its default map tags.
///
/// Two threads racing on the first build of a type both build it; the first
/// stored plan wins. A build that started before the defaults changed never
/// replaces a plan of a newer revision.
#[derive(Debug, Default)]
pub struct CachedStructInfoProvider {
    cache: RwLock<HashMap<ConstTypeId, (u64, Arc<StructInfo>)>>,
}

impl CachedStructInfoProvider {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached plans.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

impl StructInfoProvider for CachedStructInfoProvider {
    fn provide(
        &self,
        shape: &'static Shape,
        map_tags: Option<&MapTags>,
        revision: u64,
        parser: &TagParser<'_>,
    ) -> Result<Arc<StructInfo>, BuildError> {
        let key = shape.strip_indirection().id;
        if let Some((cached, info)) = self.cache.read().get(&key)
            && *cached == revision
        {
            trace!(shape = %shape, "struct info cache hit");
            return Ok(info.clone());
        }

        trace!(shape = %shape, revision, "struct info cache miss");
        let info = build_struct_info(shape, map_tags, parser)?;
        match self.cache.write().entry(key) {
            Entry::Vacant(entry) => {
                entry.insert((revision, info.clone()));
            }
            Entry::Occupied(mut entry) => {
                let (cached, stored) = entry.get();
                if *cached == revision {
                    return Ok(stored.clone());
                }
                if *cached < revision {
                    entry.insert((revision, info.clone()));
                }
            }
        }
        Ok(info)
    }

    fn invalidate(&self, shape: &'static Shape) {
        self.cache.write().remove(&shape.strip_indirection().id);
    }
}
