use std::sync::Arc;

use crate::{
    BuildError, Field, MapTag, MapTags, OPERATION_RECURSE, STRUCT_OPTION_MAP_TAG, Shape,
    StructInfo, StructOption, Tag, TagParser, UsedValues, debug, trace,
};

/// Used-values key of visited map tags entries.
const MAP_TAG_VALUE_KEY: &str = "map-tag";

/// Builds the decode plan of the record `shape`, applying `map_tags` over the
/// declared directives.
pub(crate) fn build_struct_info(
    shape: &'static Shape,
    map_tags: Option<&MapTags>,
    parser: &TagParser<'_>,
) -> Result<Arc<StructInfo>, BuildError> {
    debug!(shape = %shape, "building struct info");
    let mut builder = Builder::new(map_tags, parser);
    builder.build_root(shape, None)
}

/// Applies call `map_tags` over a built plan, without changing it.
///
/// Only map tags entries are consulted, plus declared directives for fields
/// the base plan never visited. Subtrees without entries are shared.
pub(crate) fn struct_info_with_map_tags(
    base: &Arc<StructInfo>,
    map_tags: &MapTags,
    parser: &TagParser<'_>,
) -> Result<Arc<StructInfo>, BuildError> {
    debug!(shape = %base.shape, "applying call map tags");
    let mut builder = Builder::new(Some(map_tags), parser);
    builder.build_root(base.shape, Some(base))
}

struct Builder<'a> {
    map_tags: Option<&'a MapTags>,
    parser: &'a TagParser<'a>,
    used: UsedValues,
}

fn dotted(level: &[&str]) -> String {
    level.join(".")
}

fn with_segment(level: &[&'static str], segment: &'static str) -> Vec<&'static str> {
    let mut level = level.to_vec();
    level.push(segment);
    level
}

/// The dotted level, or the type name at the root.
fn level_name(level: &[&str], shape: &'static Shape) -> String {
    if level.is_empty() {
        shape.to_string()
    } else {
        dotted(level)
    }
}

fn is_marker(field: &Field) -> bool {
    field.shape().is_type::<StructOption>()
}

impl<'a> Builder<'a> {
    fn new(map_tags: Option<&'a MapTags>, parser: &'a TagParser<'a>) -> Self {
        Self {
            map_tags,
            parser,
            used: UsedValues::default(),
        }
    }

    fn build_root(
        &mut self,
        shape: &'static Shape,
        base: Option<&Arc<StructInfo>>,
    ) -> Result<Arc<StructInfo>, BuildError> {
        let record = shape.strip_indirection();
        if record.struct_type().is_none() {
            return Err(BuildError::NotAStruct { shape });
        }

        let tag = match base {
            Some(base) => self
                .map_struct_option(&[], record)?
                .or_else(|| base.tag.clone()),
            None => self.struct_option(&[], record)?,
        };

        let mut root = StructInfo {
            shape: record,
            field: None,
            field_index: 0,
            tag,
            path: Vec::new(),
            children: Vec::new(),
        };
        self.fill(&mut root, &[], base.map(|base| &**base))?;

        if let Some(map_tags) = self.map_tags {
            map_tags.check_unused_fields(self.used.get(MAP_TAG_VALUE_KEY))?;
        }
        Ok(Arc::new(root))
    }

    /// Builds the children of `node`, when its directive calls for them.
    ///
    /// `level` is where the map tags of the node's fields live. `base` is the
    /// node of a previous plan for the same field, if any.
    fn fill(
        &mut self,
        node: &mut StructInfo,
        level: &[&'static str],
        base: Option<&StructInfo>,
    ) -> Result<(), BuildError> {
        match &node.tag {
            Some(tag) if tag.is_struct_option => {
                if tag.is_ignore() {
                    return Err(BuildError::CannotIgnoreStructOption {
                        path: node.display_name(),
                    });
                }
                if !tag.so_recurse {
                    return Ok(());
                }
            }
            Some(tag) if node.field.is_some() && !tag.is_recurse() => return Ok(()),
            _ => {}
        }

        let Some(struct_type) = node.shape.struct_type() else {
            return Ok(());
        };

        for (index, field) in struct_type.fields.iter().enumerate() {
            if !field.is_visible() || is_marker(field) {
                continue;
            }
            let field_level = with_segment(level, field.name);
            let base_child = base.and_then(|base| {
                base.children
                    .iter()
                    .find(|child| child.field_index == index)
            });

            if let Some(base_child) = base_child
                && !field.is_flattened()
                && !self.touches(&field_level)
            {
                node.children.push(base_child.clone());
                continue;
            }

            let tag = match base_child {
                Some(base_child) => self.override_field_tag(field, &field_level, base_child)?,
                None => self.field_tag(field, &field_level)?,
            };
            let Some(tag) = tag else {
                return Err(BuildError::MissingFieldConfiguration {
                    path: dotted(&field_level),
                });
            };
            trace!(path = %dotted(&field_level), tag = %tag, "field directive");

            if tag.is_recurse() && !field.shape().is_struct_like() {
                return Err(BuildError::RecurseOnNonStruct {
                    path: dotted(&field_level),
                    shape: field.shape(),
                });
            }

            let child_level = if field.is_flattened() {
                level.to_vec()
            } else {
                field_level.clone()
            };
            let mut child = StructInfo {
                shape: field.shape().strip_indirection(),
                field: Some(field),
                field_index: index,
                tag: Some(tag),
                path: field_level,
                children: Vec::new(),
            };
            self.fill(&mut child, &child_level, base_child.map(|base| &**base))?;
            node.children.push(Arc::new(child));
        }
        Ok(())
    }

    fn touches(&self, level: &[&str]) -> bool {
        self.map_tags.is_some_and(|map_tags| map_tags.touches(level))
    }

    fn mark_used(&mut self, level: &[&str]) {
        self.used.mark(MAP_TAG_VALUE_KEY, dotted(level));
    }

    fn parse(&self, level: &[&str], field_name: &str, text: &str) -> Result<Tag, BuildError> {
        self.parser
            .parse(field_name, text)
            .map_err(|source| BuildError::Tag {
                path: dotted(level),
                source,
            })
    }

    /// The map tags entry of a field: directive text, or for nested entries on
    /// records, their `_` struct-level option or else `recurse`.
    fn map_field_tag(
        &mut self,
        field: &'static Field,
        level: &[&'static str],
    ) -> Result<Option<MapEntry>, BuildError> {
        let Some(entry) = self.map_tags.and_then(|map_tags| map_tags.find_path(level)) else {
            return Ok(None);
        };
        self.mark_used(level);
        match entry {
            MapTag::Tag(text) => Ok(Some(MapEntry::Tag(self.parse(level, field.name, text)?))),
            MapTag::Nested(_) if field.shape().is_struct_like() => {
                let shape = field.shape().strip_indirection();
                match self.map_struct_option(level, shape)? {
                    Some(tag) => Ok(Some(MapEntry::Tag(tag))),
                    None => Ok(Some(MapEntry::Nested)),
                }
            }
            MapTag::Nested(_) => Err(BuildError::InvalidMapEntryType {
                path: dotted(level),
            }),
        }
    }

    /// Directive of a field, by priority: map tags, declared directive,
    /// implicit `recurse` for flattened records, struct-level option of the
    /// field's record type.
    fn field_tag(
        &mut self,
        field: &'static Field,
        level: &[&'static str],
    ) -> Result<Option<Tag>, BuildError> {
        match self.map_field_tag(field, level)? {
            Some(MapEntry::Tag(tag)) => return Ok(Some(tag)),
            Some(MapEntry::Nested) => return Ok(Some(self.implicit_recurse(field))),
            None => {}
        }
        if let Some(text) = field.tag {
            return self.parse(level, field.name, text).map(Some);
        }
        if field.is_flattened() && field.shape().is_struct_like() {
            return Ok(Some(self.implicit_recurse(field)));
        }
        if field.shape().is_struct_like() {
            return self.struct_option(level, field.shape().strip_indirection());
        }
        Ok(None)
    }

    /// Directive of a field already in a base plan: map tags, else the base
    /// directive.
    fn override_field_tag(
        &mut self,
        field: &'static Field,
        level: &[&'static str],
        base: &StructInfo,
    ) -> Result<Option<Tag>, BuildError> {
        match self.map_field_tag(field, level)? {
            Some(MapEntry::Tag(tag)) => return Ok(Some(tag)),
            Some(MapEntry::Nested) => {
                if let Some(tag) = base.tag.as_ref().filter(|tag| tag.is_recurse()) {
                    return Ok(Some(tag.clone()));
                }
                return Ok(Some(self.implicit_recurse(field)));
            }
            None => {}
        }
        Ok(base.tag.clone())
    }

    fn implicit_recurse(&self, field: &Field) -> Tag {
        Tag::implicit(OPERATION_RECURSE, field.name, self.parser)
    }

    /// The struct-level option of the record `shape` at `level`: the `_` map
    /// tags entry, else the `StructOption` marker field.
    fn struct_option(
        &mut self,
        level: &[&'static str],
        shape: &'static Shape,
    ) -> Result<Option<Tag>, BuildError> {
        if let Some(tag) = self.map_struct_option(level, shape)? {
            return Ok(Some(tag));
        }

        let Some(struct_type) = shape.struct_type() else {
            return Ok(None);
        };
        let mut markers = struct_type.fields.iter().filter(|field| is_marker(field));
        let Some(marker) = markers.next() else {
            return Ok(None);
        };
        if markers.next().is_some() {
            return Err(BuildError::MultipleStructOptions {
                path: level_name(level, shape),
            });
        }
        let Some(text) = marker.tag else {
            return Ok(None);
        };
        let mut tag = self
            .parser
            .parse(marker.name, text)
            .map_err(|source| BuildError::Tag {
                path: level_name(level, shape),
                source,
            })?;
        tag.is_struct_option = true;
        Ok(Some(tag))
    }

    fn map_struct_option(
        &mut self,
        level: &[&'static str],
        shape: &'static Shape,
    ) -> Result<Option<Tag>, BuildError> {
        let so_level = with_segment(level, STRUCT_OPTION_MAP_TAG);
        let Some(text) = self
            .map_tags
            .and_then(|map_tags| map_tags.find_tag(&so_level))
        else {
            return Ok(None);
        };
        self.mark_used(&so_level);
        let mut tag = self
            .parser
            .parse(STRUCT_OPTION_MAP_TAG, text)
            .map_err(|source| BuildError::Tag {
                path: level_name(&so_level, shape),
                source,
            })?;
        tag.is_struct_option = true;
        Ok(Some(tag))
    }
}

enum MapEntry {
    Tag(Tag),
    Nested,
}
