use core::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{
    BuildError, CachedStructInfoProvider, ConstTypeId, DecodeContext, DecodeError, DecodeOptions,
    DecoderBuilder, DecoderOptions, Decoded, Def, Field, MapTags, NoCacheStructInfoProvider,
    Reflect, Shape, StructInfo, StructInfoProvider, Tag, TagParser, Target, When, debug,
    struct_info_with_map_tags, trace,
};

/// Decodes inputs of type `I` into records, with call-scoped context `C`.
///
/// A decoder is immutable once built and can be shared between threads. The
/// decode plan of each record type is built on first use and cached, unless
/// caching was disabled on the builder.
///
/// ```rust,ignore
/// let decoder = Decoder::<Request, DefaultDecodeContext>::builder()
///     .operation("header", HeaderOperation)
///     .build();
///
/// let mut params = Params::default();
/// decoder.decode(&request, &mut params, &mut DefaultDecodeContext::default())?;
/// ```
pub struct Decoder<I, C> {
    options: DecoderOptions<I, C>,
    provider: Box<dyn StructInfoProvider>,
    default_map_tags: RwLock<HashMap<ConstTypeId, DefaultMapTags>>,
}

/// The default map tags of a type, with the number of times they were set.
#[derive(Clone)]
struct DefaultMapTags {
    map_tags: Arc<MapTags>,
    revision: u64,
}

impl<I, C> Decoder<I, C> {
    /// Starts building a decoder.
    pub fn builder() -> DecoderBuilder<I, C> {
        DecoderBuilder::new()
    }

    /// Creates a decoder out of built options.
    pub fn with_options(options: DecoderOptions<I, C>) -> Self {
        let provider: Box<dyn StructInfoProvider> = if options.struct_info_cache {
            Box::new(CachedStructInfoProvider::new())
        } else {
            Box::new(NoCacheStructInfoProvider)
        };
        let default_map_tags = options
            .default_map_tags
            .iter()
            .map(|(shape, map_tags)| {
                let defaults = DefaultMapTags {
                    map_tags: Arc::new(map_tags.clone()),
                    revision: 1,
                };
                (shape.strip_indirection().id, defaults)
            })
            .collect();
        Self {
            options,
            provider,
            default_map_tags: RwLock::new(default_map_tags),
        }
    }

    /// The configuration of this decoder.
    pub fn options(&self) -> &DecoderOptions<I, C> {
        &self.options
    }

    /// Registers `map_tags` for every decode of `T` that has no call map tags,
    /// replacing the previous ones. The cached plan of `T` is rebuilt on next
    /// use.
    pub fn set_default_map_tags<T: Reflect>(&self, map_tags: MapTags) {
        self.set_default_map_tags_for(T::SHAPE, map_tags);
    }

    fn set_default_map_tags_for(&self, shape: &'static Shape, map_tags: MapTags) {
        let record = shape.strip_indirection();
        {
            let mut defaults = self.default_map_tags.write();
            let revision = defaults.get(&record.id).map_or(0, |d| d.revision) + 1;
            debug!(shape = %record, revision, "registering default map tags");
            defaults.insert(
                record.id,
                DefaultMapTags {
                    map_tags: Arc::new(map_tags),
                    revision,
                },
            );
        }
        self.provider.invalidate(record);
    }

    /// The decode plan of `T`, with its default map tags applied.
    pub fn struct_info<T: Reflect>(&self) -> Result<Arc<StructInfo>, BuildError> {
        let record = T::SHAPE.strip_indirection();
        if record.struct_type().is_none() {
            return Err(BuildError::NotAStruct { shape: T::SHAPE });
        }
        self.struct_info_for(record, None)
    }

    pub(crate) fn parser(&self) -> TagParser<'_> {
        TagParser::new(
            self.options.default_required,
            &self.options.field_name_mapper,
        )
    }

    /// The plan of `record`, from the provider, with `map_tags` of the call
    /// applied over it.
    pub(crate) fn struct_info_for(
        &self,
        record: &'static Shape,
        map_tags: Option<&MapTags>,
    ) -> Result<Arc<StructInfo>, BuildError> {
        let parser = self.parser();
        let defaults = self.default_map_tags.read().get(&record.id).cloned();
        let (default_tags, revision) = match &defaults {
            Some(defaults) => (Some(&*defaults.map_tags), defaults.revision),
            None => (None, 0),
        };
        let base = self
            .provider
            .provide(record, default_tags, revision, &parser)?;
        match map_tags {
            Some(map_tags) if !map_tags.is_empty() => {
                struct_info_with_map_tags(&base, map_tags, &parser)
            }
            _ => Ok(base),
        }
    }
}

/// Follows `Option` and `Box` levels of `value` down to the record,
/// allocating absent levels.
fn descend<'v>(mut value: &'v mut dyn Any, mut shape: &'static Shape) -> Option<&'v mut dyn Any> {
    loop {
        match shape.def {
            Def::Option(option) => {
                value = (option.get_or_init)(value)?;
                shape = option.inner;
            }
            Def::Pointer(pointer) => {
                value = (pointer.get_mut)(value)?;
                shape = pointer.inner;
            }
            Def::Struct(_) => return Some(value),
            _ => return None,
        }
    }
}

impl<I, C: DecodeContext> Decoder<I, C> {
    /// Decodes `input` into `value`.
    pub fn decode<T: Reflect>(&self, input: &I, value: &mut T, ctx: &mut C) -> Result<(), DecodeError> {
        self.decode_with(input, value, DecodeOptions::new(ctx))
    }

    /// Decodes `input` into `value`, with per-call options.
    pub fn decode_with<T: Reflect>(
        &self,
        input: &I,
        value: &mut T,
        options: DecodeOptions<'_, C>,
    ) -> Result<(), DecodeError> {
        self.decode_dyn(input, value, T::SHAPE, options)
    }

    /// Decodes `input` into a type-erased `value` of shape `shape`.
    ///
    /// `shape` must be a record, possibly behind `Option` and `Box` levels.
    /// Absent levels are allocated.
    pub fn decode_dyn(
        &self,
        input: &I,
        value: &mut dyn Any,
        shape: &'static Shape,
        options: DecodeOptions<'_, C>,
    ) -> Result<(), DecodeError> {
        if !shape.is_struct_like() {
            return Err(DecodeError::InvalidDecodeTarget { shape });
        }
        let record = shape.strip_indirection();

        let mut map_tags = options.map_tags;
        if options.map_tags_as_default {
            if let Some(defaults) = map_tags.take() {
                self.set_default_map_tags_for(record, defaults.clone());
            }
        }

        let info = self.struct_info_for(record, map_tags)?;
        self.decode_info(input, value, shape, &info, options.ctx)
    }

    /// Decodes with a prebuilt plan.
    pub(crate) fn decode_info(
        &self,
        input: &I,
        value: &mut dyn Any,
        shape: &'static Shape,
        info: &StructInfo,
        ctx: &mut C,
    ) -> Result<(), DecodeError> {
        let record = descend(value, shape).ok_or(DecodeError::InvalidDecodeTarget { shape })?;
        if !info.shape.is_shape_of(record) {
            return Err(DecodeError::TypeMismatch {
                expected: info.shape,
                found: shape.strip_indirection().type_identifier,
            });
        }

        trace!(shape = %info.shape, "decoding");
        self.decode_struct(ctx, input, info, record)?;

        for (name, operation) in &self.options.operations {
            if let Some(validate) = operation.as_validate() {
                trace!(operation = %name, "validating");
                validate.validate(ctx, input).map_err(DecodeError::Operation)?;
            }
        }
        Ok(())
    }

    fn decode_struct(
        &self,
        ctx: &mut C,
        input: &I,
        info: &StructInfo,
        record: &mut dyn Any,
    ) -> Result<(), DecodeError> {
        let struct_option = info.tag.as_ref().filter(|tag| tag.is_struct_option);

        if let Some(tag) = struct_option.filter(|tag| tag.when() == When::Before) {
            self.execute_struct_option(ctx, input, info, tag, record)?;
        }

        for child in &info.children {
            let (Some(field), Some(tag)) = (child.field, child.tag.as_ref()) else {
                continue;
            };
            if tag.is_ignore() {
                continue;
            }

            let field_shape = field.shape();
            let slot = field
                .get_mut(record)
                .ok_or(DecodeError::InvalidDecodeTarget { shape: info.shape })?;

            if tag.is_recurse() || tag.is_struct_option {
                let inner = descend(slot, field_shape).ok_or(DecodeError::InvalidDecodeTarget {
                    shape: field_shape,
                })?;
                self.decode_struct(ctx, input, child, inner)?;
                continue;
            }

            let found = self.execute_operation(ctx, input, child, tag, slot, field_shape, Some(field))?;
            if !found && tag.required {
                return Err(DecodeError::RequiredValueMissing {
                    is_struct_option: false,
                    operation: tag.operation.clone(),
                    field: child.full_field_name(),
                    name: tag.name.clone(),
                });
            }
        }

        if let Some(tag) = struct_option.filter(|tag| tag.when() == When::After) {
            self.execute_struct_option(ctx, input, info, tag, record)?;
        }
        Ok(())
    }

    /// Runs a struct-level option on the record it belongs to.
    fn execute_struct_option(
        &self,
        ctx: &mut C,
        input: &I,
        info: &StructInfo,
        tag: &Tag,
        record: &mut dyn Any,
    ) -> Result<(), DecodeError> {
        let found = self.execute_operation(ctx, input, info, tag, record, info.shape, info.field)?;
        if !found && tag.required {
            return Err(DecodeError::RequiredValueMissing {
                is_struct_option: true,
                operation: tag.operation.clone(),
                field: info.display_name(),
                name: tag.name.clone(),
            });
        }
        Ok(())
    }

    /// Runs the operation of `tag` on `value` and commits what it found.
    /// Returns whether anything was found.
    #[allow(clippy::too_many_arguments)]
    fn execute_operation(
        &self,
        ctx: &mut C,
        input: &I,
        info: &StructInfo,
        tag: &Tag,
        value: &mut dyn Any,
        shape: &'static Shape,
        field: Option<&'static Field>,
    ) -> Result<bool, DecodeError> {
        let Some(operation) = self.options.operations.get(&tag.operation) else {
            return Err(DecodeError::UnknownOperation {
                operation: tag.operation.clone(),
                field: info.display_name(),
            });
        };

        trace!(field = %info.display_name(), tag = %tag, "executing operation");

        let target = Target::new(&mut *value, shape, field);
        match operation
            .decode(ctx, input, target, tag)
            .map_err(DecodeError::Operation)?
        {
            Decoded::NotFound => Ok(false),
            Decoded::Handled => Ok(true),
            Decoded::Value(found) => {
                if field.is_none() {
                    return Err(DecodeError::OperationNotSupported {
                        operation: tag.operation.clone(),
                        field: info.display_name(),
                    });
                }
                self.options
                    .resolver
                    .resolve(value, shape, found)
                    .map_err(|source| DecodeError::Resolve {
                        field: info.display_name(),
                        source,
                    })?;
                Ok(true)
            }
        }
    }
}

impl<I, C> core::fmt::Debug for Decoder<I, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Decoder")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
