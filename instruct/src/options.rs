//! Decoder configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::resolver::{DefaultResolver, Resolver};
use crate::{
    DecodeContext, DecodeOperation, DecodeOperationFn, Decoded, Decoder, MapTags, OperationError,
    Reflect, Shape, Tag, Target,
};

/// Derives the input name of a field from its operation and declared name.
pub type FieldNameMapper = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

/// The default mapper: lower-cases the declared field name.
pub fn default_field_name_mapper() -> FieldNameMapper {
    Arc::new(|_operation, field_name| field_name.to_lowercase())
}

/// Whether fields are required unless their directive says otherwise.
pub const DEFAULT_REQUIRED: bool = true;

/// The built, immutable configuration of a [`Decoder`].
pub struct DecoderOptions<I, C> {
    pub(crate) default_required: bool,
    pub(crate) operations: BTreeMap<String, Arc<dyn DecodeOperation<I, C>>>,
    pub(crate) field_name_mapper: FieldNameMapper,
    pub(crate) resolver: Arc<dyn Resolver>,
    pub(crate) struct_info_cache: bool,
    pub(crate) default_map_tags: Vec<(&'static Shape, MapTags)>,
}

impl<I, C> DecoderOptions<I, C> {
    /// Whether fields are required unless their directive says otherwise.
    pub fn default_required(&self) -> bool {
        self.default_required
    }

    /// The mapper used for directives that do not set `name`.
    pub fn field_name_mapper(&self) -> &FieldNameMapper {
        &self.field_name_mapper
    }

    /// The operation registered under `name`.
    pub fn operation(&self, name: &str) -> Option<&Arc<dyn DecodeOperation<I, C>>> {
        self.operations.get(name)
    }

    /// The resolver that commits extracted values into fields.
    pub fn resolver(&self) -> &dyn Resolver {
        &*self.resolver
    }

    /// Whether struct infos are cached per type.
    pub fn struct_info_cache(&self) -> bool {
        self.struct_info_cache
    }
}

impl<I, C> Clone for DecoderOptions<I, C> {
    fn clone(&self) -> Self {
        Self {
            default_required: self.default_required,
            operations: self.operations.clone(),
            field_name_mapper: self.field_name_mapper.clone(),
            resolver: self.resolver.clone(),
            struct_info_cache: self.struct_info_cache,
            default_map_tags: self.default_map_tags.clone(),
        }
    }
}

impl<I, C> core::fmt::Debug for DecoderOptions<I, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let operations: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        f.debug_struct("DecoderOptions")
            .field("default_required", &self.default_required)
            .field("operations", &operations)
            .field("struct_info_cache", &self.struct_info_cache)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Decoder`].
///
/// ```
/// use std::collections::HashMap;
///
/// use instruct::{Decoded, Decoder, DefaultDecodeContext, Record, Value};
///
/// type Input = HashMap<&'static str, &'static str>;
///
/// #[derive(Debug, Default, Record)]
/// struct Search {
///     #[instruct("get,name=q")]
///     pub query: String,
///     #[instruct("get")]
///     pub limit: Option<u32>,
/// }
///
/// let decoder = Decoder::<Input, DefaultDecodeContext>::builder()
///     .operation_fn("get", |_ctx, input, _target, tag| {
///         Ok(match input.get(tag.name.as_str()) {
///             Some(value) => Decoded::Value(Value::from(*value)),
///             None => Decoded::NotFound,
///         })
///     })
///     .default_required(false)
///     .build();
///
/// let mut search = Search::default();
/// let input = Input::from([("q", "shapes")]);
/// decoder.decode(&input, &mut search, &mut DefaultDecodeContext::default())?;
/// assert_eq!(search.query, "shapes");
/// assert_eq!(search.limit, None);
/// # Ok::<(), instruct::DecodeError>(())
/// ```
pub struct DecoderBuilder<I, C> {
    options: DecoderOptions<I, C>,
}

impl<I, C> Default for DecoderBuilder<I, C> {
    fn default() -> Self {
        Self {
            options: DecoderOptions {
                default_required: DEFAULT_REQUIRED,
                operations: BTreeMap::new(),
                field_name_mapper: default_field_name_mapper(),
                resolver: Arc::new(DefaultResolver::default()),
                struct_info_cache: true,
                default_map_tags: Vec::new(),
            },
        }
    }
}

impl<I, C> DecoderBuilder<I, C> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether fields are required unless their directive says otherwise.
    /// Defaults to `true`.
    pub fn default_required(mut self, default_required: bool) -> Self {
        self.options.default_required = default_required;
        self
    }

    /// Registers an extraction operation, replacing any previous one with the
    /// same name.
    pub fn operation<O>(mut self, name: impl Into<String>, operation: O) -> Self
    where
        O: DecodeOperation<I, C> + 'static,
    {
        self.options
            .operations
            .insert(name.into(), Arc::new(operation));
        self
    }

    /// Registers a closure as an extraction operation.
    pub fn operation_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&mut C, &I, Target<'_>, &Tag) -> Result<Decoded, OperationError>
            + Send
            + Sync
            + 'static,
        I: 'static,
        C: 'static,
    {
        self.operation(name, DecodeOperationFn::new(f))
    }

    /// Sets the mapper used for directives that do not set `name`.
    pub fn field_name_mapper<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.options.field_name_mapper = Arc::new(mapper);
        self
    }

    /// Whether struct infos are cached per type. Defaults to `true`.
    pub fn struct_info_cache(mut self, enabled: bool) -> Self {
        self.options.struct_info_cache = enabled;
        self
    }

    /// Replaces the resolver that commits extracted values into fields.
    pub fn resolver<R: Resolver + 'static>(mut self, resolver: R) -> Self {
        self.options.resolver = Arc::new(resolver);
        self
    }

    /// Registers map tags used for every decode of `T` that has no call map
    /// tags.
    pub fn default_map_tags<T: Reflect>(mut self, map_tags: MapTags) -> Self {
        self.options.default_map_tags.push((T::SHAPE, map_tags));
        self
    }

    /// Returns the configuration built so far.
    pub fn options(&self) -> &DecoderOptions<I, C> {
        &self.options
    }

    /// Builds the decoder.
    pub fn build(self) -> Decoder<I, C>
    where
        C: DecodeContext,
    {
        Decoder::with_options(self.options)
    }
}

/// Per-call options of [`Decoder::decode_with`].
pub struct DecodeOptions<'a, C> {
    /// The decode context handed to every operation.
    pub ctx: &'a mut C,
    /// Map tags for this call, overriding the type's directives.
    pub map_tags: Option<&'a MapTags>,
    /// Registers `map_tags` as the default of the decoded type instead of
    /// using them for this call only.
    pub map_tags_as_default: bool,
}

impl<'a, C> DecodeOptions<'a, C> {
    /// Options with no map tags.
    pub fn new(ctx: &'a mut C) -> Self {
        Self {
            ctx,
            map_tags: None,
            map_tags_as_default: false,
        }
    }

    /// Sets the call map tags.
    pub fn map_tags(mut self, map_tags: &'a MapTags) -> Self {
        self.map_tags = Some(map_tags);
        self
    }

    /// Registers the call map tags as the type's default.
    pub fn map_tags_as_default(mut self) -> Self {
        self.map_tags_as_default = true;
        self
    }
}
