use core::marker::PhantomData;
use std::sync::Arc;

use crate::{
    BuildError, DecodeContext, DecodeError, Decoder, MapTags, Record, StructInfo,
    struct_info_with_map_tags,
};

/// A [`Decoder`] bound to one record type, with its plan built up front.
///
/// Configuration errors surface when the type decoder is created instead of on
/// the first decode.
///
/// ```rust,ignore
/// let decoder = TypeDecoder::<Request, DefaultDecodeContext, Params>::new(decoder)?;
/// let params = decoder.decode(&request, &mut DefaultDecodeContext::default())?;
/// ```
pub struct TypeDecoder<I, C, T> {
    decoder: Decoder<I, C>,
    info: Arc<StructInfo>,
    _marker: PhantomData<fn() -> T>,
}

impl<I, C, T: Record> TypeDecoder<I, C, T> {
    /// Binds `decoder` to `T`.
    pub fn new(decoder: Decoder<I, C>) -> Result<Self, BuildError> {
        let info = decoder.struct_info::<T>()?;
        Ok(Self {
            decoder,
            info,
            _marker: PhantomData,
        })
    }

    /// Binds `decoder` to `T`, registering `map_tags` as the default map tags
    /// of `T` first. They may configure fields without a declared directive.
    pub fn with_map_tags(decoder: Decoder<I, C>, map_tags: &MapTags) -> Result<Self, BuildError> {
        decoder.set_default_map_tags::<T>(map_tags.clone());
        let info = decoder.struct_info::<T>()?;
        Ok(Self {
            decoder,
            info,
            _marker: PhantomData,
        })
    }

    /// The wrapped decoder.
    pub fn decoder(&self) -> &Decoder<I, C> {
        &self.decoder
    }

    /// The plan every decode uses.
    pub fn struct_info(&self) -> &Arc<StructInfo> {
        &self.info
    }
}

impl<I, C: DecodeContext, T: Record> TypeDecoder<I, C, T> {
    /// Decodes `input` into a new `T`.
    pub fn decode(&self, input: &I, ctx: &mut C) -> Result<T, DecodeError> {
        let mut value = T::default();
        self.decode_into(input, &mut value, ctx)?;
        Ok(value)
    }

    /// Decodes `input` into an existing `value`. Fields with nothing in the
    /// input keep their current value.
    pub fn decode_into(&self, input: &I, value: &mut T, ctx: &mut C) -> Result<(), DecodeError> {
        self.decoder
            .decode_info(input, value, T::SHAPE, &self.info, ctx)
    }

    /// Decodes `input` into a new `T`, with `map_tags` applied for this call
    /// only.
    pub fn decode_with(
        &self,
        input: &I,
        ctx: &mut C,
        map_tags: &MapTags,
    ) -> Result<T, DecodeError> {
        let info = struct_info_with_map_tags(&self.info, map_tags, &self.decoder.parser())?;
        let mut value = T::default();
        self.decoder
            .decode_info(input, &mut value, T::SHAPE, &info, ctx)?;
        Ok(value)
    }
}

impl<I, C, T> core::fmt::Debug for TypeDecoder<I, C, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeDecoder")
            .field("shape", &format_args!("{}", self.info.shape))
            .finish_non_exhaustive()
    }
}
