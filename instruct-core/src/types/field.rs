use core::any::Any;

use super::Shape;

/// Borrows one field out of its record, given a `&mut dyn Any` of the record.
pub type FieldAccessFn = fn(&mut dyn Any) -> Option<&mut dyn Any>;

/// Describes a field in a record
#[derive(Clone, Copy, Debug)]
pub struct Field {
    /// declared name of the field
    pub name: &'static str,

    /// shape of the inner type
    ///
    /// the layer of indirection allows for cyclic type definitions
    pub shape: fn() -> &'static Shape,

    /// borrows the field out of a record of the containing type
    pub access: FieldAccessFn,

    /// directive text from `#[instruct("...")]`, if any
    pub tag: Option<&'static str>,

    /// flags set via the visibility and the derive macro
    pub flags: FieldFlags,
}

/// Flags for a [`Field`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FieldFlags {
    /// The field is declared `pub`. Only visible fields are decoded.
    pub visible: bool,

    /// The field embeds its record type (`#[instruct(flatten)]`): its fields
    /// are addressed as if they were declared on the containing record.
    pub flatten: bool,
}

impl Field {
    /// Create a new, non-visible field without a directive.
    pub const fn new(
        name: &'static str,
        shape: fn() -> &'static Shape,
        access: FieldAccessFn,
    ) -> Self {
        Self {
            name,
            shape,
            access,
            tag: None,
            flags: FieldFlags {
                visible: false,
                flatten: false,
            },
        }
    }

    /// Sets the directive text.
    pub const fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Marks the field as visible.
    pub const fn visible(mut self) -> Self {
        self.flags.visible = true;
        self
    }

    /// Marks the field as flattened.
    pub const fn flatten(mut self) -> Self {
        self.flags.flatten = true;
        self
    }

    /// Returns the shape of the inner type
    pub fn shape(&self) -> &'static Shape {
        (self.shape)()
    }

    /// Returns true if the field is declared `pub`.
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.flags.visible
    }

    /// Returns true if the field is flattened.
    #[inline]
    pub fn is_flattened(&self) -> bool {
        self.flags.flatten
    }

    /// Borrows this field out of `record`.
    ///
    /// Returns `None` if `record` is not of the type that declares this field.
    pub fn get_mut<'a>(&self, record: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        (self.access)(record)
    }
}
