//! The decode plan of a record type.
//!
//! A [`StructInfo`] tree holds one node per decoded field, with the effective
//! directive of each. Trees are immutable and shared: applying call map tags
//! builds a new root that reuses every untouched subtree.

use core::fmt;
use std::sync::Arc;

use crate::{Field, Shape, Tag};

mod build;
pub(crate) use build::*;

mod provider;
pub use provider::*;

/// One node of a decode plan.
#[derive(Clone, Debug)]
pub struct StructInfo {
    pub(crate) shape: &'static Shape,
    pub(crate) field: Option<&'static Field>,
    pub(crate) field_index: usize,
    pub(crate) tag: Option<Tag>,
    pub(crate) path: Vec<&'static str>,
    pub(crate) children: Vec<Arc<StructInfo>>,
}

impl StructInfo {
    /// Shape of the node, with `Option` and `Box` indirections stripped.
    pub fn shape(&self) -> &'static Shape {
        self.shape
    }

    /// The field of the node; `None` on the root.
    pub fn field(&self) -> Option<&'static Field> {
        self.field
    }

    /// The effective directive. `None` only on a root without a struct-level
    /// option.
    pub fn tag(&self) -> Option<&Tag> {
        self.tag.as_ref()
    }

    /// Declared field names from the root. Flattened fields add no segment to
    /// their children.
    pub fn path(&self) -> &[&'static str] {
        &self.path
    }

    /// The path, dotted.
    pub fn full_field_name(&self) -> String {
        self.path.join(".")
    }

    /// The child nodes, in declaration order.
    pub fn children(&self) -> &[Arc<StructInfo>] {
        &self.children
    }

    /// The child node of the field declared as `name`.
    pub fn child(&self, name: &str) -> Option<&Arc<StructInfo>> {
        self.children
            .iter()
            .find(|child| child.field.is_some_and(|field| field.name == name))
    }

    /// True if the directive is a struct-level option.
    pub fn is_struct_option(&self) -> bool {
        self.tag.as_ref().is_some_and(|tag| tag.is_struct_option)
    }

    /// The dotted path, or the type name on the root.
    pub(crate) fn display_name(&self) -> String {
        if self.path.is_empty() {
            self.shape.to_string()
        } else {
            self.full_field_name()
        }
    }

    /// Writes the tree, one node per line.
    pub fn dump(&self, w: &mut dyn fmt::Write) -> fmt::Result {
        self.dump_indent(0, w)
    }

    fn dump_indent(&self, depth: usize, w: &mut dyn fmt::Write) -> fmt::Result {
        write!(w, "{:width$}- ", "", width = depth * 2)?;
        match self.field {
            Some(field) => write!(
                w,
                "{} [/{}] (type: {}, field type: {})",
                field.name,
                self.path.join("/"),
                self.shape,
                field.shape()
            )?,
            None => write!(w, "{{ROOT}} [/] (type: {})", self.shape)?,
        }
        if let Some(tag) = &self.tag {
            write!(w, " {tag}")?;
        }
        writeln!(w)?;
        for child in &self.children {
            child.dump_indent(depth + 1, w)?;
        }
        Ok(())
    }
}

impl fmt::Display for StructInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump(f)
    }
}
