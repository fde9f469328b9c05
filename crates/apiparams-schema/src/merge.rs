//! # Schema Merge
//!
//! Union of two struct schemas by child name.
//!
//! - Names present on one side only keep their definition. Left-hand names
//!   come first in declaration order, then right-only names.
//! - For a shared name the right-hand node is the base: its options and,
//!   for leaves, its descriptor win.
//! - Two structs (or two sequences of structs) under a shared name are
//!   merged recursively rather than replaced.
//! - A shared name whose shapes differ (leaf, struct, sequence) is a
//!   [`SchemaError::MergeConflict`].
//!
//! [`merge`] builds a new tree and leaves its inputs untouched.
//! [`StructDescriptor::merge_with`] and [`SchemaNode::merge_with`] update a
//! struct in place; the merged child list is computed in full before it is
//! swapped in, so a failed merge changes nothing.
//!
//! Children that end up under a node other than their original parent are
//! copied, so [`SchemaNode::path`] always reports the merged ancestry.

use std::collections::HashMap;
use std::sync::Arc;

use apiparams_core::SchemaError;

use crate::descriptor::{Descriptor, StructDescriptor, Traversable};
use crate::node::SchemaNode;

enum Shape<'a> {
    Leaf,
    Struct(&'a Arc<StructDescriptor>),
    Sequence(&'a Descriptor),
}

fn shape(descriptor: &Descriptor) -> Shape<'_> {
    match descriptor.target() {
        Descriptor::Struct(s) => Shape::Struct(s),
        Descriptor::Sequence(element) => Shape::Sequence(element.as_ref()),
        _ => Shape::Leaf,
    }
}

/// Merge two descriptors into a new one.
///
/// # Errors
///
/// Returns [`SchemaError::MergeConflict`] when the two sides, or any pair of
/// same-named children below them, have different shapes.
pub fn merge(left: &Descriptor, right: &Descriptor) -> Result<Descriptor, SchemaError> {
    merge_descriptors("", left, right)
}

fn merge_descriptors(
    name: &str,
    left: &Descriptor,
    right: &Descriptor,
) -> Result<Descriptor, SchemaError> {
    match (shape(left), shape(right)) {
        (Shape::Struct(l), Shape::Struct(r)) => {
            let children = merge_children(&l.params(), &r.params(), Keep::Copy)?;
            Ok(Descriptor::Struct(Arc::new(StructDescriptor::new(children))))
        }
        (Shape::Sequence(l), Shape::Sequence(r)) => {
            Ok(Descriptor::array_of(merge_descriptors(name, l, r)?))
        }
        (Shape::Leaf, Shape::Leaf) => Ok(right.clone()),
        _ => Err(SchemaError::MergeConflict {
            name: name.to_string(),
            left: left.kind(),
            right: right.kind(),
        }),
    }
}

/// How left-only children enter the merged list.
#[derive(Clone, Copy)]
enum Keep {
    /// The list replaces the left struct's own; children stay as they are.
    InPlace,
    /// The list belongs to a new struct; children are copied for adoption.
    Copy,
}

fn merge_children(
    left: &[Arc<SchemaNode>],
    right: &[Arc<SchemaNode>],
    keep: Keep,
) -> Result<Vec<Arc<SchemaNode>>, SchemaError> {
    let by_name: HashMap<&str, &Arc<SchemaNode>> =
        right.iter().map(|n| (n.name(), n)).collect();

    let mut merged = Vec::with_capacity(left.len() + right.len());
    for l in left {
        match by_name.get(l.name()) {
            Some(r) => merged.push(merge_nodes(l, r)?),
            None => merged.push(match keep {
                Keep::InPlace => Arc::clone(l),
                Keep::Copy => detached(l),
            }),
        }
    }
    merged.extend(
        right
            .iter()
            .filter(|r| !left.iter().any(|l| l.name() == r.name()))
            .map(detached),
    );
    Ok(merged)
}

fn merge_nodes(
    left: &Arc<SchemaNode>,
    right: &Arc<SchemaNode>,
) -> Result<Arc<SchemaNode>, SchemaError> {
    if Arc::ptr_eq(left, right) {
        return Ok(Arc::clone(left));
    }
    if let (Shape::Leaf, Shape::Leaf) = (shape(left.descriptor()), shape(right.descriptor())) {
        return Ok(detached(right));
    }
    let descriptor = merge_descriptors(right.name(), left.descriptor(), right.descriptor())?;
    tracing::debug!(param = right.name(), kind = %descriptor.kind(), "merged parameter");
    Ok(SchemaNode::from_parts(right.name(), right.options(), descriptor))
}

/// A copy of `node` taken from another tree, with no parent link yet.
///
/// Owned structs are copied all the way down so every copied child names
/// the merged tree as its ancestry. References stay shared.
fn detached(node: &Arc<SchemaNode>) -> Arc<SchemaNode> {
    let descriptor = match node.descriptor() {
        Descriptor::Struct(s) => Descriptor::Struct(Arc::new(detached_struct(s))),
        Descriptor::Sequence(element) => match element.as_ref() {
            Descriptor::Struct(s) => {
                Descriptor::array_of(Descriptor::Struct(Arc::new(detached_struct(s))))
            }
            _ => Descriptor::Sequence(Arc::clone(element)),
        },
        other => other.clone(),
    };
    SchemaNode::from_parts(node.name(), node.options(), descriptor)
}

fn detached_struct(s: &StructDescriptor) -> StructDescriptor {
    StructDescriptor::new(s.params().iter().map(detached).collect())
}

/// The pair of structs an in-place merge combines. `None` when the two
/// descriptors differ in shape.
fn struct_pair<'a>(
    left: &'a Descriptor,
    right: &'a Descriptor,
) -> Option<(&'a Arc<StructDescriptor>, &'a Arc<StructDescriptor>)> {
    match (shape(left), shape(right)) {
        (Shape::Struct(l), Shape::Struct(r)) => Some((l, r)),
        (Shape::Sequence(l), Shape::Sequence(r)) => struct_pair(l, r),
        _ => None,
    }
}

/// Struct owned by `descriptor`, directly or as a list element.
fn owned_struct(descriptor: &Descriptor) -> Option<&Arc<StructDescriptor>> {
    match descriptor.target() {
        Descriptor::Struct(s) => Some(s),
        Descriptor::Sequence(element) => owned_struct(element),
        _ => None,
    }
}

/// Name of the first child under `tree` whose struct is `target`.
fn find_struct(tree: &StructDescriptor, target: &StructDescriptor) -> Option<String> {
    tree.params().iter().find_map(|child| {
        let s = owned_struct(child.descriptor())?;
        if std::ptr::eq(s.as_ref(), target) {
            Some(child.name().to_string())
        } else {
            find_struct(s, target)
        }
    })
}

impl StructDescriptor {
    /// Merge `other`'s children into this struct.
    ///
    /// Merging a struct with itself is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Cycle`] if `other` contains this struct and
    /// [`SchemaError::MergeConflict`] on a shape mismatch. On error the
    /// child list is unchanged.
    pub fn merge_with(&self, other: &StructDescriptor) -> Result<(), SchemaError> {
        if std::ptr::eq(self, other) {
            return Ok(());
        }
        if let Some(name) = find_struct(other, self) {
            return Err(SchemaError::Cycle { name });
        }
        let merged = merge_children(&self.params(), &other.params(), Keep::InPlace)?;
        self.replace_children(merged);
        Ok(())
    }
}

impl SchemaNode {
    /// Merge `other`'s children into this node's struct in place.
    ///
    /// Both nodes must be structs, or both sequences of structs. Children
    /// taken from `other` are copied and adopted by this node.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MergeConflict`] when the shapes differ, and
    /// the errors of [`StructDescriptor::merge_with`].
    pub fn merge_with(self: &Arc<Self>, other: &Arc<SchemaNode>) -> Result<(), SchemaError> {
        match struct_pair(self.descriptor(), other.descriptor()) {
            Some((s, o)) => {
                s.merge_with(o)?;
                self.adopt_children();
                tracing::debug!(
                    param = self.name(),
                    children = s.params().len(),
                    "merged schema in place"
                );
                Ok(())
            }
            _ => Err(SchemaError::MergeConflict {
                name: self.name().to_string(),
                left: self.kind(),
                right: other.kind(),
            }),
        }
    }

    /// A new node holding the union of this node's and `other`'s children.
    pub fn merged(
        self: &Arc<Self>,
        other: &Arc<SchemaNode>,
    ) -> Result<Arc<SchemaNode>, SchemaError> {
        let descriptor = merge_descriptors(self.name(), self.descriptor(), other.descriptor())?;
        let options = self.options().merged(other.options());
        Ok(SchemaNode::from_parts(self.name(), options, descriptor))
    }
}
