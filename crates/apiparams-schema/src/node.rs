//! # Schema Nodes
//!
//! A node is one named field of a parameter tree: its name, optional human
//! description, tri-state `required` / `allow_nil` flags and the descriptor
//! resolved for it. Nodes are built once and shared through `Arc`; a node
//! can be reused anywhere by passing it as a type specifier.
//!
//! Children hold a weak back-reference to the node that first adopted
//! them. It is used for lookups ([`SchemaNode::path`]) and never owns.

use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use apiparams_core::{DescriptorKind, SchemaError, ValidationConfig};

use crate::builder::{Block, Declaration, ParamOptions, ParamsBuilder, TypeSpec};
use crate::descriptor::{Descriptor, StructDescriptor, Traversable};
use crate::resolver::Resolver;

/// A named, typed definition of one field within a parameter tree.
pub struct SchemaNode {
    name: String,
    desc: Option<String>,
    required: Option<bool>,
    allow_nil: Option<bool>,
    descriptor: Descriptor,
    parent: OnceLock<Weak<SchemaNode>>,
}

impl SchemaNode {
    /// Build a node with the built-in resolver and no builder block.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unresolved`] if no matcher accepts `spec`.
    pub fn new(
        name: impl Into<String>,
        spec: impl Into<TypeSpec>,
        options: impl Into<ParamOptions>,
    ) -> Result<Arc<Self>, SchemaError> {
        let mut declaration = Declaration::new(name, spec);
        declaration.options(options);
        Self::build(declaration, &Arc::new(Resolver::new()))
    }

    /// Build a node whose children are declared by `block`.
    pub fn with_block<F>(
        name: impl Into<String>,
        spec: impl Into<TypeSpec>,
        options: impl Into<ParamOptions>,
        block: F,
    ) -> Result<Arc<Self>, SchemaError>
    where
        F: FnOnce(&mut ParamsBuilder) + Send + 'static,
    {
        let mut declaration = Declaration::new(name, spec);
        declaration.options(options).block(block);
        Self::build(declaration, &Arc::new(Resolver::new()))
    }

    /// Resolve a declaration into a node.
    pub fn build(
        declaration: Declaration,
        resolver: &Arc<Resolver>,
    ) -> Result<Arc<Self>, SchemaError> {
        let Declaration {
            name,
            spec,
            options,
            block,
        } = declaration;
        let descriptor = resolver.resolve(&name, spec, block)?;
        Ok(Self::from_parts(name, options, descriptor))
    }

    /// Wrap an already-resolved descriptor.
    pub fn from_parts(
        name: impl Into<String>,
        options: ParamOptions,
        descriptor: Descriptor,
    ) -> Arc<Self> {
        let node = Arc::new(Self {
            name: name.into(),
            desc: options.desc,
            required: options.required,
            allow_nil: options.allow_nil,
            descriptor,
            parent: OnceLock::new(),
        });
        node.adopt_children();
        node
    }

    /// Point the parent link of owned children at this node. Children that
    /// already have a parent keep it; a merge copies the children it takes
    /// from another tree so they arrive without one.
    pub(crate) fn adopt_children(self: &Arc<Self>) {
        let owned = match &self.descriptor {
            Descriptor::Struct(s) => Some(s),
            Descriptor::Sequence(element) => match element.as_ref() {
                Descriptor::Struct(s) => Some(s),
                _ => None,
            },
            _ => None,
        };
        if let Some(s) = owned {
            for child in s.params() {
                let _ = child.parent.set(Arc::downgrade(self));
            }
        }
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human description, if declared.
    pub fn desc(&self) -> Option<&str> {
        self.desc.as_deref()
    }

    /// The `required` flag as declared.
    pub fn required_flag(&self) -> Option<bool> {
        self.required
    }

    /// The `allow_nil` flag as declared.
    pub fn allow_nil_flag(&self) -> Option<bool> {
        self.allow_nil
    }

    /// Whether the node is required under `config`'s default policy.
    pub fn is_required(&self, config: &ValidationConfig) -> bool {
        config.required(self.required)
    }

    /// Whether the node accepts `null` under `config`'s default policy.
    pub fn allows_nil(&self, config: &ValidationConfig) -> bool {
        config.allow_nil(self.allow_nil)
    }

    /// Options as declared.
    pub fn options(&self) -> ParamOptions {
        ParamOptions {
            desc: self.desc.clone(),
            required: self.required,
            allow_nil: self.allow_nil,
        }
    }

    /// The resolved descriptor.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Kind of the resolved descriptor, looking through references.
    pub fn kind(&self) -> DescriptorKind {
        self.descriptor.kind()
    }

    /// Description of the resolved descriptor.
    pub fn description(&self) -> String {
        self.descriptor.description()
    }

    /// The node that adopted this one, if it is still alive.
    pub fn parent(&self) -> Option<Arc<SchemaNode>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    /// Dotted location from the root, skipping unnamed roots.
    pub fn path(&self) -> String {
        let mut names = vec![self.name.clone()];
        let mut current = self.parent();
        while let Some(node) = current {
            names.push(node.name.clone());
            current = node.parent();
        }
        names.retain(|n| !n.is_empty());
        names.reverse();
        names.join(".")
    }

    /// Whether the descriptor has named children.
    pub fn is_traversable(&self) -> bool {
        self.descriptor.traversable().is_some()
    }

    /// Children in declaration order. Empty for leaf descriptors.
    pub fn params(&self) -> Vec<Arc<SchemaNode>> {
        self.descriptor
            .traversable()
            .map(|t| t.params())
            .unwrap_or_default()
    }

    /// Child with the given name. `None` for leaf descriptors.
    pub fn param(&self, name: &str) -> Option<Arc<SchemaNode>> {
        self.descriptor.traversable().and_then(|t| t.param(name))
    }

    /// The struct this node validates objects with, if any.
    pub fn as_struct(&self) -> Option<&Arc<StructDescriptor>> {
        self.descriptor.as_struct()
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaNode")
            .field("name", &self.name)
            .field("desc", &self.desc)
            .field("required", &self.required)
            .field("allow_nil", &self.allow_nil)
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

/// Entry point for whole schemas.
#[derive(Debug)]
pub struct Schema;

impl Schema {
    /// Build an unnamed root struct from a builder block, using the
    /// built-in resolver.
    ///
    /// Every declaration in the tree is resolved before this returns, so an
    /// unresolvable specifier anywhere fails here rather than at first use.
    pub fn define<F>(block: F) -> Result<Arc<SchemaNode>, SchemaError>
    where
        F: FnOnce(&mut ParamsBuilder) + Send + 'static,
    {
        Self::define_with(Resolver::new(), block)
    }

    /// As [`define`](Self::define), with a custom resolver.
    pub fn define_with<F>(resolver: Resolver, block: F) -> Result<Arc<SchemaNode>, SchemaError>
    where
        F: FnOnce(&mut ParamsBuilder) + Send + 'static,
    {
        let resolver = Arc::new(resolver);
        let block: Block = Box::new(block);
        let children = ParamsBuilder::run(&resolver, block)?;
        let root = Descriptor::Struct(Arc::new(StructDescriptor::new(children)));
        Ok(SchemaNode::from_parts("", ParamOptions::default(), root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use apiparams_core::ScalarType;

    fn address_schema() -> Arc<SchemaNode> {
        Schema::define(|p| {
            p.param("name", ScalarType::String);
            p.param("age", ScalarType::Integer).desc("in years");
            p.param("address", ScalarType::Object).block(|p| {
                p.param("street", ScalarType::String);
                p.param("zip", ScalarType::String);
            });
        })
        .unwrap()
    }

    fn names(nodes: &[Arc<SchemaNode>]) -> Vec<&str> {
        nodes.iter().map(|n| n.name()).collect()
    }

    #[test]
    fn define_lists_params_in_order() {
        let schema = address_schema();
        assert_eq!(names(&schema.params()), vec!["name", "age", "address"]);
        let address = schema.param("address").unwrap();
        assert_eq!(names(&address.params()), vec!["street", "zip"]);
        assert_eq!(schema.param("age").unwrap().desc(), Some("in years"));
    }

    #[test]
    fn param_lookup_through_nested_structs() {
        let schema = address_schema();
        let street = schema.param("address").unwrap().param("street").unwrap();
        assert_eq!(street.name(), "street");
        assert_eq!(street.kind(), DescriptorKind::Scalar);
    }

    #[test]
    fn leaf_nodes_have_no_params() {
        let node = SchemaNode::new("test", ScalarType::String, ParamOptions::default()).unwrap();
        assert!(!node.is_traversable());
        assert!(node.params().is_empty());
        assert!(node.param("anything").is_none());
    }

    #[test]
    fn struct_nodes_are_traversable() {
        let node = SchemaNode::with_block("test", ScalarType::Object, ParamOptions::default(), |p| {
            p.param("test", ScalarType::String);
        })
        .unwrap();
        assert!(node.is_traversable());
        assert_eq!(node.params().len(), 1);
    }

    #[test]
    fn parent_links_and_paths() {
        let schema = address_schema();
        let street = schema.param("address").unwrap().param("street").unwrap();
        assert_eq!(street.parent().unwrap().name(), "address");
        assert_eq!(street.path(), "address.street");
        assert!(schema.parent().is_none());
    }

    #[test]
    fn tri_state_flags_use_policy_when_unset() {
        let schema = Schema::define(|p| {
            p.param("a", ScalarType::String).required(true);
            p.param("b", ScalarType::String);
        })
        .unwrap();
        let config = ValidationConfig::default();
        assert!(schema.param("a").unwrap().is_required(&config));
        assert!(!schema.param("b").unwrap().is_required(&config));
        let strict = ValidationConfig {
            required_by_default: true,
            ..ValidationConfig::default()
        };
        assert!(schema.param("b").unwrap().is_required(&strict));
        assert_eq!(schema.param("b").unwrap().required_flag(), None);
    }

    #[test]
    fn builder_block_runs_exactly_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let block = move |p: &mut ParamsBuilder| {
            counter.fetch_add(1, Ordering::SeqCst);
            p.param("x", ScalarType::String);
        };
        let node =
            SchemaNode::with_block("test", ScalarType::Object, ParamOptions::default(), block)
                .unwrap();

        let first = names(&node.params()).join(",");
        let second = names(&node.params()).join(",");
        assert_eq!(first, second);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn node_reuse_shares_children() {
        let a = Schema::define(|p| {
            p.param("x", ScalarType::String);
            p.param("y", ScalarType::Integer);
        })
        .unwrap();
        let b = SchemaNode::new("b", &a, ParamOptions::default()).unwrap();
        assert_eq!(b.kind(), DescriptorKind::Struct);
        let (pa, pb) = (a.params(), b.params());
        assert_eq!(names(&pa), names(&pb));
        assert!(pa.iter().zip(&pb).all(|(l, r)| Arc::ptr_eq(l, r)));
    }

    #[test]
    fn unresolved_child_fails_at_define() {
        let err = Schema::define(|p| {
            p.param("ok", ScalarType::String);
            p.param("address", ScalarType::Object).block(|p| {
                p.param("street", TypeSpec::symbol("street_type"));
            });
        })
        .unwrap_err();
        assert!(matches!(err, SchemaError::Unresolved { ref name, .. } if name == "street"));
    }
}
