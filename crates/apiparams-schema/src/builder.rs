//! # Definition Surface
//!
//! Type specifiers, declaration options and the builder handed to every
//! builder block. Declaring a parameter only records it; resolution happens
//! when the enclosing block has finished, so a block can declare its
//! parameters in any style and the schema is still built in one pass.
//!
//! ```
//! use apiparams_schema::{Schema, ScalarType, TypeSpec};
//!
//! let schema = Schema::define(|p| {
//!     p.param("name", ScalarType::String).required(true);
//!     p.param("age", TypeSpec::number()).desc("in years");
//!     p.param("address", ScalarType::Object).block(|p| {
//!         p.param("street", ScalarType::String);
//!         p.param("zip", ScalarType::String);
//!     });
//! })
//! .unwrap();
//!
//! assert_eq!(schema.param("address").unwrap().params().len(), 2);
//! ```

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use apiparams_core::{string_form, SchemaError, ScalarType};
use regex::Regex;
use serde_json::Value;

use crate::descriptor::{Descriptor, Predicate};
use crate::node::SchemaNode;
use crate::resolver::Resolver;

/// Sentinel symbol for the Unconstrained descriptor.
pub const UNDEF: &str = "undef";
/// Sentinel symbol for the Number descriptor.
pub const NUMBER: &str = "number";
/// Sentinel symbol for the Boolean descriptor.
pub const BOOL: &str = "bool";

/// A deferred block that declares child parameters. Runs at most once.
pub type Block = Box<dyn FnOnce(&mut ParamsBuilder) + Send>;

/// What an author writes in the type position of a declaration.
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// A type marker. `Object` and `Array` with a block declare a Struct
    /// or a Sequence of Struct.
    Scalar(ScalarType),
    /// A regular expression.
    Pattern(Regex),
    /// An ordered literal list.
    Enum(Vec<Value>),
    /// A check function.
    Predicate(Predicate),
    /// A named sentinel: `undef`, `number`, `bool`, or one claimed by a
    /// custom matcher.
    Symbol(String),
    /// An already-resolved descriptor, used unchanged.
    Descriptor(Descriptor),
    /// An already-built node, reused by reference.
    Node(Arc<SchemaNode>),
}

impl TypeSpec {
    /// The `undef` sentinel.
    pub fn undef() -> Self {
        Self::Symbol(UNDEF.to_string())
    }

    /// The `number` sentinel.
    pub fn number() -> Self {
        Self::Symbol(NUMBER.to_string())
    }

    /// The `bool` sentinel.
    pub fn bool() -> Self {
        Self::Symbol(BOOL.to_string())
    }

    /// A custom sentinel.
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// An ordered literal list.
    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    /// Whether this is the given sentinel.
    pub fn is_symbol(&self, name: &str) -> bool {
        matches!(self, Self::Symbol(s) if s == name)
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(ty) => write!(f, "type {ty}"),
            Self::Pattern(re) => write!(f, "pattern /{}/", re.as_str()),
            Self::Enum(values) => {
                let joined: Vec<String> = values.iter().map(string_form).collect();
                write!(f, "enum [{}]", joined.join(", "))
            }
            Self::Predicate(_) => f.write_str("predicate"),
            Self::Symbol(name) => write!(f, "symbol :{name}"),
            Self::Descriptor(d) => write!(f, "{} descriptor", d.kind()),
            Self::Node(node) => write!(f, "node '{}'", node.name()),
        }
    }
}

impl From<ScalarType> for TypeSpec {
    fn from(ty: ScalarType) -> Self {
        Self::Scalar(ty)
    }
}

impl From<Regex> for TypeSpec {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<Vec<Value>> for TypeSpec {
    fn from(values: Vec<Value>) -> Self {
        Self::Enum(values)
    }
}

impl From<Predicate> for TypeSpec {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

impl From<Descriptor> for TypeSpec {
    fn from(descriptor: Descriptor) -> Self {
        Self::Descriptor(descriptor)
    }
}

impl From<Arc<SchemaNode>> for TypeSpec {
    fn from(node: Arc<SchemaNode>) -> Self {
        Self::Node(node)
    }
}

impl From<&Arc<SchemaNode>> for TypeSpec {
    fn from(node: &Arc<SchemaNode>) -> Self {
        Self::Node(Arc::clone(node))
    }
}

/// Author-supplied options of a declaration. Unset flags fall back to the
/// validation policy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOptions {
    /// Human description.
    pub desc: Option<String>,
    /// Tri-state required flag.
    pub required: Option<bool>,
    /// Tri-state allow-nil flag.
    pub allow_nil: Option<bool>,
}

impl ParamOptions {
    /// Empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the description.
    pub fn desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Set the required flag.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Set the allow-nil flag.
    pub fn allow_nil(mut self, allow_nil: bool) -> Self {
        self.allow_nil = Some(allow_nil);
        self
    }

    /// Overlay `other`: every field set there wins.
    pub fn merged(mut self, other: ParamOptions) -> Self {
        if other.desc.is_some() {
            self.desc = other.desc;
        }
        if other.required.is_some() {
            self.required = other.required;
        }
        if other.allow_nil.is_some() {
            self.allow_nil = other.allow_nil;
        }
        self
    }
}

/// A bare string in the options position is the description.
impl From<&str> for ParamOptions {
    fn from(desc: &str) -> Self {
        Self::new().desc(desc)
    }
}

impl From<String> for ParamOptions {
    fn from(desc: String) -> Self {
        Self::new().desc(desc)
    }
}

/// One recorded `param` call.
pub struct Declaration {
    pub(crate) name: String,
    pub(crate) spec: TypeSpec,
    pub(crate) options: ParamOptions,
    pub(crate) block: Option<Block>,
}

impl Declaration {
    /// A declaration with no options and no block.
    pub fn new(name: impl Into<String>, spec: impl Into<TypeSpec>) -> Self {
        Self {
            name: name.into(),
            spec: spec.into(),
            options: ParamOptions::default(),
            block: None,
        }
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the human description.
    pub fn desc(&mut self, desc: impl Into<String>) -> &mut Self {
        self.options.desc = Some(desc.into());
        self
    }

    /// Set the required flag.
    pub fn required(&mut self, required: bool) -> &mut Self {
        self.options.required = Some(required);
        self
    }

    /// Set the allow-nil flag.
    pub fn allow_nil(&mut self, allow_nil: bool) -> &mut Self {
        self.options.allow_nil = Some(allow_nil);
        self
    }

    /// Overlay a description or an options set.
    pub fn options(&mut self, options: impl Into<ParamOptions>) -> &mut Self {
        self.options = std::mem::take(&mut self.options).merged(options.into());
        self
    }

    /// Attach the builder block declaring this parameter's children.
    pub fn block<F>(&mut self, block: F) -> &mut Self
    where
        F: FnOnce(&mut ParamsBuilder) + Send + 'static,
    {
        self.block = Some(Box::new(block));
        self
    }
}

impl fmt::Debug for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("name", &self.name)
            .field("spec", &self.spec)
            .field("options", &self.options)
            .field("block", &self.block.is_some())
            .finish()
    }
}

/// Receiver of `param` calls inside a builder block.
pub struct ParamsBuilder {
    resolver: Arc<Resolver>,
    declarations: Vec<Declaration>,
}

impl ParamsBuilder {
    pub(crate) fn new(resolver: Arc<Resolver>) -> Self {
        Self {
            resolver,
            declarations: Vec::new(),
        }
    }

    /// Declare a parameter. Chain `desc`, `required`, `allow_nil`,
    /// `options` and `block` on the result.
    pub fn param(
        &mut self,
        name: impl Into<String>,
        spec: impl Into<TypeSpec>,
    ) -> &mut Declaration {
        self.push(Declaration::new(name, spec))
    }

    /// Record a prepared declaration.
    pub fn push(&mut self, declaration: Declaration) -> &mut Declaration {
        self.declarations.push(declaration);
        let last = self.declarations.len() - 1;
        &mut self.declarations[last]
    }

    /// Run `block` against a fresh builder and resolve what it declared.
    pub(crate) fn run(
        resolver: &Arc<Resolver>,
        block: Block,
    ) -> Result<Vec<Arc<SchemaNode>>, SchemaError> {
        let mut builder = Self::new(Arc::clone(resolver));
        block(&mut builder);
        builder.finish()
    }

    fn finish(self) -> Result<Vec<Arc<SchemaNode>>, SchemaError> {
        {
            let mut seen = HashSet::new();
            for declaration in &self.declarations {
                if !seen.insert(declaration.name.as_str()) {
                    return Err(SchemaError::DuplicateParam {
                        name: declaration.name.clone(),
                    });
                }
            }
        }

        self.declarations
            .into_iter()
            .map(|declaration| SchemaNode::build(declaration, &self.resolver))
            .collect()
    }
}

impl fmt::Debug for ParamsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamsBuilder")
            .field("declarations", &self.declarations)
            .finish_non_exhaustive()
    }
}
