//! # Descriptors
//!
//! A descriptor is the validation strategy bound to one schema node. Each
//! node carries exactly one, produced by the [`Resolver`](crate::Resolver)
//! from the declared type specifier.
//!
//! Leaf descriptors (everything except Struct and Sequence) decide validity
//! on their own through [`Descriptor::check`]. Struct and Sequence own child
//! nodes; the validator walks them. A Reference is a shared link to another
//! node and answers every question with that node's descriptor.

use std::fmt;
use std::sync::Arc;

use apiparams_core::{string_form, DescriptorKind, ScalarType};
use parking_lot::RwLock;
use regex::Regex;
use serde_json::Value;

use crate::node::SchemaNode;

/// Source of the Number descriptor's fixed pattern.
pub const NUMBER_PATTERN: &str = "^(0|[1-9][0-9]*)$";

/// The literals a Boolean descriptor accepts, compared in string form.
pub const BOOLEAN_VALUES: [&str; 2] = ["true", "false"];

const DEFAULT_PREDICATE_DESCRIPTION: &str = "Must pass custom validation";

/// Outcome of checking a value against a leaf descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The value is valid.
    Accept,
    /// The value is invalid, with the reason to report.
    Reject(String),
}

impl Verdict {
    /// Whether the verdict accepts.
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }

    fn from_check(ok: bool, description: impl FnOnce() -> String) -> Self {
        if ok {
            Self::Accept
        } else {
            Self::Reject(description())
        }
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Accept
        } else {
            Self::Reject("false".to_string())
        }
    }
}

/// A returned message is always a rejection, whatever it says.
impl From<&str> for Verdict {
    fn from(message: &str) -> Self {
        Self::Reject(message.to_string())
    }
}

impl From<String> for Verdict {
    fn from(message: String) -> Self {
        Self::Reject(message)
    }
}

/// Only the boolean `true` accepts. Strings are used verbatim as the
/// reason, any other value as its JSON text.
impl From<Value> for Verdict {
    fn from(value: Value) -> Self {
        match value {
            Value::Bool(true) => Self::Accept,
            Value::String(message) => Self::Reject(message),
            other => Self::Reject(other.to_string()),
        }
    }
}

impl<E: fmt::Display> From<Result<(), E>> for Verdict {
    fn from(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::Accept,
            Err(e) => Self::Reject(e.to_string()),
        }
    }
}

type CheckFn = dyn Fn(&Value) -> Verdict + Send + Sync;

/// A caller-supplied check function.
///
/// The function may return anything convertible into a [`Verdict`]: a
/// `bool`, a message, a `serde_json::Value` or a `Result<(), E>`.
#[derive(Clone)]
pub struct Predicate {
    check: Arc<CheckFn>,
    description: String,
}

impl Predicate {
    /// Wrap a check function.
    pub fn new<F, R>(check: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: Into<Verdict>,
    {
        Self {
            check: Arc::new(move |value| check(value).into()),
            description: DEFAULT_PREDICATE_DESCRIPTION.to_string(),
        }
    }

    /// Replace the static description used in projections and structural errors.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Run the check.
    pub fn check(&self, value: &Value) -> Verdict {
        (self.check)(value)
    }

    /// Static description.
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// An extension descriptor produced by a host-registered matcher.
pub trait CustomDescriptor: fmt::Debug + Send + Sync {
    /// Whether `value` is valid.
    fn is_valid(&self, value: &Value) -> bool;

    /// Reason reported when a value is invalid.
    fn description(&self) -> String;

    /// JSON Schema fragment for this descriptor. Defaults to an
    /// unconstrained fragment carrying the description.
    fn json_schema(&self) -> Value {
        serde_json::json!({ "type": "any", "description": self.description() })
    }
}

/// Capability of descriptors that have named children.
pub trait Traversable {
    /// Children in declaration order.
    fn params(&self) -> Vec<Arc<SchemaNode>>;

    /// Child with the given name.
    fn param(&self, name: &str) -> Option<Arc<SchemaNode>> {
        self.params().into_iter().find(|p| p.name() == name)
    }
}

/// Object-shaped descriptor with an ordered set of named children.
///
/// The child list is fixed once built. [`merge_with`](Self::merge_with)
/// is the only operation that replaces it, and it does so under the write
/// lock in one step.
#[derive(Debug)]
pub struct StructDescriptor {
    children: RwLock<Arc<[Arc<SchemaNode>]>>,
}

impl StructDescriptor {
    /// A struct over already-built children.
    pub fn new(children: Vec<Arc<SchemaNode>>) -> Self {
        Self {
            children: RwLock::new(children.into()),
        }
    }

    pub(crate) fn replace_children(&self, children: Vec<Arc<SchemaNode>>) {
        *self.children.write() = children.into();
    }
}

impl Traversable for StructDescriptor {
    fn params(&self) -> Vec<Arc<SchemaNode>> {
        self.children.read().to_vec()
    }

    fn param(&self, name: &str) -> Option<Arc<SchemaNode>> {
        self.children.read().iter().find(|p| p.name() == name).cloned()
    }
}

/// The validation strategy bound to a schema node.
#[derive(Debug, Clone)]
pub enum Descriptor {
    /// JSON type check.
    Scalar(ScalarType),
    /// String matching a regular expression.
    Pattern(Regex),
    /// Equality with one of an ordered list of literals.
    Enum(Vec<Value>),
    /// Caller-supplied check.
    Predicate(Predicate),
    /// Object with named children.
    Struct(Arc<StructDescriptor>),
    /// Homogeneous list; every element is validated against one descriptor.
    Sequence(Arc<Descriptor>),
    /// Accepts anything.
    Unconstrained,
    /// String form matches [`NUMBER_PATTERN`].
    Number(Regex),
    /// String form is one of [`BOOLEAN_VALUES`].
    Boolean,
    /// Shared link to a previously built node.
    Reference(Arc<SchemaNode>),
    /// Host extension.
    Custom(Arc<dyn CustomDescriptor>),
}

impl Descriptor {
    /// The Number descriptor.
    pub fn number() -> Result<Self, regex::Error> {
        Regex::new(NUMBER_PATTERN).map(Self::Number)
    }

    /// A Sequence whose elements are validated against `element`.
    ///
    /// Passing a node builds a list schema that reuses the node's
    /// descriptor without rebuilding it.
    pub fn array_of(element: impl Into<Descriptor>) -> Self {
        Self::Sequence(Arc::new(element.into()))
    }

    /// Follow references to the concrete descriptor.
    pub fn target(&self) -> &Descriptor {
        let mut current = self;
        while let Self::Reference(node) = current {
            current = node.descriptor();
        }
        current
    }

    /// Variant of the concrete descriptor.
    pub fn kind(&self) -> DescriptorKind {
        match self.target() {
            Self::Scalar(_) => DescriptorKind::Scalar,
            Self::Pattern(_) => DescriptorKind::Pattern,
            Self::Enum(_) => DescriptorKind::Enum,
            Self::Predicate(_) => DescriptorKind::Predicate,
            Self::Struct(_) => DescriptorKind::Struct,
            Self::Sequence(_) => DescriptorKind::Sequence,
            Self::Unconstrained => DescriptorKind::Unconstrained,
            Self::Number(_) => DescriptorKind::Number,
            Self::Boolean => DescriptorKind::Boolean,
            Self::Custom(_) => DescriptorKind::Custom,
            Self::Reference(node) => node.descriptor().kind(),
        }
    }

    /// The struct behind this descriptor, directly or as a list element.
    pub fn traversable(&self) -> Option<&dyn Traversable> {
        match self.target() {
            Self::Struct(s) => Some(s.as_ref()),
            Self::Sequence(element) => element.traversable(),
            _ => None,
        }
    }

    /// The struct behind this descriptor, if it is one (not a list of one).
    pub fn as_struct(&self) -> Option<&Arc<StructDescriptor>> {
        match self.target() {
            Self::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Static description, used as the reason of invalid-value errors.
    pub fn description(&self) -> String {
        match self.target() {
            Self::Scalar(ty) => format!("Must be {ty}"),
            Self::Pattern(re) => format!("Must match regular expression /{}/.", re.as_str()),
            Self::Enum(values) => {
                let joined: Vec<String> = values.iter().map(string_form).collect();
                format!("Must be one of: {}.", joined.join(", "))
            }
            Self::Predicate(p) => p.description().to_string(),
            Self::Struct(_) => "Must be an Object".to_string(),
            Self::Sequence(_) => "Must be an Array".to_string(),
            Self::Unconstrained => String::new(),
            Self::Number(_) => "Must be a number.".to_string(),
            Self::Boolean => "Must be 'true' or 'false'".to_string(),
            Self::Custom(c) => c.description(),
            Self::Reference(node) => node.descriptor().description(),
        }
    }

    /// Check a value against this descriptor alone.
    ///
    /// For Struct and Sequence this only checks the container type; the
    /// validator is responsible for the children.
    pub fn check(&self, value: &Value) -> Verdict {
        let descriptor = self.target();
        let describe = || descriptor.description();
        match descriptor {
            Self::Scalar(ty) => Verdict::from_check(ty.matches(value), describe),
            Self::Pattern(re) => {
                let ok = value.as_str().is_some_and(|s| re.is_match(s));
                Verdict::from_check(ok, describe)
            }
            Self::Enum(values) => Verdict::from_check(values.contains(value), describe),
            Self::Predicate(p) => p.check(value),
            Self::Struct(_) => Verdict::from_check(value.is_object(), describe),
            Self::Sequence(_) => Verdict::from_check(value.is_array(), describe),
            Self::Unconstrained => Verdict::Accept,
            Self::Number(re) => Verdict::from_check(re.is_match(&string_form(value)), describe),
            Self::Boolean => {
                let form = string_form(value);
                Verdict::from_check(BOOLEAN_VALUES.contains(&form.as_str()), describe)
            }
            Self::Custom(c) => Verdict::from_check(c.is_valid(value), describe),
            Self::Reference(node) => node.descriptor().check(value),
        }
    }
}

impl From<Arc<SchemaNode>> for Descriptor {
    fn from(node: Arc<SchemaNode>) -> Self {
        Self::Reference(node)
    }
}

impl From<&Arc<SchemaNode>> for Descriptor {
    fn from(node: &Arc<SchemaNode>) -> Self {
        Self::Reference(Arc::clone(node))
    }
}

impl From<ScalarType> for Descriptor {
    fn from(ty: ScalarType) -> Self {
        Self::Scalar(ty)
    }
}

/// Free-function spelling of [`Descriptor::array_of`].
pub fn array_of(element: impl Into<Descriptor>) -> Descriptor {
    Descriptor::array_of(element)
}
