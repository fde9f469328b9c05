//! # Descriptor Resolver
//!
//! Turns a type specifier and an optional builder block into
//! exactly one [`Descriptor`]. Matching is ordered and the first matcher
//! that accepts wins:
//!
//! 1. **Passthrough.** A built descriptor is returned unchanged; a built
//!    node becomes a Reference to it. Nothing is rebuilt.
//! 2. **Custom matchers**, most recently registered first, so host code can
//!    shadow any built-in.
//! 3. **Built-ins**, in the fixed order of [`BUILTIN_ORDER`].
//!
//! A specifier no matcher accepts is a construction error
//! ([`SchemaError::Unresolved`]). There is no permissive fallback.

use std::fmt;
use std::sync::Arc;

use apiparams_core::{SchemaError, ScalarType};

use crate::builder::{Block, ParamsBuilder, TypeSpec, BOOL, NUMBER, UNDEF};
use crate::descriptor::{CustomDescriptor, Descriptor, StructDescriptor};

/// What a matcher sees besides the specifier.
#[derive(Debug)]
pub struct MatchContext<'a> {
    /// Name of the parameter being declared.
    pub name: &'a str,
    /// Resolver to build children with.
    pub resolver: &'a Arc<Resolver>,
}

/// One entry of the matcher registry.
///
/// `build` returns `None` to decline. A matcher that accepts and needs the
/// builder block takes it out of `block`; it is never run twice.
pub trait Matcher: Send + Sync {
    /// Identifier used in logs and registry listings.
    fn name(&self) -> &str;

    /// Accept or decline the specifier.
    fn build(
        &self,
        spec: &TypeSpec,
        block: &mut Option<Block>,
        ctx: &MatchContext<'_>,
    ) -> Option<Result<Descriptor, SchemaError>>;
}

/// The built-in matchers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Check function.
    Predicate,
    /// Regular expression.
    Pattern,
    /// Literal list without a block.
    Enum,
    /// `Object` marker with a block.
    Struct,
    /// `Array` marker with a block.
    Sequence,
    /// `number` sentinel.
    Number,
    /// `bool` sentinel.
    Boolean,
    /// Type marker without a block.
    Scalar,
    /// `undef` sentinel.
    Unconstrained,
}

/// Priority of the built-in matchers, highest first.
pub static BUILTIN_ORDER: [Builtin; 9] = [
    Builtin::Predicate,
    Builtin::Pattern,
    Builtin::Enum,
    Builtin::Struct,
    Builtin::Sequence,
    Builtin::Number,
    Builtin::Boolean,
    Builtin::Scalar,
    Builtin::Unconstrained,
];

impl Matcher for Builtin {
    fn name(&self) -> &str {
        match self {
            Self::Predicate => "predicate",
            Self::Pattern => "pattern",
            Self::Enum => "enum",
            Self::Struct => "struct",
            Self::Sequence => "sequence",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Scalar => "scalar",
            Self::Unconstrained => "unconstrained",
        }
    }

    fn build(
        &self,
        spec: &TypeSpec,
        block: &mut Option<Block>,
        ctx: &MatchContext<'_>,
    ) -> Option<Result<Descriptor, SchemaError>> {
        match (self, spec) {
            (Self::Predicate, TypeSpec::Predicate(p)) => Some(Ok(Descriptor::Predicate(p.clone()))),
            (Self::Pattern, TypeSpec::Pattern(re)) => Some(Ok(Descriptor::Pattern(re.clone()))),
            (Self::Enum, TypeSpec::Enum(values)) if block.is_none() => {
                Some(Ok(Descriptor::Enum(values.clone())))
            }
            (Self::Struct, TypeSpec::Scalar(ScalarType::Object)) => {
                let block = block.take()?;
                Some(build_struct(ctx.resolver, block).map(Descriptor::Struct))
            }
            (Self::Sequence, TypeSpec::Scalar(ScalarType::Array)) => {
                let block = block.take()?;
                Some(
                    build_struct(ctx.resolver, block)
                        .map(|element| Descriptor::array_of(Descriptor::Struct(element))),
                )
            }
            (Self::Number, spec) if spec.is_symbol(NUMBER) => {
                Some(Descriptor::number().map_err(|e| SchemaError::InvalidPattern {
                    name: ctx.name.to_string(),
                    reason: e.to_string(),
                }))
            }
            (Self::Boolean, spec) if spec.is_symbol(BOOL) => Some(Ok(Descriptor::Boolean)),
            (Self::Scalar, TypeSpec::Scalar(ty)) if block.is_none() => {
                Some(Ok(Descriptor::Scalar(*ty)))
            }
            (Self::Unconstrained, spec) if spec.is_symbol(UNDEF) => {
                Some(Ok(Descriptor::Unconstrained))
            }
            _ => None,
        }
    }
}

fn build_struct(
    resolver: &Arc<Resolver>,
    block: Block,
) -> Result<Arc<StructDescriptor>, SchemaError> {
    let children = ParamsBuilder::run(resolver, block)?;
    Ok(Arc::new(StructDescriptor::new(children)))
}

/// Matcher claiming one custom sentinel symbol for an extension descriptor.
#[derive(Debug, Clone)]
pub struct SymbolMatcher {
    symbol: String,
    descriptor: Arc<dyn CustomDescriptor>,
}

impl SymbolMatcher {
    /// Resolve `TypeSpec::Symbol(symbol)` to `descriptor`.
    pub fn new(symbol: impl Into<String>, descriptor: impl CustomDescriptor + 'static) -> Self {
        Self {
            symbol: symbol.into(),
            descriptor: Arc::new(descriptor),
        }
    }
}

impl Matcher for SymbolMatcher {
    fn name(&self) -> &str {
        &self.symbol
    }

    fn build(
        &self,
        spec: &TypeSpec,
        _block: &mut Option<Block>,
        _ctx: &MatchContext<'_>,
    ) -> Option<Result<Descriptor, SchemaError>> {
        spec.is_symbol(&self.symbol)
            .then(|| Ok(Descriptor::Custom(Arc::clone(&self.descriptor))))
    }
}

/// Ordered matcher registry.
///
/// Built-ins are always present and always last. Custom matchers are
/// added explicitly with [`with_matcher`](Self::with_matcher).
#[derive(Clone, Default)]
pub struct Resolver {
    custom: Vec<Arc<dyn Matcher>>,
}

impl Resolver {
    /// A registry with only the built-ins.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom matcher ahead of every matcher registered before it.
    pub fn with_matcher(mut self, matcher: impl Matcher + 'static) -> Self {
        self.register(matcher);
        self
    }

    /// In-place form of [`with_matcher`](Self::with_matcher).
    pub fn register(&mut self, matcher: impl Matcher + 'static) {
        let shadowed = self
            .matchers()
            .any(|existing| existing.name() == matcher.name());
        if shadowed {
            tracing::warn!(matcher = matcher.name(), "custom matcher shadows an existing matcher");
        }
        self.custom.push(Arc::new(matcher));
    }

    /// All matchers in priority order.
    pub fn matchers(&self) -> impl Iterator<Item = &dyn Matcher> + '_ {
        let custom = self.custom.iter().rev().map(|m| &**m as &dyn Matcher);
        let builtin = BUILTIN_ORDER.iter().map(|b| b as &dyn Matcher);
        custom.chain(builtin)
    }

    /// Names of all matchers in priority order.
    pub fn matcher_names(&self) -> Vec<&str> {
        self.matchers().map(|m| m.name()).collect()
    }

    /// Resolve one declaration.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Unresolved`] when no matcher accepts the
    /// specifier, or the error of the accepting matcher (for example a
    /// child declaration failing to resolve).
    pub fn resolve(
        self: &Arc<Self>,
        name: &str,
        spec: TypeSpec,
        block: Option<Block>,
    ) -> Result<Descriptor, SchemaError> {
        match spec {
            TypeSpec::Descriptor(descriptor) => {
                warn_ignored_block(name, &block);
                return Ok(descriptor);
            }
            TypeSpec::Node(node) => {
                warn_ignored_block(name, &block);
                return Ok(Descriptor::Reference(node));
            }
            _ => {}
        }

        let ctx = MatchContext {
            name,
            resolver: self,
        };
        let mut block = block;
        for matcher in self.matchers() {
            if let Some(result) = matcher.build(&spec, &mut block, &ctx) {
                if let Ok(descriptor) = &result {
                    tracing::debug!(
                        param = name,
                        matcher = matcher.name(),
                        kind = %descriptor.kind(),
                        "resolved descriptor"
                    );
                }
                return result;
            }
        }

        Err(SchemaError::Unresolved {
            name: name.to_string(),
            spec: spec.to_string(),
        })
    }
}

fn warn_ignored_block(name: &str, block: &Option<Block>) {
    if block.is_some() {
        tracing::warn!(param = name, "builder block ignored for a reused descriptor");
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("matchers", &self.matcher_names())
            .finish()
    }
}
