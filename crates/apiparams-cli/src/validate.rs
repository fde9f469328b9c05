//! # Validate Subcommand
//!
//! Validates one document against a declarative schema definition.

use std::path::PathBuf;

use anyhow::Context;
use apiparams_core::{Strategy, ValidationConfig};
use apiparams_schema::{Definition, Error, ParamError, StructuralValidator};
use clap::Args;
use serde::Serialize;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema definition (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Document to validate (YAML or JSON).
    #[arg(long)]
    pub document: PathBuf,

    /// Validation policy file (YAML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Use the JSON-Schema-backed strategy.
    #[arg(long)]
    pub structural: bool,

    /// Report every structural violation instead of the first.
    #[arg(long)]
    pub all: bool,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One reported violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Dotted location of the offending node.
    pub path: String,
    /// Rendered error.
    pub message: String,
}

impl From<&ParamError> for Violation {
    fn from(err: &ParamError) -> Self {
        Self {
            path: err.node().path(),
            message: err.to_string(),
        }
    }
}

/// Outcome of a validate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Strategy that produced the report.
    pub strategy: Strategy,
    /// Violations in report order. Empty when the document is valid.
    pub violations: Vec<Violation>,
}

impl Report {
    /// Whether the document is valid.
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Effective policy: the config file, with command-line switches on top.
pub fn effective_config(args: &ValidateArgs) -> anyhow::Result<ValidationConfig> {
    let mut config = match &args.config {
        Some(path) => ValidationConfig::load(path)?,
        None => ValidationConfig::default(),
    };
    if args.structural {
        config.strategy = Strategy::Structural;
    }
    if args.all {
        config.all_errors = true;
    }
    Ok(config)
}

/// Run the validate subcommand.
///
/// Violations are part of the report; only unusable inputs are errors.
pub fn run(args: &ValidateArgs) -> anyhow::Result<Report> {
    let config = effective_config(args)?;
    let schema = Definition::load(&args.schema)?
        .build()
        .with_context(|| format!("cannot build schema {}", args.schema.display()))?;
    let document = crate::document::load(&args.document)?;

    let violations: Vec<Violation> = match config.strategy {
        Strategy::Direct => match schema.validate_with(&document, &config) {
            Ok(()) => Vec::new(),
            Err(e) => vec![Violation::from(&e)],
        },
        Strategy::Structural => {
            let validator = StructuralValidator::new(schema);
            let result = if config.all_errors {
                validator.validate_all(&document)
            } else {
                validator.validate(&document)
            };
            match result {
                Ok(()) => Vec::new(),
                Err(Error::Param(e)) => vec![Violation::from(&e)],
                Err(Error::Params(errors)) => errors.errors().iter().map(Violation::from).collect(),
                Err(Error::Schema(e)) => return Err(e.into()),
            }
        }
    };

    tracing::info!(
        document = %args.document.display(),
        strategy = ?config.strategy,
        violations = violations.len(),
        "validation finished"
    );
    Ok(Report {
        strategy: config.strategy,
        violations,
    })
}
