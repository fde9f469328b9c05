//! # JSON Schema Subcommand
//!
//! Prints the JSON Schema projection of a schema definition.

use std::path::PathBuf;

use anyhow::Context;
use apiparams_schema::Definition;
use clap::Args;

/// Arguments for the json-schema subcommand.
#[derive(Args, Debug)]
pub struct JsonSchemaArgs {
    /// Schema definition (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Pretty-print the output.
    #[arg(long)]
    pub pretty: bool,
}

/// Render the projection of `args.schema`.
pub fn run(args: &JsonSchemaArgs) -> anyhow::Result<String> {
    let schema = Definition::load(&args.schema)?
        .build()
        .with_context(|| format!("cannot build schema {}", args.schema.display()))?;
    let document = schema.to_json_schema();
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&document)?
    } else {
        serde_json::to_string(&document)?
    };
    Ok(rendered)
}
