//! # apiparams CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use clap::Parser;

/// Parameter schema toolchain.
///
/// Validates documents against declarative parameter schemas and exports
/// their JSON Schema projection.
#[derive(Parser, Debug)]
#[command(name = "apiparams", version, about)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a document against a schema definition.
    Validate(apiparams_cli::validate::ValidateArgs),
    /// Print the JSON Schema projection of a schema definition.
    JsonSchema(apiparams_cli::export::JsonSchemaArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::from_default_env();
    if cli.log_json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    match cli.command {
        Commands::Validate(args) => {
            let report = apiparams_cli::validate::run(&args)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_ok() {
                println!("ok");
            } else {
                for violation in &report.violations {
                    println!("{}", violation.message);
                }
            }
            if !report.is_ok() {
                std::process::exit(1);
            }
        }
        Commands::JsonSchema(args) => {
            println!("{}", apiparams_cli::export::run(&args)?);
        }
    }

    Ok(())
}
