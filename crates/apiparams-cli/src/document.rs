//! Loading of the documents being validated.

use std::path::Path;

use anyhow::Context;
use serde_json::Value;

/// Read a document. `.json` files are parsed as JSON, everything else as
/// YAML.
pub fn load(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read document {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let value = match ext {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
        _ => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
    };
    Ok(value)
}
