//! Loading metadata dumps from disk

use super::model::Assembly;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Load an assembly model from a JSON metadata dump
pub fn load_assembly(path: &Path) -> Result<Assembly> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read metadata dump {}", path.display()))?;
    let assembly = parse_assembly(&content)
        .with_context(|| format!("Invalid metadata dump {}", path.display()))?;
    debug!(
        "Loaded assembly {} ({} types, {} methods, symbols: {})",
        assembly.name,
        assembly.types.len(),
        assembly.method_count(),
        assembly.has_debug_symbols
    );
    Ok(assembly)
}

/// Parse an assembly model from JSON text
pub fn parse_assembly(content: &str) -> Result<Assembly> {
    let mut assembly: Assembly = serde_json::from_str(content)?;
    if assembly.name.is_empty() {
        assembly.name = "<unnamed>".to_string();
    }
    Ok(assembly)
}
