// crates/actionruntime/src/loader.rs

use actioncore::{ActionFlow, FlowError};
use std::path::Path;

/// Read a JSON flow definition from disk
pub fn load_flow(path: impl AsRef<Path>) -> Result<ActionFlow, FlowError> {
    let path = path.as_ref();
    tracing::debug!("Loading flow from {}", path.display());
    let raw = std::fs::read_to_string(path)?;
    parse_flow(&raw)
}

/// Parse a JSON flow definition
pub fn parse_flow(raw: &str) -> Result<ActionFlow, FlowError> {
    Ok(serde_json::from_str(raw)?)
}
