use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

use crate::error::{InvokeError, Result};

pub type Request = Map<String, Value>;

/// Reads a fixture file that must hold a single JSON object.
pub fn load(path: &Path) -> Result<Request> {
    let content = std::fs::read_to_string(path).map_err(|source| InvokeError::Fixture {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| {
        InvokeError::FixtureJson {
            path: path.to_path_buf(),
            source,
        }
    })?;
    match value {
        Value::Object(map) => {
            debug!(path = %path.display(), keys = map.len(), "loaded fixture");
            Ok(map)
        }
        _ => Err(InvokeError::NotAnObject {
            path: path.to_path_buf(),
        }),
    }
}

/// Copy of `base` with every key of `overlay` inserted or replaced.
/// Existing keys keep their position, new ones are appended.
pub fn merge(base: &Request, overlay: &Request) -> Request {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Loads both fixtures and merges them.
pub fn load_merged(base: &Path, overlay: &Path) -> Result<Request> {
    let base = load(base)?;
    let overlay = load(overlay)?;
    Ok(merge(&base, &overlay))
}

/// Single-line JSON terminated by a newline, the way `echo` would pipe it.
pub fn encode_line(request: &Request) -> Result<String> {
    let mut line = serde_json::to_string(request)?;
    line.push('\n');
    Ok(line)
}
