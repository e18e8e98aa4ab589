use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use vigil_core::PatternData;

/// Read the whole input: a file, or stdin for `None` / `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display())),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

/// Decode bundles from a single object, a JSON array, or a stream of
/// whitespace-separated objects (JSON lines).
///
/// Decoding checks types only; range checks happen when a bundle is scored.
pub fn parse_bundles(text: &str) -> Result<Vec<PatternData>> {
    let mut values = Vec::new();
    for (i, value) in serde_json::Deserializer::from_str(text)
        .into_iter::<Value>()
        .enumerate()
    {
        match value.with_context(|| format!("input document #{i} is not valid JSON"))? {
            Value::Array(items) => values.extend(items),
            other => values.push(other),
        }
    }

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            serde_json::from_value::<PatternData>(value)
                .with_context(|| format!("bundle #{i} is malformed"))
        })
        .collect()
}

/// Decode one JSON-lines record.
pub fn parse_line(line: &str) -> Result<PatternData> {
    serde_json::from_str(line).context("malformed bundle")
}
