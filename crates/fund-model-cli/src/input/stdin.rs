use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialize a piped scenario document from stdin.
///
/// An interactive terminal or an empty pipe means "no document", so the
/// caller falls back to defaults plus flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_document(&buffer)
}

fn parse_document<T: DeserializeOwned>(raw: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let document = serde_json::from_str(trimmed)
        .map_err(|e| format!("Failed to parse scenario document on stdin: {}", e))?;
    tracing::debug!(bytes = trimmed.len(), "read scenario document from stdin");
    Ok(Some(document))
}
