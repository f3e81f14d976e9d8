//! Edge-list text loading.
//!
//! Format: one `u v` pair per line, whitespace separated. Blank lines and lines
//! starting with `#` or `%` are skipped. Extra columns (weights, timestamps) are
//! ignored.

use std::io::BufRead;
use std::path::Path;

use super::GraphError;

/// Parses an edge list from a buffered reader.
///
/// # Errors
/// Returns [`GraphError::Parse`] with the 1-based line number of the first
/// malformed line, or [`GraphError::Io`] on read failure.
pub fn read_edge_list<R: BufRead>(reader: R) -> Result<Vec<(u64, u64)>, GraphError> {
    let mut edges = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('%') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let u = parse_id(fields.next(), i + 1)?;
        let v = parse_id(fields.next(), i + 1)?;
        edges.push((u, v));
    }
    tracing::debug!(edges = edges.len(), "edge list parsed");
    Ok(edges)
}

/// Parses an edge list from a string.
///
/// # Errors
/// See [`read_edge_list`].
pub fn parse_edge_list(text: &str) -> Result<Vec<(u64, u64)>, GraphError> {
    read_edge_list(text.as_bytes())
}

/// Loads an edge list from a file.
///
/// # Errors
/// See [`read_edge_list`].
pub fn load_edge_list(path: impl AsRef<Path>) -> Result<Vec<(u64, u64)>, GraphError> {
    let file = std::fs::File::open(path.as_ref())?;
    read_edge_list(std::io::BufReader::new(file))
}

fn parse_id(field: Option<&str>, line: usize) -> Result<u64, GraphError> {
    let field = field.ok_or_else(|| GraphError::Parse {
        line,
        message: "expected two node ids".to_owned(),
    })?;
    field.parse::<u64>().map_err(|e| GraphError::Parse {
        line,
        message: format!("invalid node id {field:?}: {e}"),
    })
}
