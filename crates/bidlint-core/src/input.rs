//! Multi-document input splitting.
//!
//! Raw captures arrive as a single request, a JSON array of requests, bare
//! concatenated objects, or one-request-per-line log dumps. The splitter
//! walks brace depth (respecting strings and escapes) and hands back each
//! top-level object as its own document, ready for one `analyze` call each.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("unterminated JSON object ({depth} unclosed brace(s) at end of input)")]
    UnterminatedObject { depth: usize },
    #[error("unterminated string literal at end of input")]
    UnterminatedString,
}

/// Split `text` into top-level JSON object documents.
///
/// Text with no braces at all comes back as a single document so downstream
/// parsing reports the real error; blank input yields no documents.
pub fn split_documents(text: &str) -> Result<Vec<String>, SplitError> {
    let mut docs = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    docs.push(text[start..=i].to_string());
                }
            }
            _ => {}
        }
    }

    if in_string {
        return Err(SplitError::UnterminatedString);
    }
    if depth > 0 {
        return Err(SplitError::UnterminatedObject { depth });
    }

    if docs.is_empty() && !text.trim().is_empty() {
        return Ok(vec![text.to_string()]);
    }
    Ok(docs)
}
