//! Splits an access-log line into fields.
//!
//! Fields are separated by whitespace, except inside `"..."` or `[...]`,
//! which is how combined/common log format wraps the request, referer,
//! user agent and timestamp. Delimiters stay on the token; the record
//! parser strips them.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("unterminated quoted field")]
    UnterminatedQuote,

    #[error("unterminated bracketed field")]
    UnterminatedBracket,
}

/// Tokenize one line. Backslash escapes the next character inside quotes.
pub fn tokenize(line: &str) -> Result<Vec<&str>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_quote = false;
    let mut in_bracket = false;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        if in_quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_quote = false;
            }
            continue;
        }
        if in_bracket {
            if c == ']' {
                in_bracket = false;
            }
            continue;
        }

        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(&line[s..i]);
            }
            continue;
        }

        if start.is_none() {
            start = Some(i);
        }
        match c {
            '"' => in_quote = true,
            '[' => in_bracket = true,
            _ => {}
        }
    }

    if in_quote {
        return Err(TokenizeError::UnterminatedQuote);
    }
    if in_bracket {
        return Err(TokenizeError::UnterminatedBracket);
    }
    if let Some(s) = start {
        tokens.push(&line[s..]);
    }

    Ok(tokens)
}
