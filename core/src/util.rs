//! Shared utility functions for the application

use anyhow::{bail, Result};

/// Sanitize a string value for safe use in HTTP headers
///
/// Header values cannot contain ASCII control characters (including CR, LF
/// and NUL) or DEL. The session cookie is forwarded verbatim into a header,
/// so it has to pass this check before a client is built around it.
pub fn sanitize_for_header(value: &str, field_name: &str) -> Result<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        bail!("{} cannot be empty", field_name);
    }

    for (index, ch) in trimmed.char_indices() {
        if ch.is_ascii_control() || ch == '\u{007f}' {
            bail!(
                "{} contains an invalid character at position {}. \
                Control characters, newlines and carriage returns are not allowed in headers.",
                field_name,
                index
            );
        }
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_for_header_valid() {
        assert!(sanitize_for_header("PHPSESSID=abc123", "cookie").is_ok());
        assert!(sanitize_for_header("a=1; b=2", "cookie").is_ok());
    }

    #[test]
    fn test_sanitize_for_header_trims() {
        assert_eq!(
            sanitize_for_header(" sess=1 \n", "cookie").unwrap(),
            "sess=1"
        );
    }

    #[test]
    fn test_sanitize_for_header_invalid() {
        assert!(sanitize_for_header("abc\ndef", "cookie").is_err());
        assert!(sanitize_for_header("abc\rdef", "cookie").is_err());
        assert!(sanitize_for_header("abc\x00def", "cookie").is_err());
        assert!(sanitize_for_header("", "cookie").is_err());
        assert!(sanitize_for_header("  ", "cookie").is_err());
    }
}
