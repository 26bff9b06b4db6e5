//! Front-matter parsing

use indexmap::IndexMap;
use serde_yaml::Value;

use crate::error::{FailureReason, ValidationFailure};

/// Decoded front-matter: every key the author wrote, in source order
pub type Metadata = IndexMap<String, Value>;

const DELIMITER: &str = "---";

/// Split a raw document into its front-matter block and body.
///
/// Returns `(None, text)` when the document has no metadata block, when the
/// block is never closed, or when the delimited region does not look like
/// key/value YAML (a markdown horizontal rule, for instance).
pub fn parse(content: &str) -> (Option<&str>, &str) {
    // Editors on some platforms prepend a byte-order mark
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();

    let Some(rest) = trimmed.strip_prefix(DELIMITER) else {
        return (None, content);
    };

    // The opening delimiter must be alone on its line
    let Some(first_newline) = rest.find('\n') else {
        return (None, content);
    };
    if !rest[..first_newline].trim().is_empty() {
        return (None, content);
    }
    let rest = &rest[first_newline + 1..];

    // Find the closing delimiter line
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let block = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);

            if !block.trim().is_empty() && !has_yaml_structure(block) {
                return (None, content);
            }

            return (Some(block), body);
        }
        offset += line.len();
    }

    // No closing ---, treat as no front-matter
    (None, content)
}

/// Valid front-matter should have at least one line with a `key: value` shape.
/// A bare `- item` line is not enough because that is also markdown list syntax.
fn has_yaml_structure(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }

        let Some(colon_pos) = trimmed.find(':') else {
            return false;
        };
        let key = &trimmed[..colon_pos];

        // Keys are simple identifiers, and a colon inside a URL is not a key separator
        let is_valid_key = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp" | "mailto");

        let after_colon = &trimmed[colon_pos + 1..];
        is_valid_key && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Decode a front-matter block into an open key/value map.
///
/// Values are kept as YAML values so unknown keys pass through untouched.
pub fn decode_metadata(block: &str) -> Result<Metadata, ValidationFailure> {
    if block.trim().is_empty() {
        return Ok(Metadata::new());
    }

    let value: Value = serde_yaml::from_str(block).map_err(|e| {
        ValidationFailure::new("frontmatter", FailureReason::Malformed(e.to_string()))
    })?;

    match value {
        Value::Null => Ok(Metadata::new()),
        Value::Mapping(mapping) => {
            let mut metadata = Metadata::with_capacity(mapping.len());
            for (key, value) in mapping {
                match key_to_string(&key) {
                    Some(key) => {
                        metadata.insert(key, value);
                    }
                    None => tracing::debug!("Ignoring non-scalar front-matter key {:?}", key),
                }
            }
            Ok(metadata)
        }
        _ => Err(ValidationFailure::new(
            "frontmatter",
            FailureReason::Malformed("expected a mapping of keys to values".to_string()),
        )),
    }
}

fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
title: Hello World
date: 2024-01-15
tags:
  - rust
  - web
---

This is the content.
"#;

        let (block, body) = parse(content);
        let metadata = decode_metadata(block.unwrap()).unwrap();
        assert_eq!(metadata["title"], Value::from("Hello World"));
        assert_eq!(metadata["date"], Value::from("2024-01-15"));
        assert_eq!(
            metadata["tags"],
            Value::Sequence(vec![Value::from("rust"), Value::from("web")])
        );
        assert_eq!(body, "This is the content.\n");
    }

    #[test]
    fn test_no_frontmatter() {
        let content = "# Just a heading\n\nSome text.";
        let (block, body) = parse(content);
        assert!(block.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_unclosed_frontmatter_is_body() {
        let content = "---\ntitle: Never closed\n\nBody text";
        let (block, body) = parse(content);
        assert!(block.is_none());
        assert_eq!(body, content);
    }

    #[test]
    fn test_empty_block() {
        let (block, body) = parse("---\n---\nBody");
        assert_eq!(block, Some(""));
        assert_eq!(body, "Body");
        assert!(decode_metadata("").unwrap().is_empty());
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"
---

Some random text with markdown lists:
- Item 1
- Item 2

---
More content here.
"#;

        let (block, body) = parse(content);
        assert!(block.is_none());
        assert!(body.contains("Some random text"));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = r#"---
Check out https://example.com/path and http://test.com
---
More content.
"#;

        let (block, body) = parse(content);
        assert!(block.is_none());
        assert!(body.contains("https://example.com"));
    }

    #[test]
    fn test_closing_delimiter_must_be_whole_line() {
        let content = "---\ntitle: A\n----\nstill front-matter?\n---\nBody";
        let (block, body) = parse(content);
        assert_eq!(block, Some("title: A\n----\nstill front-matter?\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_byte_order_mark_is_skipped() {
        let (block, body) = parse("\u{feff}---\ntitle: A\n---\nBody");
        let metadata = decode_metadata(block.unwrap()).unwrap();
        assert_eq!(metadata["title"], Value::from("A"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (block, body) = parse(content);
        let metadata = decode_metadata(block.unwrap()).unwrap();
        assert_eq!(metadata["title"], Value::from("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_unknown_keys_preserved_in_order() {
        let metadata = decode_metadata("title: A\ncover: /img/a.png\ndraft: true\n").unwrap();
        let keys: Vec<_> = metadata.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "cover", "draft"]);
        assert_eq!(metadata["draft"], Value::Bool(true));
    }

    #[test]
    fn test_malformed_yaml_is_validation_failure() {
        let err = decode_metadata("title: [unclosed\n").unwrap_err();
        assert_eq!(err.field, "frontmatter");
        assert!(matches!(err.reason, FailureReason::Malformed(_)));
    }

    #[test]
    fn test_non_mapping_is_validation_failure() {
        let err = decode_metadata("- just\n- a list\n").unwrap_err();
        assert!(matches!(err.reason, FailureReason::Malformed(_)));
    }
}
