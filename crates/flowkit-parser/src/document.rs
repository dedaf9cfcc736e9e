//! Structured-document parsing to a generic tree.
//!
//! The structured format is an indentation-based subset: block mappings,
//! block sequences, `#` comments, and the scalar/flow syntax handled by
//! [`scalar`](crate::scalar). JSON documents are detected up front and
//! handed to [`serde_json`]. The output of both paths is a
//! [`serde_json::Value`] tree with no semantic checks applied yet.

use serde_json::Value as JsonValue;

use crate::{DocumentFormat, error::ParseError, scalar};

/// Picks the document format: an explicit hint wins, otherwise JSON is
/// assumed when the trimmed text starts with `{` or `[`.
pub(crate) fn detect_format(source: &str, hint: Option<DocumentFormat>) -> DocumentFormat {
    if let Some(format) = hint {
        return format;
    }
    match source.trim_start().as_bytes().first() {
        Some(b'{') | Some(b'[') => DocumentFormat::Json,
        _ => DocumentFormat::Structured,
    }
}

pub(crate) fn parse_document(source: &str, format: DocumentFormat) -> Result<JsonValue, ParseError> {
    match format {
        DocumentFormat::Json => parse_json(source),
        DocumentFormat::Structured => parse_structured(source),
    }
}

fn parse_json(source: &str) -> Result<JsonValue, ParseError> {
    serde_json::from_str(source).map_err(|err| {
        let line = err.line().max(1);
        let column = err.column().max(1);
        let full = err.to_string();
        // serde_json appends its own position; we carry it structurally.
        let message = full.split(" at line").next().unwrap_or("invalid JSON").to_owned();
        let snippet = source.lines().nth(line - 1).unwrap_or("").to_owned();
        ParseError::new(line, column, message).with_snippet(snippet)
    })
}

fn parse_structured(source: &str) -> Result<JsonValue, ParseError> {
    let lines = scan_lines(source)?;
    BlockParser { lines, pos: 0 }.parse()
}

/// One significant line: blank and comment-only lines are dropped during
/// scanning.
#[derive(Debug, Clone, Copy)]
struct Line<'s> {
    indent: usize,
    content: &'s str,
    number: usize,
}

fn scan_lines(source: &str) -> Result<Vec<Line<'_>>, ParseError> {
    let mut lines = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        let mut indent = 0;
        for (offset, ch) in raw.char_indices() {
            match ch {
                ' ' => indent += 1,
                '\t' => {
                    return Err(ParseError::new(
                        number,
                        offset + 1,
                        "tab character in indentation; use spaces",
                    )
                    .with_snippet(raw));
                }
                _ => break,
            }
        }
        let content = strip_comment(&raw[indent..]).trim_end();
        if content.is_empty() {
            continue;
        }
        lines.push(Line {
            indent,
            content,
            number,
        });
    }
    Ok(lines)
}

/// Cuts off a trailing `#` comment. The `#` must be at the start of the
/// line or preceded by whitespace, and outside any quoted string.
fn strip_comment(text: &str) -> &str {
    let mut in_single = false;
    let mut in_double = false;
    let mut escaped = false;
    let mut at_boundary = true;
    for (offset, ch) in text.char_indices() {
        if escaped {
            escaped = false;
            at_boundary = false;
            continue;
        }
        match ch {
            '\\' if in_double => escaped = true,
            '"' if !in_single => in_double = !in_double,
            '\'' if !in_double => in_single = !in_single,
            '#' if !in_single && !in_double && at_boundary => return &text[..offset],
            _ => {}
        }
        at_boundary = ch.is_whitespace();
    }
    text
}

fn is_sequence_item(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Splits `key: value` at the first `:` followed by whitespace or end of
/// line, so URLs and clock times in values survive. Quoted keys are
/// unwrapped.
fn split_key_value(text: &str) -> Option<(String, &str)> {
    let bytes = text.as_bytes();
    if bytes[0] == b'"' || bytes[0] == b'\'' {
        let quote = bytes[0] as char;
        let close = text[1..].find(quote)? + 1;
        let rest = text[close + 1..].trim_start();
        let rest = rest.strip_prefix(':')?;
        return Some((text[1..close].to_owned(), rest.trim()));
    }
    for (offset, ch) in text.char_indices() {
        if ch == ':' {
            let after = &text[offset + 1..];
            if after.is_empty() || after.starts_with(char::is_whitespace) {
                return Some((text[..offset].trim().to_owned(), after.trim()));
            }
        }
    }
    None
}

struct BlockParser<'s> {
    lines: Vec<Line<'s>>,
    pos: usize,
}

impl<'s> BlockParser<'s> {
    fn parse(mut self) -> Result<JsonValue, ParseError> {
        let Some(first) = self.lines.first() else {
            return Ok(JsonValue::Object(serde_json::Map::new()));
        };
        let indent = first.indent;
        let value = self.parse_value(indent)?;
        if let Some(line) = self.lines.get(self.pos) {
            return Err(ParseError::new(
                line.number,
                line.indent + 1,
                "unexpected content after end of block",
            )
            .with_snippet(line.content));
        }
        Ok(value)
    }

    fn current(&self) -> Option<Line<'s>> {
        self.lines.get(self.pos).copied()
    }

    fn parse_value(&mut self, indent: usize) -> Result<JsonValue, ParseError> {
        match self.current() {
            None => Ok(JsonValue::Null),
            Some(line) if line.indent < indent => Ok(JsonValue::Null),
            Some(line) if is_sequence_item(line.content) => self.parse_sequence(line.indent),
            _ => self.parse_mapping(indent),
        }
    }

    fn parse_mapping(&mut self, indent: usize) -> Result<JsonValue, ParseError> {
        let mut map = serde_json::Map::new();
        while let Some(line) = self.current() {
            if line.indent < indent || is_sequence_item(line.content) {
                break;
            }
            if line.indent > indent {
                return Err(ParseError::new(
                    line.number,
                    line.indent + 1,
                    "unexpected indentation",
                )
                .with_snippet(line.content));
            }
            self.pos += 1;
            let Some((key, rest)) = split_key_value(line.content) else {
                return Err(ParseError::new(
                    line.number,
                    line.indent + 1,
                    "expected 'key: value'",
                )
                .with_snippet(line.content));
            };
            let value = if rest.is_empty() {
                match self.current() {
                    Some(next) if next.indent > indent => {
                        let nested = next.indent;
                        self.parse_value(nested)?
                    }
                    // A sequence may start at the same indent as its key.
                    Some(next) if next.indent == indent && is_sequence_item(next.content) => {
                        self.parse_sequence(indent)?
                    }
                    _ => JsonValue::Null,
                }
            } else {
                scalar::parse_scalar(rest).map_err(|message| {
                    ParseError::new(line.number, line.indent + 1, message)
                        .with_snippet(line.content)
                })?
            };
            map.insert(key, value);
        }
        Ok(JsonValue::Object(map))
    }

    fn parse_sequence(&mut self, indent: usize) -> Result<JsonValue, ParseError> {
        let mut items = Vec::new();
        while let Some(line) = self.current() {
            if line.indent != indent || !is_sequence_item(line.content) {
                if line.indent > indent {
                    return Err(ParseError::new(
                        line.number,
                        line.indent + 1,
                        "unexpected indentation",
                    )
                    .with_snippet(line.content));
                }
                break;
            }
            self.pos += 1;
            let item_text = line.content[1..].trim_start();
            if item_text.is_empty() {
                let value = match self.current() {
                    Some(next) if next.indent > indent => {
                        let nested = next.indent;
                        self.parse_value(nested)?
                    }
                    _ => JsonValue::Null,
                };
                items.push(value);
            } else if split_key_value(item_text).is_some() {
                // `- key: value` opens a nested mapping; rewrite the line
                // as its first entry at the item's content offset and let
                // the mapping parser pick up the continuation lines.
                let offset = line.indent + (line.content.len() - item_text.len());
                self.lines[self.pos - 1] = Line {
                    indent: offset,
                    content: item_text,
                    number: line.number,
                };
                self.pos -= 1;
                items.push(self.parse_mapping(offset)?);
            } else {
                let value = scalar::parse_scalar(item_text).map_err(|message| {
                    ParseError::new(line.number, line.indent + 1, message)
                        .with_snippet(line.content)
                })?;
                items.push(value);
            }
        }
        Ok(JsonValue::Array(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(source: &str) -> JsonValue {
        parse_structured(source).expect("document should parse")
    }

    #[test]
    fn mapping_with_nested_block() {
        let doc = parse(
            "version: \"1.0\"\n\
             metadata:\n\
             \x20\x20title: Demo\n\
             \x20\x20tags: [a, b]\n",
        );
        assert_eq!(
            doc,
            json!({
                "version": "1.0",
                "metadata": {"title": "Demo", "tags": ["a", "b"]}
            })
        );
    }

    #[test]
    fn sequence_at_key_indent() {
        let doc = parse(
            "nodes:\n\
             - id: a\n\
             \x20\x20label: A\n\
             - id: b\n\
             version: 2\n",
        );
        assert_eq!(
            doc,
            json!({
                "nodes": [{"id": "a", "label": "A"}, {"id": "b"}],
                "version": 2.0
            })
        );
    }

    #[test]
    fn indented_sequence_with_nested_mapping_item() {
        let doc = parse(
            "steps:\n\
             \x20\x20- action: highlight\n\
             \x20\x20\x20\x20nodes: [a]\n\
             \x20\x20\x20\x20style:\n\
             \x20\x20\x20\x20\x20\x20color: \"#fff\"\n\
             \x20\x20- action: reset\n",
        );
        assert_eq!(
            doc,
            json!({
                "steps": [
                    {"action": "highlight", "nodes": ["a"], "style": {"color": "#fff"}},
                    {"action": "reset"}
                ]
            })
        );
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let doc = parse(
            "# header\n\
             version: 1   # trailing\n\
             \n\
             color: \"#3b82f6\"\n",
        );
        assert_eq!(doc, json!({"version": 1.0, "color": "#3b82f6"}));
    }

    #[test]
    fn tab_indentation_is_rejected_with_position() {
        let err = parse_structured("version: 1\n\tnodes:\n").unwrap_err();
        assert_eq!(err.line(), 2);
        assert_eq!(err.column(), 1);
        assert!(err.message().contains("tab"));
    }

    #[test]
    fn stray_deep_line_is_an_error() {
        let err = parse_structured("version: 1\n      stray: 2\n").unwrap_err();
        assert_eq!(err.line(), 2);
    }

    #[test]
    fn json_detection() {
        assert_eq!(detect_format("  {\"a\": 1}", None), DocumentFormat::Json);
        assert_eq!(detect_format("version: 1", None), DocumentFormat::Structured);
        assert_eq!(
            detect_format("{}", Some(DocumentFormat::Structured)),
            DocumentFormat::Structured
        );
    }

    #[test]
    fn json_errors_carry_position() {
        let err = parse_document("{\"a\": }", DocumentFormat::Json).unwrap_err();
        assert_eq!(err.line(), 1);
        assert!(err.column() > 1);
    }

    #[test]
    fn bare_dash_opens_nested_block() {
        let doc = parse(
            "items:\n\
             \x20\x20-\n\
             \x20\x20\x20\x20id: a\n",
        );
        assert_eq!(doc, json!({"items": [{"id": "a"}]}));
    }
}
