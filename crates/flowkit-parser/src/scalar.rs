//! Scalar and flow-collection parsing for the structured format.
//!
//! A scalar is the text to the right of `key:` or `- `. It is interpreted
//! as a quoted string, number, boolean, null, flow sequence (`[a, b]`),
//! flow mapping (`{k: v}`), or — when nothing else matches — a plain
//! string. Parsing is built on [`winnow`] combinators; errors are plain
//! messages to which the document parser attaches line and column.

use serde_json::Value as JsonValue;
use winnow::{
    Parser as _,
    ascii::{float, space0},
    combinator::{alt, delimited, opt, preceded, repeat, separated},
    error::{ContextError, ErrMode},
    token::{none_of, take_till},
};

type Input<'s> = &'s str;
type IResult<O> = Result<O, ErrMode<ContextError>>;

/// Interprets one scalar cell.
///
/// Never fails on plain text (everything is at worst a string); fails on
/// malformed quoted strings and flow collections.
pub(crate) fn parse_scalar(text: &str) -> Result<JsonValue, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(JsonValue::Null);
    }

    match trimmed.as_bytes()[0] {
        b'"' => double_quoted
            .map(JsonValue::String)
            .parse(trimmed)
            .map_err(|_| "unterminated or malformed double-quoted string".to_owned()),
        b'\'' => single_quoted
            .map(JsonValue::String)
            .parse(trimmed)
            .map_err(|_| "unterminated or malformed single-quoted string".to_owned()),
        b'[' => flow_sequence
            .parse(trimmed)
            .map_err(|_| "malformed flow sequence".to_owned()),
        b'{' => flow_mapping
            .parse(trimmed)
            .map_err(|_| "malformed flow mapping".to_owned()),
        _ => Ok(plain_scalar(trimmed)),
    }
}

/// Interprets an unquoted scalar: boolean, null, number, or string.
fn plain_scalar(text: &str) -> JsonValue {
    match text {
        "true" => return JsonValue::Bool(true),
        "false" => return JsonValue::Bool(false),
        "null" | "~" => return JsonValue::Null,
        _ => {}
    }

    if let Ok(n) = float::<Input<'_>, f64, ContextError>.parse(text) {
        // "inf"/"nan" parse as floats but are not representable in the
        // tree; keep them as strings.
        if let Some(number) = serde_json::Number::from_f64(n) {
            return JsonValue::Number(number);
        }
    }

    JsonValue::String(text.to_owned())
}

fn double_quoted(input: &mut Input<'_>) -> IResult<String> {
    delimited(
        '"',
        repeat(0.., dq_char).fold(String::new, |mut s, c| {
            s.push(c);
            s
        }),
        '"',
    )
    .parse_next(input)
}

fn dq_char(input: &mut Input<'_>) -> IResult<char> {
    alt((
        preceded(
            '\\',
            alt((
                '"'.value('"'),
                '\\'.value('\\'),
                '/'.value('/'),
                'n'.value('\n'),
                't'.value('\t'),
                'r'.value('\r'),
            )),
        ),
        none_of(['"', '\\']),
    ))
    .parse_next(input)
}

fn single_quoted(input: &mut Input<'_>) -> IResult<String> {
    delimited('\'', take_till(0.., '\''), '\'')
        .map(str::to_owned)
        .parse_next(input)
}

fn flow_sequence(input: &mut Input<'_>) -> IResult<JsonValue> {
    delimited(
        ('[', space0),
        separated(0.., flow_value, (space0, ',', space0)),
        (space0, opt(','), space0, ']'),
    )
    .map(JsonValue::Array)
    .parse_next(input)
}

fn flow_mapping(input: &mut Input<'_>) -> IResult<JsonValue> {
    delimited(
        ('{', space0),
        separated(0.., flow_entry, (space0, ',', space0)),
        (space0, opt(','), space0, '}'),
    )
    .map(|entries: Vec<(String, JsonValue)>| {
        JsonValue::Object(entries.into_iter().collect())
    })
    .parse_next(input)
}

fn flow_entry(input: &mut Input<'_>) -> IResult<(String, JsonValue)> {
    (
        flow_key,
        delimited(space0, ':', space0),
        flow_value,
    )
        .map(|(key, _, value)| (key, value))
        .parse_next(input)
}

fn flow_key(input: &mut Input<'_>) -> IResult<String> {
    alt((
        double_quoted,
        single_quoted,
        take_till(1.., [':', ',', '}', '{', '[', ']']).map(|s: &str| s.trim().to_owned()),
    ))
    .parse_next(input)
}

fn flow_value(input: &mut Input<'_>) -> IResult<JsonValue> {
    alt((
        flow_sequence,
        flow_mapping,
        double_quoted.map(JsonValue::String),
        single_quoted.map(JsonValue::String),
        // Plain scalars inside flow collections end at a delimiter.
        take_till(1.., [',', ']', '}']).map(|s: &str| plain_scalar(s.trim())),
    ))
    .parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_scalars() {
        assert_eq!(parse_scalar("true").unwrap(), json!(true));
        assert_eq!(parse_scalar("false").unwrap(), json!(false));
        assert_eq!(parse_scalar("null").unwrap(), json!(null));
        assert_eq!(parse_scalar("~").unwrap(), json!(null));
        assert_eq!(parse_scalar("42").unwrap(), json!(42.0));
        assert_eq!(parse_scalar("-3.5").unwrap(), json!(-3.5));
        assert_eq!(parse_scalar("hello world").unwrap(), json!("hello world"));
        assert_eq!(parse_scalar("").unwrap(), json!(null));
    }

    #[test]
    fn version_like_text_stays_a_string() {
        assert_eq!(parse_scalar("1.0.0").unwrap(), json!("1.0.0"));
        assert_eq!(parse_scalar("0x10").unwrap(), json!("0x10"));
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(parse_scalar(r#""hello: world""#).unwrap(), json!("hello: world"));
        assert_eq!(parse_scalar(r#""a\nb""#).unwrap(), json!("a\nb"));
        assert_eq!(parse_scalar("'plain'").unwrap(), json!("plain"));
        assert!(parse_scalar(r#""unterminated"#).is_err());
        assert!(parse_scalar("'a' trailing").is_err());
    }

    #[test]
    fn flow_sequences() {
        assert_eq!(parse_scalar("[1, 2, 3]").unwrap(), json!([1.0, 2.0, 3.0]));
        assert_eq!(parse_scalar("[a, b]").unwrap(), json!(["a", "b"]));
        assert_eq!(parse_scalar("[]").unwrap(), json!([]));
        assert_eq!(
            parse_scalar(r#"["x", [1, true]]"#).unwrap(),
            json!(["x", [1.0, true]])
        );
        assert!(parse_scalar("[1, 2").is_err());
    }

    #[test]
    fn flow_mappings() {
        assert_eq!(
            parse_scalar("{x: 100, y: 200}").unwrap(),
            json!({"x": 100.0, "y": 200.0})
        );
        assert_eq!(parse_scalar("{}").unwrap(), json!({}));
        assert_eq!(
            parse_scalar(r#"{label: "a b", on: true}"#).unwrap(),
            json!({"label": "a b", "on": true})
        );
        assert!(parse_scalar("{x 100}").is_err());
    }
}
