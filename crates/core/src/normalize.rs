//! Block normalization for generated slide content.
//!
//! Coerces loosely-shaped JSON values into one of the six canonical
//! [`ContentBlock`] kinds, mining fallback field names the generator is
//! known to use. This is the only place that decides what counts as a
//! valid block; both decoding modes go through it.

use crate::types::{ContentBlock, Emphasis};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Matches a markdown table separator row such as `|---|:---:|`.
static TABLE_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|?\s*:?-+:?\s*(\|\s*:?-+:?\s*)*\|?$").unwrap());

/// Normalize an untyped value into a canonical block.
///
/// Returns `None` when the `type` tag is missing or unknown, or when the
/// required fields cannot be recovered from any fallback.
pub fn normalize_block(raw: &Value) -> Option<ContentBlock> {
    let obj = raw.as_object()?;
    let kind = obj.get("type")?.as_str()?;

    match kind {
        "paragraph" => normalize_paragraph(obj),
        "bullets" => string_items(obj).map(|items| ContentBlock::Bullets { items }),
        "numbered" => string_items(obj).map(|items| ContentBlock::Numbered { items }),
        "code" => normalize_code(obj),
        "table" => normalize_table(obj),
        "quote" => normalize_quote(obj),
        _ => None,
    }
}

fn normalize_paragraph(obj: &Map<String, Value>) -> Option<ContentBlock> {
    let text = str_field(obj, "text")?;
    let emphasis = str_field(obj, "emphasis").and_then(|e| Emphasis::from_token(&e));
    Some(ContentBlock::Paragraph { text, emphasis })
}

/// `items` as strings, with non-string elements dropped. Needs at least one.
fn string_items(obj: &Map<String, Value>) -> Option<Vec<String>> {
    let items: Vec<String> = obj
        .get("items")?
        .as_array()?
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect();
    (!items.is_empty()).then_some(items)
}

fn normalize_code(obj: &Map<String, Value>) -> Option<ContentBlock> {
    let from_array = obj.get("lines").and_then(Value::as_array).map(|arr| {
        arr.iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect::<Vec<_>>()
    });

    let lines = from_array
        .filter(|lines| !lines.is_empty())
        .or_else(|| {
            ["code", "content", "text"].iter().find_map(|key| {
                let lines: Vec<String> = obj
                    .get(*key)?
                    .as_str()?
                    .lines()
                    .map(str::to_string)
                    .collect();
                (!lines.is_empty()).then_some(lines)
            })
        })?;

    let language = str_field(obj, "language")
        .or_else(|| str_field(obj, "lang"))
        .unwrap_or_else(|| "text".to_string());

    Some(ContentBlock::Code {
        language,
        lines,
        caption: str_field(obj, "caption"),
    })
}

fn normalize_table(obj: &Map<String, Value>) -> Option<ContentBlock> {
    let mut headers: Vec<String> = obj
        .get("headers")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(cell_text).collect())
        .unwrap_or_default();

    let mut rows = ["rows", "data"]
        .iter()
        .map(|key| table_rows(obj.get(*key)))
        .find(|rows| !rows.is_empty())
        .unwrap_or_default();

    if rows.is_empty() {
        if let Some(text) = obj.get("text").and_then(Value::as_str) {
            let (md_headers, md_rows) = parse_markdown_table(text);
            if headers.is_empty() {
                headers = md_headers;
            }
            rows = md_rows;
        }
    }

    if headers.is_empty() {
        if let Some(first) = rows.first() {
            headers = (1..=first.len()).map(|i| format!("Column{i}")).collect();
        }
    }

    if headers.is_empty() || rows.is_empty() {
        return None;
    }

    Some(ContentBlock::Table {
        headers,
        rows,
        caption: str_field(obj, "caption"),
    })
}

fn normalize_quote(obj: &Map<String, Value>) -> Option<ContentBlock> {
    let text = str_field(obj, "text").or_else(|| str_field(obj, "content"))?;
    Some(ContentBlock::Quote {
        text,
        author: str_field(obj, "author"),
    })
}

/// Rows from an array of arrays; non-array rows are skipped.
fn table_rows(value: Option<&Value>) -> Vec<Vec<String>> {
    value
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(Value::as_array)
                .map(|row| row.iter().filter_map(cell_text).collect::<Vec<_>>())
                .filter(|row| !row.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

/// Table cells accept any scalar, rendered as text.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Parse a markdown pipe table into headers and rows.
///
/// The first non-blank line holds the headers, an optional separator line
/// follows, and every remaining line is a data row. Cells are split on `|`
/// and empty cells are dropped.
pub fn parse_markdown_table(text: &str) -> (Vec<String>, Vec<Vec<String>>) {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let headers = match lines.next() {
        Some(line) => split_pipe_row(line),
        None => return (Vec::new(), Vec::new()),
    };

    let rows = lines
        .enumerate()
        .filter(|(idx, line)| !(*idx == 0 && TABLE_SEPARATOR_REGEX.is_match(line)))
        .map(|(_, line)| split_pipe_row(line))
        .filter(|row| !row.is_empty())
        .collect();

    (headers, rows)
}

fn split_pipe_row(line: &str) -> Vec<String> {
    line.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_string)
        .collect()
}
