//! Tolerant decoding of generated slide JSON.
//!
//! Model output arrives wrapped in markdown fences, with trailing commas,
//! raw control characters inside strings, or cut off mid-structure. The
//! decoder runs a fixed chain of repairs, stopping at the first one that
//! yields valid JSON, then coerces the tree into a [`Presentation`].

use crate::error::{DecodeError, Result};
use crate::normalize::normalize_block;
use crate::types::{ContentBlock, Presentation, Slide, SlideLayout};
use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

/// Opening markdown fence, with or without a `json` language tag.
static FENCE_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```(?:json)?").unwrap());

/// Start of the slides array inside the outer object.
static SLIDES_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""slides"\s*:\s*\["#).unwrap());

/// Widest object- or array-looking span in the text.
static OUTER_SPAN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(\{.*\}|\[.*\])").unwrap());

/// How strictly slide elements are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Best-effort coercion: bad layouts default, bad blocks are dropped.
    #[default]
    Lenient,
    /// Any schema violation rejects the whole payload.
    Strict,
}

/// Turns raw model output into a [`Presentation`].
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    mode: DecodeMode,
}

impl Decoder {
    /// Create a lenient decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strict decoder.
    pub fn strict() -> Self {
        Self {
            mode: DecodeMode::Strict,
        }
    }

    /// Set the decoding mode.
    pub fn with_mode(mut self, mode: DecodeMode) -> Self {
        self.mode = mode;
        self
    }

    /// The decoding mode in use.
    pub fn mode(&self) -> DecodeMode {
        self.mode
    }

    /// Decode raw text into a presentation.
    pub fn decode(&self, raw: &str) -> Result<Presentation> {
        let tree = parse_tolerant(raw)?;
        let elements = slide_elements(tree)?;

        let slides = match self.mode {
            DecodeMode::Lenient => elements
                .iter()
                .enumerate()
                .filter_map(|(idx, element)| lenient_slide(idx, element))
                .collect::<Vec<_>>(),
            DecodeMode::Strict => elements
                .iter()
                .enumerate()
                .map(|(idx, element)| strict_slide(idx, element))
                .collect::<Result<Vec<_>>>()?,
        };

        if slides.is_empty() {
            return Err(DecodeError::NoValidSlides);
        }

        debug!(
            "Decoded {} slides from {} elements ({:?})",
            slides.len(),
            elements.len(),
            self.mode
        );
        Ok(Presentation::new(slides))
    }
}

/// Decode raw text leniently.
pub fn decode(raw: &str) -> Result<Presentation> {
    Decoder::new().decode(raw)
}

/// Run the repair chain until something parses as JSON.
///
/// On total failure the error carries the message from the first, unrepaired
/// parse attempt.
pub fn parse_tolerant(raw: &str) -> Result<Value> {
    let text = strip_fences(raw);

    let first_error = match serde_json::from_str::<Value>(text) {
        Ok(value) => return Ok(value),
        Err(e) => e.to_string(),
    };
    debug!("Direct parse failed: {first_error}");

    let repaired = repair_text(text);
    if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
        debug!("Parsed after comma/escape repair");
        return Ok(value);
    }

    if let Some(value) = repair_truncation(&repaired).and_then(|t| serde_json::from_str(&t).ok()) {
        debug!("Parsed after truncation repair");
        return Ok(value);
    }

    if let Some(span) = OUTER_SPAN_REGEX.find(text) {
        let candidate = span.as_str();
        let repaired_candidate = repair_text(candidate);
        let attempts = [
            Some(candidate.to_string()),
            Some(repaired_candidate.clone()),
            repair_truncation(&repaired_candidate),
        ];
        for attempt in attempts.into_iter().flatten() {
            if let Ok(value) = serde_json::from_str::<Value>(&attempt) {
                debug!("Parsed from embedded span at offset {}", span.start());
                return Ok(value);
            }
        }
    }

    Err(DecodeError::Unparseable(first_error))
}

/// Remove a surrounding markdown code fence.
pub fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(m) = FENCE_OPEN_REGEX.find(text) {
        text = &text[m.end()..];
    }
    if let Some(rest) = text.trim_end().strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Drop trailing commas before `}`/`]` and escape raw newlines, carriage
/// returns and tabs inside string literals.
pub fn repair_text(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
                out.push(c);
                continue;
            }
            match c {
                '\\' => {
                    escaped = true;
                    out.push(c);
                }
                '"' => {
                    in_string = false;
                    out.push(c);
                }
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                _ => out.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' if matches!(
                chars[i + 1..].iter().copied().find(|n| !n.is_whitespace()),
                Some('}') | Some(']')
            ) => {}
            _ => out.push(c),
        }
    }

    out
}

/// Cut a truncated payload back to its last complete slide and close it.
///
/// Looks for the `"slides": [` marker, or a bare top-level array. Returns
/// `None` when neither is present.
pub fn repair_truncation(text: &str) -> Option<String> {
    let (body_start, closing) = match SLIDES_MARKER_REGEX.find(text) {
        Some(m) => (m.end(), "]}"),
        None => {
            let trimmed = text.trim_start();
            if !trimmed.starts_with('[') {
                return None;
            }
            (text.len() - trimmed.len() + 1, "]")
        }
    };

    let cut = body_start + last_complete_element(&text[body_start..]);
    Some(format!("{}{}", &text[..cut], closing))
}

/// Byte offset just past the last object that closed at array depth zero.
///
/// If the array itself closes, the offset of its closing bracket is
/// returned so the caller re-closes it cleanly.
fn last_complete_element(body: &str) -> usize {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut last = 0;

    for (i, c) in body.char_indices() {
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
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth -= 1;
                if depth < 0 {
                    return i;
                }
                if depth == 0 && c == '}' {
                    last = i + 1;
                }
            }
            _ => {}
        }
    }

    last
}

/// Accept a bare array or an object with a `slides` array.
fn slide_elements(tree: Value) -> Result<Vec<Value>> {
    let elements = match tree {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("slides") {
            Some(Value::Array(items)) => items,
            _ => return Err(DecodeError::UnrecognizedShape),
        },
        _ => return Err(DecodeError::UnrecognizedShape),
    };

    if elements.is_empty() {
        return Err(DecodeError::EmptyPresentation);
    }
    Ok(elements)
}

fn lenient_slide(idx: usize, element: &Value) -> Option<Slide> {
    let Some(obj) = element.as_object() else {
        warn!("Skipping slide {idx}: not an object");
        return None;
    };

    let layout = match obj.get("layout").and_then(Value::as_str) {
        Some(tag) => SlideLayout::from_tag(tag).unwrap_or_else(|| {
            debug!("Slide {idx}: unknown layout {tag:?}, using title-content");
            SlideLayout::default()
        }),
        None => SlideLayout::default(),
    };

    Some(Slide {
        layout,
        title: text_field(obj, "title"),
        subtitle: text_field(obj, "subtitle"),
        content: lenient_blocks(idx, obj, "content"),
        left_content: lenient_blocks(idx, obj, "leftContent"),
        right_content: lenient_blocks(idx, obj, "rightContent"),
        notes: text_field(obj, "notes"),
    })
}

fn lenient_blocks(idx: usize, obj: &Map<String, Value>, key: &str) -> Option<Vec<ContentBlock>> {
    let raw = obj.get(key)?.as_array()?;
    let blocks: Vec<ContentBlock> = raw.iter().filter_map(normalize_block).collect();
    if blocks.len() < raw.len() {
        warn!(
            "Slide {idx}: dropped {} of {} blocks in {key}",
            raw.len() - blocks.len(),
            raw.len()
        );
    }
    Some(blocks)
}

fn strict_slide(idx: usize, element: &Value) -> Result<Slide> {
    let obj = element
        .as_object()
        .ok_or_else(|| DecodeError::schema(idx, "slide is not an object"))?;

    let layout = match obj.get("layout") {
        Some(Value::String(tag)) => SlideLayout::from_tag(tag)
            .ok_or_else(|| DecodeError::schema(idx, format!("unknown layout {tag:?}")))?,
        Some(_) => return Err(DecodeError::schema(idx, "layout is not a string")),
        None => return Err(DecodeError::schema(idx, "missing layout")),
    };

    Ok(Slide {
        layout,
        title: strict_text(idx, obj, "title")?,
        subtitle: strict_text(idx, obj, "subtitle")?,
        content: strict_blocks(idx, obj, "content")?,
        left_content: strict_blocks(idx, obj, "leftContent")?,
        right_content: strict_blocks(idx, obj, "rightContent")?,
        notes: strict_text(idx, obj, "notes")?,
    })
}

fn strict_text(idx: usize, obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeError::schema(idx, format!("{key} is not a string"))),
    }
}

fn strict_blocks(
    idx: usize,
    obj: &Map<String, Value>,
    key: &str,
) -> Result<Option<Vec<ContentBlock>>> {
    let raw = match obj.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(raw)) => raw,
        Some(_) => return Err(DecodeError::schema(idx, format!("{key} is not an array"))),
    };

    raw.iter()
        .enumerate()
        .map(|(pos, block)| {
            normalize_block(block)
                .ok_or_else(|| DecodeError::schema(idx, format!("{key}[{pos}] is not a valid block")))
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}
