//! Domain types for the canonical presentation document.
//!
//! These are also the wire format exchanged with the generator and the
//! renderer: `{ "slides": [ { "layout": ..., "content": [...] } ] }`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A full deck of slides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Presentation {
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create a presentation from a list of slides.
    pub fn new(slides: Vec<Slide>) -> Self {
        Self { slides }
    }

    /// Parse the canonical wire form without any repair or coercion.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize to pretty-printed canonical JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Number of slides.
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the deck has no slides.
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

/// The visual arrangement of a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideLayout {
    TitleOnly,
    #[default]
    TitleContent,
    TwoColumn,
    Section,
    Comparison,
}

impl SlideLayout {
    /// Parse a layout tag, returning `None` for anything unrecognized.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "title-only" => Some(Self::TitleOnly),
            "title-content" => Some(Self::TitleContent),
            "two-column" => Some(Self::TwoColumn),
            "section" => Some(Self::Section),
            "comparison" => Some(Self::Comparison),
            _ => None,
        }
    }

    /// The wire tag for this layout.
    pub fn as_tag(self) -> &'static str {
        match self {
            Self::TitleOnly => "title-only",
            Self::TitleContent => "title-content",
            Self::TwoColumn => "two-column",
            Self::Section => "section",
            Self::Comparison => "comparison",
        }
    }

    /// Whether this layout uses `leftContent`/`rightContent` instead of `content`.
    pub fn is_columnar(self) -> bool {
        matches!(self, Self::TwoColumn | Self::Comparison)
    }
}

/// A single slide before or after pagination.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    #[serde(default)]
    pub layout: SlideLayout,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Main content, used by `title-content` and `section`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Vec<ContentBlock>>,

    /// Left column, used by `two-column` and `comparison`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_content: Option<Vec<ContentBlock>>,

    /// Right column, used by `two-column` and `comparison`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_content: Option<Vec<ContentBlock>>,

    /// Speaker notes, opaque to the pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Slide {
    /// Create an empty slide with the given layout.
    pub fn new(layout: SlideLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the main content blocks.
    pub fn with_content(mut self, content: Vec<ContentBlock>) -> Self {
        self.content = Some(content);
        self
    }

    /// Blocks in the field that is active for this slide's layout.
    pub fn active_blocks(&self) -> impl Iterator<Item = &ContentBlock> {
        let (a, b) = if self.layout.is_columnar() {
            (self.left_content.as_deref(), self.right_content.as_deref())
        } else {
            (self.content.as_deref(), None)
        };
        a.unwrap_or_default()
            .iter()
            .chain(b.unwrap_or_default().iter())
    }
}

/// Tone applied to a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Normal,
    Highlight,
    Muted,
}

impl Emphasis {
    /// Parse an emphasis token; anything else is `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "normal" => Some(Self::Normal),
            "highlight" => Some(Self::Highlight),
            "muted" => Some(Self::Muted),
            _ => None,
        }
    }
}

/// One unit of slide content. The set of kinds is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Paragraph {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emphasis: Option<Emphasis>,
    },
    Bullets {
        items: Vec<String>,
    },
    Numbered {
        items: Vec<String>,
    },
    Code {
        language: String,
        lines: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Quote {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        author: Option<String>,
    },
}

impl ContentBlock {
    /// The wire `type` tag of this block.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Paragraph { .. } => "paragraph",
            Self::Bullets { .. } => "bullets",
            Self::Numbered { .. } => "numbered",
            Self::Code { .. } => "code",
            Self::Table { .. } => "table",
            Self::Quote { .. } => "quote",
        }
    }

    /// Convert back to the untyped wire value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The leaf strings this block carries, in order.
    ///
    /// Table rows are flattened to their cells joined by `|`.
    pub fn leaves(&self) -> Vec<String> {
        match self {
            Self::Paragraph { text, .. } | Self::Quote { text, .. } => vec![text.clone()],
            Self::Bullets { items } | Self::Numbered { items } => items.clone(),
            Self::Code { lines, .. } => lines.clone(),
            Self::Table { rows, .. } => rows.iter().map(|r| r.join("|")).collect(),
        }
    }

    /// Table rows padded or truncated to the header width.
    ///
    /// Returns `None` for non-table blocks.
    pub fn reconciled_rows(&self) -> Option<Vec<Vec<String>>> {
        match self {
            Self::Table { headers, rows, .. } => Some(
                rows.iter()
                    .map(|row| reconcile_row(headers.len(), row))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Pad with empty cells or truncate a row to `width` cells.
pub fn reconcile_row(width: usize, row: &[String]) -> Vec<String> {
    let mut out: Vec<String> = row.iter().take(width).cloned().collect();
    out.resize(width, String::new());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layout_tags_round_trip() {
        for tag in ["title-only", "title-content", "two-column", "section", "comparison"] {
            let layout = SlideLayout::from_tag(tag).unwrap();
            assert_eq!(layout.as_tag(), tag);
        }
        assert_eq!(SlideLayout::from_tag("Title-Content"), None);
    }

    #[test]
    fn test_block_serializes_with_type_tag() {
        let block = ContentBlock::Bullets {
            items: vec!["a".to_string()],
        };
        assert_eq!(block.to_value(), json!({"type": "bullets", "items": ["a"]}));
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let block = ContentBlock::Paragraph {
            text: "hi".to_string(),
            emphasis: None,
        };
        assert_eq!(block.to_value(), json!({"type": "paragraph", "text": "hi"}));
    }

    #[test]
    fn test_slide_uses_camel_case_columns() {
        let slide = Slide {
            layout: SlideLayout::TwoColumn,
            left_content: Some(vec![]),
            ..Slide::default()
        };
        let value = serde_json::to_value(&slide).unwrap();
        assert_eq!(value, json!({"layout": "two-column", "leftContent": []}));
    }

    #[test]
    fn test_presentation_from_json() {
        let deck = Presentation::from_json(
            r#"{"slides":[{"layout":"section","title":"Intro"}]}"#,
        )
        .unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.slides[0].layout, SlideLayout::Section);
        assert_eq!(deck.slides[0].title.as_deref(), Some("Intro"));
    }

    #[test]
    fn test_reconcile_row_pads_and_truncates() {
        let row = vec!["a".to_string()];
        assert_eq!(reconcile_row(3, &row), vec!["a", "", ""]);

        let row = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(reconcile_row(2, &row), vec!["a", "b"]);
    }

    #[test]
    fn test_reconciled_rows_only_for_tables() {
        let table = ContentBlock::Table {
            headers: vec!["A".to_string(), "B".to_string()],
            rows: vec![vec!["1".to_string()]],
            caption: None,
        };
        assert_eq!(table.reconciled_rows(), Some(vec![vec!["1".to_string(), String::new()]]));

        let quote = ContentBlock::Quote {
            text: "q".to_string(),
            author: None,
        };
        assert_eq!(quote.reconciled_rows(), None);
    }

    #[test]
    fn test_active_blocks_follow_layout() {
        let para = ContentBlock::Paragraph {
            text: "main".to_string(),
            emphasis: None,
        };
        let left = ContentBlock::Paragraph {
            text: "left".to_string(),
            emphasis: None,
        };
        let mut slide = Slide::new(SlideLayout::TitleContent).with_content(vec![para]);
        slide.left_content = Some(vec![left]);

        let texts: Vec<_> = slide.active_blocks().flat_map(|b| b.leaves()).collect();
        assert_eq!(texts, vec!["main"]);

        slide.layout = SlideLayout::Comparison;
        let texts: Vec<_> = slide.active_blocks().flat_map(|b| b.leaves()).collect();
        assert_eq!(texts, vec!["left"]);
    }
}
