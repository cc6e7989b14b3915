//! Advisory content limits shared with the upstream generator.
//!
//! The generator is told these limits in its prompt; the paginator enforces
//! the item ceilings regardless of whether the generator honored them.

use crate::types::{ContentBlock, Slide};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-slide content limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContentLimits {
    pub max_blocks_per_slide: usize,
    pub max_list_items: usize,
    pub max_code_lines: usize,
    pub max_table_rows: usize,
    pub max_table_columns: usize,
    pub max_title_chars: usize,
    pub max_subtitle_chars: usize,
    pub max_paragraph_chars: usize,
    pub max_quote_chars: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            max_blocks_per_slide: 4,
            max_list_items: 6,
            max_code_lines: 15,
            max_table_rows: 6,
            max_table_columns: 5,
            max_title_chars: 60,
            max_subtitle_chars: 120,
            max_paragraph_chars: 400,
            max_quote_chars: 250,
        }
    }
}

/// One advisory limit a slide exceeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitViolation {
    /// Which limit, e.g. `"list items"`.
    pub limit: &'static str,
    /// The observed value.
    pub actual: usize,
    /// The configured maximum.
    pub max: usize,
}

impl fmt::Display for LimitViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} exceeds {}", self.limit, self.actual, self.max)
    }
}

impl ContentLimits {
    /// Create limits with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every advisory limit the slide exceeds. Does not modify anything.
    ///
    /// Only the content fields used by the slide's layout are checked.
    pub fn check_slide(&self, slide: &Slide) -> Vec<LimitViolation> {
        let mut out = Vec::new();
        let mut push = |limit, actual: usize, max: usize| {
            if actual > max {
                out.push(LimitViolation { limit, actual, max });
            }
        };

        if let Some(title) = &slide.title {
            push("title chars", title.chars().count(), self.max_title_chars);
        }
        if let Some(subtitle) = &slide.subtitle {
            push("subtitle chars", subtitle.chars().count(), self.max_subtitle_chars);
        }

        let blocks: Vec<&ContentBlock> = slide.active_blocks().collect();
        push("blocks per slide", blocks.len(), self.max_blocks_per_slide);
        for block in blocks {
            match block {
                ContentBlock::Paragraph { text, .. } => {
                    push("paragraph chars", text.chars().count(), self.max_paragraph_chars)
                }
                ContentBlock::Bullets { items } | ContentBlock::Numbered { items } => {
                    push("list items", items.len(), self.max_list_items)
                }
                ContentBlock::Code { lines, .. } => {
                    push("code lines", lines.len(), self.max_code_lines)
                }
                ContentBlock::Table { headers, rows, .. } => {
                    push("table rows", rows.len(), self.max_table_rows);
                    push("table columns", headers.len(), self.max_table_columns);
                }
                ContentBlock::Quote { text, .. } => {
                    push("quote chars", text.chars().count(), self.max_quote_chars)
                }
            }
        }

        out
    }

    /// Render the limits as prompt rules for the generator.
    pub fn prompt_rules(&self) -> String {
        [
            format!("- At most {} content blocks per slide", self.max_blocks_per_slide),
            format!("- At most {} items per bullet or numbered list", self.max_list_items),
            format!("- At most {} lines per code block", self.max_code_lines),
            format!(
                "- At most {} rows and {} columns per table",
                self.max_table_rows, self.max_table_columns
            ),
            format!("- Titles under {} characters", self.max_title_chars),
            format!("- Subtitles under {} characters", self.max_subtitle_chars),
            format!("- Paragraphs under {} characters", self.max_paragraph_chars),
            format!("- Quotes under {} characters", self.max_quote_chars),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SlideLayout;

    #[test]
    fn test_within_limits_reports_nothing() {
        let slide = Slide::new(SlideLayout::TitleContent)
            .with_title("Short")
            .with_content(vec![ContentBlock::Bullets {
                items: vec!["a".to_string(); 3],
            }]);
        assert!(ContentLimits::new().check_slide(&slide).is_empty());
    }

    #[test]
    fn test_reports_each_overrun() {
        let slide = Slide::new(SlideLayout::TitleContent)
            .with_title("x".repeat(61))
            .with_content(vec![
                ContentBlock::Bullets {
                    items: vec!["a".to_string(); 7],
                },
                ContentBlock::Table {
                    headers: vec!["h".to_string(); 6],
                    rows: vec![vec!["c".to_string()]],
                    caption: None,
                },
            ]);

        let violations = ContentLimits::new().check_slide(&slide);
        let names: Vec<_> = violations.iter().map(|v| v.limit).collect();
        assert_eq!(names, vec!["title chars", "list items", "table columns"]);
        assert_eq!(violations[1].to_string(), "list items: 7 exceeds 6");
    }

    #[test]
    fn test_checks_both_columns() {
        let mut slide = Slide::new(SlideLayout::TwoColumn);
        slide.left_content = Some(vec![ContentBlock::Code {
            language: "rust".to_string(),
            lines: vec!["x".to_string(); 16],
            caption: None,
        }]);
        slide.right_content = Some(vec![ContentBlock::Quote {
            text: "q".repeat(300),
            author: None,
        }]);

        let names: Vec<_> = ContentLimits::new()
            .check_slide(&slide)
            .iter()
            .map(|v| v.limit)
            .collect();
        assert_eq!(names, vec!["code lines", "quote chars"]);
    }

    #[test]
    fn test_columns_count_toward_one_block_budget() {
        let mut slide = Slide::new(SlideLayout::Comparison);
        slide.left_content = Some(vec![ContentBlock::Paragraph {
            text: "p".to_string(),
            emphasis: None,
        }; 3]);
        slide.right_content = Some(vec![ContentBlock::Paragraph {
            text: "p".to_string(),
            emphasis: None,
        }; 2]);
        // Ignored: not used by a comparison layout.
        slide.content = Some(vec![ContentBlock::Bullets {
            items: vec!["a".to_string(); 9],
        }]);

        let violations = ContentLimits::new().check_slide(&slide);
        assert_eq!(
            violations,
            vec![LimitViolation {
                limit: "blocks per slide",
                actual: 5,
                max: 4,
            }]
        );
    }

    #[test]
    fn test_prompt_rules_mention_limits() {
        let limits = ContentLimits {
            max_code_lines: 12,
            ..ContentLimits::default()
        };
        let rules = limits.prompt_rules();
        assert!(rules.contains("At most 12 lines per code block"));
        assert!(rules.contains("At most 6 rows and 5 columns per table"));
        assert_eq!(rules.lines().count(), 8);
    }
}
