//! Rendered-height estimation for content blocks.
//!
//! Heights are in inches against a 10 x 5.625 canvas. These are estimates,
//! not measurements; recalibrate [`EstimatorConfig`] when targeting a
//! renderer with different font metrics.

use crate::types::ContentBlock;
use serde::{Deserialize, Serialize};

/// Calibration constants for [`HeightEstimator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EstimatorConfig {
    pub paragraph_min_height: f64,
    pub paragraph_chars_per_line: usize,
    pub paragraph_line_height: f64,

    /// Height of one bullet or numbered item.
    pub list_item_height: f64,

    pub code_line_height: f64,
    pub code_padding: f64,
    pub code_max_height: f64,

    pub table_row_height: f64,

    /// Extra height reserved for a code or table caption.
    pub caption_height: f64,

    pub quote_min_height: f64,
    pub quote_chars_per_line: usize,
    pub quote_line_height: f64,
    pub quote_author_height: f64,
    pub quote_bare_height: f64,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            paragraph_min_height: 0.4,
            paragraph_chars_per_line: 50,
            paragraph_line_height: 0.25,
            list_item_height: 0.35,
            code_line_height: 0.16,
            code_padding: 0.12,
            code_max_height: 3.5,
            table_row_height: 0.35,
            caption_height: 0.3,
            quote_min_height: 0.4,
            quote_chars_per_line: 50,
            quote_line_height: 0.25,
            quote_author_height: 0.3,
            quote_bare_height: 0.1,
        }
    }
}

/// Predicts how tall a block will render.
#[derive(Debug, Clone, Default)]
pub struct HeightEstimator {
    config: EstimatorConfig,
}

impl HeightEstimator {
    /// Create an estimator with the reference calibration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an estimator with custom calibration.
    pub fn with_config(config: EstimatorConfig) -> Self {
        Self { config }
    }

    /// Estimated rendered height of a block.
    pub fn estimate(&self, block: &ContentBlock) -> f64 {
        let c = &self.config;
        match block {
            ContentBlock::Paragraph { text, .. } => wrapped_height(
                text,
                c.paragraph_chars_per_line,
                c.paragraph_line_height,
                c.paragraph_min_height,
            ),
            ContentBlock::Bullets { items } | ContentBlock::Numbered { items } => {
                items.len() as f64 * c.list_item_height
            }
            ContentBlock::Code { lines, caption, .. } => {
                let body = (lines.len() as f64 * c.code_line_height + 2.0 * c.code_padding)
                    .min(c.code_max_height);
                body + caption_allowance(caption, c.caption_height)
            }
            ContentBlock::Table { rows, caption, .. } => {
                (rows.len() + 1) as f64 * c.table_row_height
                    + caption_allowance(caption, c.caption_height)
            }
            ContentBlock::Quote { text, author } => {
                let body = wrapped_height(
                    text,
                    c.quote_chars_per_line,
                    c.quote_line_height,
                    c.quote_min_height,
                );
                if author.is_some() {
                    body + c.quote_author_height
                } else {
                    body + c.quote_bare_height
                }
            }
        }
    }

    /// Sum of block heights plus spacing between consecutive blocks.
    pub fn stack_height(&self, blocks: &[ContentBlock], spacing: f64) -> f64 {
        let gaps = blocks.len().saturating_sub(1) as f64 * spacing;
        blocks.iter().map(|b| self.estimate(b)).sum::<f64>() + gaps
    }
}

fn wrapped_height(text: &str, chars_per_line: usize, line_height: f64, min_height: f64) -> f64 {
    let chars = text.chars().count();
    let lines = chars.div_ceil(chars_per_line.max(1));
    (lines as f64 * line_height).max(min_height)
}

fn caption_allowance(caption: &Option<String>, height: f64) -> f64 {
    if caption.is_some() {
        height
    } else {
        0.0
    }
}
