//! Height-aware pagination of slide content.
//!
//! Oversized blocks are first cut into same-kind parts that respect the
//! item ceilings in [`ContentLimits`]. The resulting blocks are then packed
//! greedily, left to right, into as many slides as the page budget needs.
//! No block is ever dropped.

use crate::estimate::HeightEstimator;
use crate::limits::ContentLimits;
use crate::types::{ContentBlock, Slide, SlideLayout};
use log::debug;
use serde::{Deserialize, Serialize};

/// Page geometry used when packing blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    /// Maximum cumulative block height on one slide.
    pub page_budget: f64,
    /// Vertical gap between consecutive blocks.
    pub block_spacing: f64,
    /// A trailing slide shorter than this is folded into its predecessor.
    pub min_trailing_height: f64,
    /// How far past the budget a fold-back may push the previous slide.
    pub merge_overflow: f64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_budget: 4.2,
            block_spacing: 0.15,
            min_trailing_height: 1.0,
            merge_overflow: 0.6,
        }
    }
}

/// Splits slides whose content does not fit on one page.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    estimator: HeightEstimator,
    limits: ContentLimits,
    config: PaginationConfig,
}

impl Paginator {
    /// Create a paginator with the reference calibration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom height estimator.
    pub fn with_estimator(mut self, estimator: HeightEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Use custom item ceilings.
    pub fn with_limits(mut self, limits: ContentLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Use custom page geometry.
    pub fn with_config(mut self, config: PaginationConfig) -> Self {
        self.config = config;
        self
    }

    /// The height estimator in use.
    pub fn estimator(&self) -> &HeightEstimator {
        &self.estimator
    }

    /// Paginate one slide into one or more slides.
    ///
    /// Only `title-content` slides are split. Every other layout, and any
    /// slide without content, comes back unchanged as a single slide.
    pub fn paginate(&self, slide: &Slide) -> Vec<Slide> {
        if slide.layout != SlideLayout::TitleContent {
            return vec![slide.clone()];
        }
        let content = match &slide.content {
            Some(content) if !content.is_empty() => content,
            _ => return vec![slide.clone()],
        };

        let blocks: Vec<ContentBlock> = content.iter().flat_map(|b| self.split_block(b)).collect();
        if blocks.len() > content.len() {
            debug!(
                "Split {} blocks into {} for {:?}",
                content.len(),
                blocks.len(),
                slide.title
            );
        }

        let pages = self.pack(blocks);
        let total = pages.len();
        if total > 1 {
            debug!("Paginated {:?} into {total} slides", slide.title);
        }

        pages
            .into_iter()
            .enumerate()
            .map(|(idx, page)| {
                let first = idx == 0;
                Slide {
                    layout: slide.layout,
                    title: if total > 1 {
                        Some(page_title(slide.title.as_deref(), idx + 1, total))
                    } else {
                        slide.title.clone()
                    },
                    subtitle: slide.subtitle.clone(),
                    content: Some(page),
                    left_content: slide.left_content.clone().filter(|_| first),
                    right_content: slide.right_content.clone().filter(|_| first),
                    notes: slide.notes.clone().filter(|_| first),
                }
            })
            .collect()
    }

    /// Cut a block into parts that respect the per-kind item ceilings.
    ///
    /// Paragraphs and quotes are never split. A block with no items comes
    /// back as a single part.
    pub fn split_block(&self, block: &ContentBlock) -> Vec<ContentBlock> {
        let parts = self.split_parts(block);
        if parts.is_empty() {
            vec![block.clone()]
        } else {
            parts
        }
    }

    fn split_parts(&self, block: &ContentBlock) -> Vec<ContentBlock> {
        match block {
            ContentBlock::Code {
                language,
                lines,
                caption,
            } => {
                let parts: Vec<_> = lines.chunks(self.limits.max_code_lines.max(1)).collect();
                let total = parts.len();
                parts
                    .into_iter()
                    .enumerate()
                    .map(|(idx, chunk)| ContentBlock::Code {
                        language: language.clone(),
                        lines: chunk.to_vec(),
                        caption: part_caption(caption, idx + 1, total),
                    })
                    .collect()
            }
            ContentBlock::Bullets { items } => items
                .chunks(self.limits.max_list_items.max(1))
                .map(|chunk| ContentBlock::Bullets {
                    items: chunk.to_vec(),
                })
                .collect(),
            ContentBlock::Numbered { items } => items
                .chunks(self.limits.max_list_items.max(1))
                .map(|chunk| ContentBlock::Numbered {
                    items: chunk.to_vec(),
                })
                .collect(),
            ContentBlock::Table {
                headers,
                rows,
                caption,
            } => {
                let parts: Vec<_> = rows.chunks(self.limits.max_table_rows.max(1)).collect();
                let total = parts.len();
                parts
                    .into_iter()
                    .enumerate()
                    .map(|(idx, chunk)| ContentBlock::Table {
                        headers: headers.clone(),
                        rows: chunk.to_vec(),
                        caption: part_caption(caption, idx + 1, total),
                    })
                    .collect()
            }
            ContentBlock::Paragraph { .. } | ContentBlock::Quote { .. } => vec![block.clone()],
        }
    }

    /// Greedy left-to-right packing, then fold a sparse tail back.
    fn pack(&self, blocks: Vec<ContentBlock>) -> Vec<Vec<ContentBlock>> {
        let budget = self.config.page_budget;
        let spacing = self.config.block_spacing;

        let mut pages: Vec<Vec<ContentBlock>> = Vec::new();
        let mut current: Vec<ContentBlock> = Vec::new();
        let mut height = 0.0;

        for block in blocks {
            let h = self.estimator.estimate(&block);
            if current.is_empty() {
                height = h;
            } else if height + spacing + h > budget {
                pages.push(std::mem::take(&mut current));
                height = h;
            } else {
                height += spacing + h;
            }
            current.push(block);
        }
        if !current.is_empty() {
            pages.push(current);
        }

        self.merge_sparse_tail(&mut pages);
        pages
    }

    fn merge_sparse_tail(&self, pages: &mut Vec<Vec<ContentBlock>>) {
        if pages.len() < 2 {
            return;
        }
        let spacing = self.config.block_spacing;
        let tail = self.estimator.stack_height(&pages[pages.len() - 1], spacing);
        if tail >= self.config.min_trailing_height {
            return;
        }

        let prev = self.estimator.stack_height(&pages[pages.len() - 2], spacing);
        let merged = prev + spacing + tail;
        if merged > self.config.page_budget + self.config.merge_overflow {
            debug!("Keeping sparse trailing slide ({tail:.2}): merge would reach {merged:.2}");
            return;
        }

        if let Some(last) = pages.pop() {
            if let Some(prev) = pages.last_mut() {
                prev.extend(last);
            }
        }
    }
}

fn page_title(title: Option<&str>, page: usize, total: usize) -> String {
    match title {
        Some(title) => format!("{title} ({page}/{total})"),
        None => format!("({page}/{total})"),
    }
}

fn part_caption(caption: &Option<String>, part: usize, total: usize) -> Option<String> {
    caption.as_ref().map(|c| {
        if total > 1 {
            format!("{c} ({part}/{total})")
        } else {
            c.clone()
        }
    })
}
