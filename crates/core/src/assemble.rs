//! Top-level pipeline: decode raw model output, then paginate every slide.

use crate::config::PipelineConfig;
use crate::decode::Decoder;
use crate::error::Result;
use crate::estimate::HeightEstimator;
use crate::paginate::Paginator;
use crate::types::Presentation;
use log::info;

/// Counts describing one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildReport {
    /// Slides recovered by the decoder.
    pub input_slides: usize,
    /// Slides after pagination.
    pub output_slides: usize,
    /// Decoded slides that became more than one output slide.
    pub paginated_slides: usize,
}

/// Runs the decoder and paginator with one configuration.
#[derive(Debug, Clone)]
pub struct PresentationBuilder {
    decoder: Decoder,
    paginator: Paginator,
    paginate: bool,
}

impl Default for PresentationBuilder {
    fn default() -> Self {
        Self {
            decoder: Decoder::new(),
            paginator: Paginator::new(),
            paginate: true,
        }
    }
}

impl PresentationBuilder {
    /// Create a builder with lenient decoding and the reference calibration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let paginator = Paginator::new()
            .with_estimator(HeightEstimator::with_config(config.estimator.clone()))
            .with_limits(config.limits.clone())
            .with_config(config.pagination.clone());
        Self {
            decoder: Decoder::new().with_mode(config.mode),
            paginator,
            paginate: config.paginate,
        }
    }

    /// Turn pagination on or off.
    pub fn with_pagination(mut self, paginate: bool) -> Self {
        self.paginate = paginate;
        self
    }

    /// Decode and paginate raw model output.
    pub fn build(&self, raw: &str) -> Result<Presentation> {
        self.build_with_report(raw).map(|(deck, _)| deck)
    }

    /// Like [`build`](Self::build), also returning slide counts.
    pub fn build_with_report(&self, raw: &str) -> Result<(Presentation, BuildReport)> {
        let decoded = self.decoder.decode(raw)?;
        let input_slides = decoded.len();

        if !self.paginate {
            let report = BuildReport {
                input_slides,
                output_slides: input_slides,
                paginated_slides: 0,
            };
            return Ok((decoded, report));
        }

        let (deck, paginated_slides) = self.paginate_counting(&decoded);
        let report = BuildReport {
            input_slides,
            output_slides: deck.len(),
            paginated_slides,
        };
        info!(
            "Built presentation: {} slides in, {} out ({} paginated)",
            report.input_slides, report.output_slides, report.paginated_slides
        );
        Ok((deck, report))
    }

    /// Paginate every slide of an already-decoded presentation.
    pub fn paginate_presentation(&self, deck: &Presentation) -> Presentation {
        self.paginate_counting(deck).0
    }

    fn paginate_counting(&self, deck: &Presentation) -> (Presentation, usize) {
        let mut paginated = 0;
        let mut slides = Vec::with_capacity(deck.len());
        for slide in &deck.slides {
            let pages = self.paginator.paginate(slide);
            if pages.len() > 1 {
                paginated += 1;
            }
            slides.extend(pages);
        }
        (Presentation::new(slides), paginated)
    }
}

/// Decode leniently and paginate with the reference calibration.
pub fn build_presentation(raw: &str) -> Result<Presentation> {
    PresentationBuilder::new().build(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::types::{ContentBlock, SlideLayout};
    use serde_json::json;

    fn bullet_slide(title: &str, n: usize) -> serde_json::Value {
        let items: Vec<String> = (1..=n).map(|i| format!("{title}-{i}")).collect();
        json!({"layout": "title-content", "title": title, "content": [
            {"type": "bullets", "items": items}
        ]})
    }

    #[test]
    fn test_build_flattens_paginated_slides_in_order() {
        let raw = json!({"slides": [
            {"layout": "title-only", "title": "Cover"},
            bullet_slide("Long", 30),
            bullet_slide("Short", 2),
        ]})
        .to_string();

        let (deck, report) = PresentationBuilder::new().build_with_report(&raw).unwrap();
        assert_eq!(report.input_slides, 3);
        assert_eq!(report.output_slides, deck.len());
        assert_eq!(report.paginated_slides, 1);

        let titles: Vec<_> = deck
            .slides
            .iter()
            .map(|s| s.title.clone().unwrap_or_default())
            .collect();
        let n = deck.len() - 2;
        assert_eq!(titles.first().map(String::as_str), Some("Cover"));
        assert_eq!(titles.last().map(String::as_str), Some("Short"));
        assert_eq!(titles[1], format!("Long (1/{n})"));
        assert_eq!(titles[n], format!("Long ({n}/{n})"));

        let items: Vec<String> = deck.slides[1..=n]
            .iter()
            .flat_map(|s| s.content.iter().flatten())
            .flat_map(ContentBlock::leaves)
            .collect();
        let expected: Vec<String> = (1..=30).map(|i| format!("Long-{i}")).collect();
        assert_eq!(items, expected);
    }

    #[test]
    fn test_build_without_pagination() {
        let raw = json!([bullet_slide("Long", 30)]).to_string();
        let (deck, report) = PresentationBuilder::new()
            .with_pagination(false)
            .build_with_report(&raw)
            .unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(report.paginated_slides, 0);
    }

    #[test]
    fn test_build_presentation_recovers_truncated_output() {
        let raw = "```json\n{\"slides\":[{\"layout\":\"title-content\",\"title\":\"X\",\"content\":[{\"type\":\"paragraph\",\"text\":\"hi\"}]},{\"layout\":\"title-content\",\"title\":\"Y\",\"content\"";
        let deck = build_presentation(raw).unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.slides[0].title.as_deref(), Some("X"));
    }

    #[test]
    fn test_build_propagates_decode_errors() {
        assert_eq!(build_presentation("[]"), Err(DecodeError::EmptyPresentation));
        assert!(matches!(build_presentation("nope"), Err(DecodeError::Unparseable(_))));
    }

    #[test]
    fn test_from_config_applies_mode_and_limits() {
        let config = PipelineConfig::from_json_str(
            r#"{"mode":"strict","limits":{"maxListItems":2},"pagination":{"pageBudget":100.0}}"#,
        )
        .unwrap();
        let builder = PresentationBuilder::from_config(&config);

        assert!(matches!(
            builder.build(r#"[{"title":"no layout"}]"#),
            Err(DecodeError::SchemaViolation { slide: 0, .. })
        ));

        let deck = builder
            .build(&json!([bullet_slide("L", 5)]).to_string())
            .unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck.slides[0].layout, SlideLayout::TitleContent);
        assert_eq!(deck.slides[0].content.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_slide_with_empty_list_survives_pagination() {
        let deck = Presentation::from_json(
            r#"{"slides":[{"layout":"title-content","title":"Wire","content":[{"type":"bullets","items":[]}]}]}"#,
        )
        .unwrap();
        let out = PresentationBuilder::new().paginate_presentation(&deck);
        assert_eq!(out.len(), 1);
        assert_eq!(out.slides[0].title.as_deref(), Some("Wire"));
        assert_eq!(out, deck);
    }

    #[test]
    fn test_paginate_presentation_is_idempotent_for_small_decks() {
        let deck = build_presentation(&json!([bullet_slide("A", 3)]).to_string()).unwrap();
        let again = PresentationBuilder::new().paginate_presentation(&deck);
        assert_eq!(deck, again);
    }
}
