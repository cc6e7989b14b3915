//! Turns loosely-structured, model-generated slide JSON into a bounded
//! presentation: tolerant decoding, block normalization, and height-aware
//! pagination.

pub mod assemble;
pub mod config;
pub mod decode;
pub mod error;
pub mod estimate;
pub mod limits;
pub mod normalize;
pub mod paginate;
pub mod types;

pub use assemble::{build_presentation, BuildReport, PresentationBuilder};
pub use config::PipelineConfig;
pub use decode::{decode, DecodeMode, Decoder};
pub use error::{DecodeError, Result};
pub use estimate::{EstimatorConfig, HeightEstimator};
pub use limits::{ContentLimits, LimitViolation};
pub use normalize::normalize_block;
pub use paginate::{PaginationConfig, Paginator};
pub use types::{ContentBlock, Emphasis, Presentation, Slide, SlideLayout};
