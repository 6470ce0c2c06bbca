//! Deterministic term and context mining.
//!
//! Two pure extractors over a single utterance: [`KeywordExtractor`] mines
//! locations, activity classes, trip length, routes, and time-of-day hints;
//! [`ContextExtractor`] mines companions, emotional context, budget, and
//! preference flags. Both are side-effect-free — calling either twice on the
//! same text yields equal output.

pub mod context;
pub mod keywords;
pub mod vocab;

pub use context::{ContextExtractor, ContextHarvest};
pub use keywords::{KeywordExtractor, KeywordHarvest};
