// CV ↔ offer matching: embedding text, the engine, and its HTTP surface.

pub mod engine;
pub mod handlers;
pub mod text;

pub use engine::{CvDocument, MatchOptions, MatchingEngine, MatchingReport, OfferDocument};
