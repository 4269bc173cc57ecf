// Structured extraction: PDF → text → ParsedCv, offer form → ParsedOffer.
// LLM calls go through llm_client; a failed call yields a typed fallback,
// never an error, so uploads and offer creation keep working without the LLM.

pub mod cv_parser;
pub mod offer_parser;
pub mod pdf;
pub mod prompts;

use thiserror::Error;

pub use cv_parser::{parse_cv, ParsedCv};
pub use offer_parser::{parse_offer, OfferDraft, ParsedOffer};
pub use pdf::{extract_pdf_text, looks_like_pdf};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF could not be read: {0}")]
    Pdf(String),

    #[error("PDF contains no extractable text")]
    EmptyDocument,
}
