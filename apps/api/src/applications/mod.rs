// Candidate applications to job offers, scored at submission time.

pub mod handlers;
pub mod store;
