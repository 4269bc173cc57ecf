// Job offers published by recruiters.

pub mod handlers;
pub mod store;
