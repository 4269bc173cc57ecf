// CV upload and management. PDFs live in S3, extracted data in Postgres.

pub mod handlers;
pub mod storage;
pub mod store;
