//! Source module for the flow log pipeline.
//!
//! Fetches raw objects from storage and decodes them into flow log records.

mod decoder;
mod object_store;

pub use decoder::decode;
pub use object_store::{ObjectStore, S3ObjectStore};
