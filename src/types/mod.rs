//! Domain data types for the extraction pipeline.

pub mod chunk;
pub mod config;
pub mod document;
pub mod page;
pub mod record;
