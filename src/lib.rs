/// Utilities for reading `.TOM` files and shared parser helpers
pub mod data;
/// Error definitions
pub mod error;
/// Model file formats
pub mod models;
/// Labels, observations and text rendering for decoded headers
pub mod report;

pub use data::tom_file::TomFile;
pub use error::{DecodeError, LoadError};
pub use models::tom::{
    BlockSpan, DEFAULT_END_OFFSET, HEADER_SIZE, Inspection, TomHeader, compute_block_span, decode,
    inspect,
};
