/// Shared winnow parser types
pub mod parser_utils;
/// Reading `.TOM` files from disk
pub mod tom_file;
