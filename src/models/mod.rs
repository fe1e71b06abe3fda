/// ReBoot PS1 `.TOM` model header
pub mod tom;
