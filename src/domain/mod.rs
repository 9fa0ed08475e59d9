//! Domain layer for memory-bank-lint
//!
//! CDD Principle: Domain Model - Pure business logic for convention checking
//! - Contains the issue, report and source-file types every validator shares
//! - Independent of how files are discovered or how reports are rendered

pub mod issues;
pub mod source;

// Re-export main domain types for convenience
pub use issues::*;
pub use source::SourceFile;
