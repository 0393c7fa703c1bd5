//! Core types for the Graft design importer.
//!
//! This crate provides the foundational types used across all other graft crates:
//! - The source document model (pages, nodes and their capabilities)
//! - The output UI tree and the behaviors converters attach to it
//! - Diagnostics collected during an import pass
//! - Error types

pub mod diagnostics;
pub mod document;
pub mod errors;
pub mod types;
pub mod ui;

pub use diagnostics::*;
pub use document::*;
pub use errors::*;
pub use types::*;
pub use ui::*;
