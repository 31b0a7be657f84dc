//! DexQuote Common Types
//!
//! This crate contains the shared identifier types used across the DexQuote
//! router: asset symbols, directed asset pairs, and snapshot versions.

pub mod identifiers;

pub use identifiers::*;
