//! Core types, markup node definitions, and utilities for the Tags engine.
//!
//! This crate provides the foundational types shared by the other tags crates:
//! - Markup node shape produced by the parser and consumed by the normalizer
//! - Tag handles, content nodes, and the two content shapes
//! - Normalizer input variants
//! - The id sequence allocator
//! - Error types

pub mod ast;
pub mod errors;
pub mod input;
pub mod sequence;
pub mod types;

pub use ast::*;
pub use errors::*;
pub use input::*;
pub use sequence::*;
pub use types::*;
