#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared building blocks for the retrace regex engine.
//!
//! - [`encoding`]: capability tables for character encodings
//! - [`syntax`]: dialect descriptors and presets
//! - [`options`]: compile-time and search-time option sets
//! - [`colors`]: terminal palette for dumps and traces

pub mod colors;
pub mod encoding;
pub mod options;
pub mod syntax;

#[cfg(test)]
mod syntax_tests;

pub use colors::Colors;
pub use encoding::{
    ASCII, CharType, CodePoint, CodeRange, Encoding, EncodingRef, InvalidCodePoint, LATIN1,
    Property, UTF8,
};
pub use options::{Options, SearchOptions};
pub use syntax::{Syntax, SyntaxBehavior, SyntaxOperators};
