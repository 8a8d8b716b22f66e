//! Search engine backends.

pub mod duckduckgo;

pub use duckduckgo::DuckDuckGoEngine;
