//! Client and digest for the local headless-browser crawler service.
//!
//! The service renders pages with a real browser and returns their text,
//! headings and links as JSON. [`CrawlClient`] posts requests to it and
//! [`shape`] turns the result into a bounded plain-text digest for the model.

mod client;
mod shape;
mod types;

pub use client::{CrawlClient, CrawlError, read_timeout};
pub use shape::{DigestMode, TRUNCATION_MARKER, shape};
pub use types::{CrawlRequest, CrawlResult, Page, WaitUntil};
