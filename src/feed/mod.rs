//! Ingestion pipeline: fetch the CSV export, parse it into records, summarize.

pub mod aggregate;
pub mod client;
pub mod parser;

pub use aggregate::aggregate;
pub use client::{DEFAULT_FEED_URL, FeedClient, FeedSource, FetchError};
pub use parser::{ParseReport, ParsedFeed, parse_feed, parse_records};
