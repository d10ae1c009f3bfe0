//! Clients for external data sources

pub mod news;

pub use news::{GoogleNewsClient, HeadlineSource, parse_headlines, parse_selector};
