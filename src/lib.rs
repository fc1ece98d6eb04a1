//! # rss_reader
//!
//! Reads an RSS or Atom feed and prints it as labeled text lines or as JSON.
//!
//! ```text
//! fetch -> parse XML -> extract/fold -> whitelist/order -> text or JSON lines
//! ```
//!
//! - [`feed`]: the reading pipeline, the HTTP fetcher and the RSS builder
//! - [`config`]: optional TOML configuration
//! - [`util`]: URL validation

pub mod config;
pub mod feed;
pub mod util;
