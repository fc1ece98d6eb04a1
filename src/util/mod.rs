//! Small helpers shared by the fetcher and the CLI.
//!
//! - **URL validation**: only http(s) sources, optionally refusing
//!   localhost and private network addresses

mod url_validator;

pub use url_validator::{validate_url, UrlValidationError};
