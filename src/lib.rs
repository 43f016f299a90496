//! # pypic
//!
//! Query the Python package index from Rust: check whether a package (or a
//! given release of it) exists, and search the index, turning its HTML
//! search results page into structured records.
//!
//! ## Features
//!
//! - **Existence checks** - Ask the metadata endpoint whether a package or release exists
//! - **Search** - Parse the index search page into [`SearchResult`] records
//! - **Streaming parser** - Results are extracted chunk by chunk as the page downloads
//! - **Batch checks** - Check a list or map of packages in one go
//! - **Pluggable transport** - Swap the HTTP layer for tests or embedding
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use pypic::{PypiClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = PypiClient::new();
//!
//!     let exists = client.exists("requests", None).await?;
//!     println!("requests exists: {}", exists);
//!
//!     for hit in client.search(&["http", "client"]).await? {
//!         println!("{:?} {:?}", hit.name, hit.version);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Custom Client Configuration
//!
//! ```rust,no_run
//! use pypic::{PypiClient, Result};
//! use std::time::Duration;
//!
//! # fn example() -> Result<()> {
//! let client = PypiClient::builder()
//!     .base_url("https://testpypi.python.org/pypi")
//!     .timeout(Duration::from_secs(10))
//!     .user_agent("my-app/1.0")
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Parsing a page you already have
//!
//! ```rust
//! use pypic::SearchPageParser;
//!
//! let mut parser = SearchPageParser::new();
//! parser.feed_str("<table><tr><td><a href='/pypic'>pypic&nbsp;0.1.0</a></td>")?;
//! parser.feed_str("<td>9</td><td>Compare pypi packages</td></tr></table>")?;
//! parser.close()?;
//!
//! let results = parser.into_results();
//! assert_eq!(results[0].name.as_deref(), Some("pypic"));
//! assert_eq!(results[0].weight, Some(9));
//! # Ok::<(), pypic::PypicError>(())
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! pypic exists requests
//! pypic exists pypic --version 0.1.0
//! pypic search http client --format compact
//! pypic batch --json '["requests", "flask"]'
//! ```
//!
//! ## Configuration
//!
//! Configure via file (`--config pypic.toml`) or environment variables
//! (`PYPIC__SECTION__KEY`):
//!
//! ```toml
//! [index]
//! base_url = "http://testpypi.python.org"
//! timeout_seconds = 30
//!
//! [logging]
//! level = "info"
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod markup;
pub mod parser;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used items at the crate root for convenience
pub use client::{PypiClient, PypiClientBuilder};
pub use error::{MarkupError, PypicError, Result, TransportError};
pub use parser::{ParserState, SearchPageParser, NBSP};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{BatchEntry, BatchInput, FieldValue, PackageCheck, SearchResult};
pub use utils::{collapse_whitespace, normalize};

pub use config::{AppConfig, EnvironmentConfig};

/// Default package index base URL
pub const DEFAULT_BASE_URL: &str = "http://testpypi.python.org";

/// Default user agent for requests
pub const DEFAULT_USER_AGENT: &str = concat!("pypic/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
