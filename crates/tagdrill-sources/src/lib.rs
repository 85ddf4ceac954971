//! tagdrill-sources: where the reference tables come from.
//!
//! Implements the `TableSource` trait for a local data directory, an HTTP
//! server and fixed in-memory tables, plus the `tagdrill.toml` configuration
//! that selects between them.

pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod mock;

pub use config::{
    create_source, load_config, load_config_from, parse_config, SourceConfig, TagdrillConfig,
    DEFAULT_CONFIG_TOML,
};
pub use error::SourceError;
pub use fs::DirectorySource;
pub use http::HttpSource;
pub use mock::MemorySource;
