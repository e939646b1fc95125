//! Shared types, error model, and configuration for mddocset.
//!
//! This crate is the foundation depended on by all other mddocset crates.
//! It provides:
//! - [`DocsetError`], the unified error type
//! - Domain types ([`IndexEntry`], [`DocumentSource`], [`Section`], [`BundleManifest`])
//! - Configuration ([`AppConfig`], [`BuildConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BuildConfig, BuildSettings, CONFIG_FILE_NAME, DocsetConfig, LinksConfig,
    PathsConfig, default_config_path, init_config, load_config, load_config_from,
};
pub use error::{DocsetError, Result};
pub use types::{
    ANCHOR_ENTRY_TYPE, BundleManifest, DocumentSource, IndexEntry, MARKDOWN_EXTENSIONS, Section,
    strip_markdown_extension,
};
