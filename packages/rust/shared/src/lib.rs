//! Shared types, error model, and configuration for docmirror.
//!
//! This crate is the foundation depended on by all other docmirror crates.
//! It provides:
//! - [`DocMirrorError`], the unified error type
//! - Domain types ([`TreeEntry`], [`Document`], [`RateLimit`])
//! - Configuration ([`AppConfig`] and its sections, config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, FailurePolicy, FetchConfig, FilterConfig, GithubConfig, OutputConfig, RepoSpec,
    config_dir, config_file_path, init_config_at, load_config, load_config_from,
};
pub use error::{DocMirrorError, Result};
pub use types::{Document, EntryKind, RateLimit, TreeEntry};
