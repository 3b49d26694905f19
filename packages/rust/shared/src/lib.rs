//! Shared types, error model, and configuration for fieldpress.
//!
//! This crate is the foundation depended on by all other fieldpress crates.
//! It provides:
//! - [`FieldpressError`] — the unified error type
//! - Domain types ([`Record`], [`RecordType`], the canonical field table)
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrmConfig, PublishDefaults, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_credentials,
};
pub use error::{FieldpressError, Result};
pub use types::{
    CANONICAL_FIELDS, FIELD_MAP, RawRecord, Record, RecordType, TITLE_LIMIT, source_fields,
};
