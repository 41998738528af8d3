//! Store access for the chronicle editor.
//!
//! - `client`: the `AnnotationStore` trait and its HTTP implementation
//! - `loader`: applying fetched data to an `EditorState` with the failure policy
//! - `config`: file-backed settings (native only)
//! - `telemetry`: console tracing setup (native, `telemetry` feature)

pub mod client;
pub mod error;
pub mod loader;

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub mod config;

#[cfg(feature = "telemetry")]
pub mod telemetry;

pub use client::{AnnotationStore, HttpStore, decode_payload};
pub use error::StoreError;
pub use loader::{
    CorpusLoad, apply_corpus, apply_section_text, fetch_corpus, load_corpus, load_section,
    report_failure,
};

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub use config::{Config, FileStore};
#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub use error::ConfigError;
