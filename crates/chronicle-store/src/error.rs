//! Errors raised while setting up a store client or reading config.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum StoreError {
    #[error("invalid store endpoint: {0}")]
    #[diagnostic(
        code(chronicle::store::endpoint),
        help("endpoints look like http://localhost:3000")
    )]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("could not build HTTP client")]
    #[diagnostic(code(chronicle::store::client))]
    Client(#[from] reqwest::Error),
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("could not access config file")]
    #[diagnostic(code(chronicle::config::io))]
    Io(#[from] std::io::Error),

    #[error("invalid JSON config")]
    #[diagnostic(code(chronicle::config::json))]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML config")]
    #[diagnostic(code(chronicle::config::toml))]
    TomlRead(#[from] toml::de::Error),

    #[error("could not write TOML config")]
    #[diagnostic(code(chronicle::config::toml))]
    TomlWrite(#[from] toml::ser::Error),

    #[error("unsupported config format: {0}")]
    #[diagnostic(
        code(chronicle::config::format),
        help("use a .json or .toml file")
    )]
    UnsupportedFormat(String),
}
