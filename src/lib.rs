//! Loader and validator for multi-network chain configuration documents.
//!
//! A document maps chain ids to network descriptions (native currency, RPC
//! endpoints, explorers, contract deployments). Validation collects every
//! problem in one pass; unknown properties at any layer are kept in the
//! owning object's `extensions` map and written back by [`to_value`].
//!
//! ```no_run
//! let config = chain_config::load_from_path("config/networks.json")?;
//! for (chain_id, network) in &config.networks {
//!     println!("{} {}", chain_id, network.name);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config_error;
pub mod config_extensions;
pub mod config_schema;
pub mod config_types;
pub mod config_validator;

use anyhow::{Context, Result};
use std::path::Path;

pub use config_error::{ConfigError, ErrorKind, JsonPath, ValidationError, ValidationErrors};
pub use config_extensions::{Decoded, decode_slice, to_string_pretty, to_value};
pub use config_schema::{FieldSpec, ObjectType, ValueKind, field_spec};
pub use config_types::{
    ChainId, Configuration, ContractConfig, ExplorerConfig, Extensions, NativeCurrencyConfig,
    NetworkConfig, RelationsConfig, RpcConfig,
};
pub use config_validator::{validate, validate_decoded};

/// Decodes and validates raw document bytes.
pub fn load_slice(bytes: &[u8]) -> Result<Configuration, ConfigError> {
    let decoded = decode_slice(bytes)?;
    Ok(validate_decoded(&decoded)?)
}

pub fn load_str(json: &str) -> Result<Configuration, ConfigError> {
    load_slice(json.as_bytes())
}

/// Reads a document from disk. The path is attached to any failure.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Configuration> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read chain configuration {}", path.display()))?;
    let config = load_slice(&bytes)
        .with_context(|| format!("Invalid chain configuration {}", path.display()))?;
    Ok(config)
}
