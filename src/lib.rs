pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::storage::LocalStorage;
pub use config::{CliConfig, RunConfig, TomlConfig};
pub use core::{etl::EtlEngine, pipeline::SourcePipeline, profile::SourceKind};
pub use utils::error::{EtlError, Result};
