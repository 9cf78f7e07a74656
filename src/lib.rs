//! Discovery Core - asset discovery orchestration
//!
//! This crate accepts requests to analyze catalogued assets, runs pluggable
//! discovery services against them, tracks each run through its report
//! status, and stores findings as typed annotations. The implementation
//! prioritizes:
//!
//! 1. **Isolation** - a failing discovery service never reaches the caller
//! 2. **Logging** - every decision point logged with engine, report and asset
//! 3. **Stable encoding** - attribute names and enum ordinals never drift
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `discovery` - engine handler, service handler, context and registry
//! - `builders` - domain records to property bags and back
//! - `properties` - tagged property bag and category helpers
//! - `model` - reports, annotations, assets and status tables
//! - `store` - metadata store contracts and an in-memory implementation
//! - `config` - engine configuration
//! - `logging` - structured logging with discovery context

pub mod builders;
pub mod config;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod model;
pub mod properties;
pub mod store;

pub use config::{EngineConfig, UnknownRequestTypePolicy};
pub use discovery::{
    Connector, ConnectorProvider, DiscoveryAnnotationStore, DiscoveryContext, DiscoveryEngineHandler,
    DiscoveryService, DiscoveryServiceRegistry, RegisteredDiscoveryService, ScanSummary,
};
pub use error::{DiscoveryError, ErrorKind, Result};

/// Initialize the logger. Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}
