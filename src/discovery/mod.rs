//! Discovery orchestration.
//!
//! Dispatches registered discovery services against catalogued assets:
//! - `connector` - plugin contract
//! - `registry` - request type to service lookup
//! - `context` - per-request view handed to a service
//! - `service` - runs one service and drives its report status
//! - `engine` - single-asset and bulk dispatch, report read-back

pub mod connector;
pub mod context;
pub mod engine;
pub mod registry;
pub mod service;

pub use connector::*;
pub use context::*;
pub use engine::*;
pub use registry::*;
pub use service::*;
