//! Domain records.
//!
//! These are the strongly typed shapes that the builders flatten into
//! property bags for the metadata store.

pub mod annotation;
pub mod asset;
pub mod report;
pub mod status;

pub use annotation::*;
pub use asset::*;
pub use report::*;
pub use status::*;
