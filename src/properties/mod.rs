//! Typed property bag.
//!
//! Domain records are flattened into tagged attribute bags before they are
//! handed to the metadata store:
//! - `instance` - the bag and its tagged value categories
//! - `helpers` - per-category encode/decode helpers

pub mod helpers;
pub mod instance;

pub use helpers::*;
pub use instance::*;
