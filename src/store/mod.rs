//! Metadata store collaborators.
//!
//! - `traits` - narrow asset, annotation and catalog search contracts
//! - `entity` - generic entity shapes exchanged with the store
//! - `memory` - in-memory implementation of every contract

pub mod entity;
pub mod memory;
pub mod traits;

pub use entity::*;
pub use memory::*;
pub use traits::*;
