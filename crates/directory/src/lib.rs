//! Node Ownership Directory
//!
//! Tracks `node -> owner` and `node -> resolver`, plus blanket operator
//! approvals, and answers the authorization question every write path in
//! the registry asks: may this caller act for this node right now?

pub mod directory;
pub mod errors;

pub use directory::*;
pub use errors::*;
