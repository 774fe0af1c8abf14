//! Core types for the Umbra naming registry.
//!
//! Nodes, addresses, interface tags and stealth key records, plus the
//! [`Host`] every component runs on.

pub mod address;
pub mod events;
pub mod host;
pub mod interface;
pub mod node;
pub mod stealth;

pub use address::*;
pub use events::*;
pub use host::*;
pub use interface::*;
pub use node::*;
pub use stealth::*;
