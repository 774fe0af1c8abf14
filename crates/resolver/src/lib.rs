//! Record Resolvers for the Umbra Naming Registry
//!
//! Three resolvers share one record-access surface:
//! - [`PublicResolver`] holds generic records (address, name, text, interface)
//!   and lets owners authorise extra writers per node.
//! - [`StandaloneKeyResolver`] holds generic records and stealth keys itself.
//! - [`ForwardingKeyResolver`] holds only stealth keys and passes every other
//!   record read or write to an existing upstream resolver.

pub mod errors;
pub mod forwarding;
pub mod probe;
pub mod public;
pub mod records;
pub mod standalone;
pub mod traits;

pub use errors::*;
pub use forwarding::ForwardingKeyResolver;
pub use public::PublicResolver;
pub use records::{RecordBook, StealthKeyBook};
pub use standalone::StandaloneKeyResolver;
pub use traits::*;
