//! Resolver interfaces shared by every resolver variant.

use crate::errors::Result;
use umbra_types::{Address, Contract, InterfaceId, Node, StealthKeys};

/// Generic per-node records.
///
/// Reads return the zero value for anything unset. Writes take the calling
/// address and fail unless that caller may write the node's records.
pub trait RecordResolver: Contract {
    fn addr(&self, node: &Node) -> Result<Address>;

    fn set_addr(&self, caller: Address, node: Node, addr: Address) -> Result<()>;

    fn name(&self, node: &Node) -> Result<String>;

    fn set_name(&self, caller: Address, node: Node, name: String) -> Result<()>;

    fn text(&self, node: &Node, key: &str) -> Result<String>;

    fn set_text(&self, caller: Address, node: Node, key: String, value: String) -> Result<()>;

    /// Explicit implementer if set, otherwise the node's address record when
    /// that contract reports support for `interface_id`, otherwise zero.
    fn interface_implementer(&self, node: &Node, interface_id: InterfaceId) -> Result<Address>;

    fn set_interface(
        &self,
        caller: Address,
        node: Node,
        interface_id: InterfaceId,
        implementer: Address,
    ) -> Result<()>;
}

/// Resolver that also answers stealth key queries.
pub trait StealthKeyResolver: RecordResolver {
    /// All-zero for nodes that were never written.
    fn stealth_keys(&self, node: &Node) -> StealthKeys;

    /// Replace all four fields at once.
    fn set_stealth_keys(&self, caller: Address, node: Node, keys: StealthKeys) -> Result<()>;
}
