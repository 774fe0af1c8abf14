//! Record storage shared by the resolver variants.
//!
//! Books do no authorization; the owning resolver checks the caller first
//! and then writes through here, which also emits the change event.

use parking_lot::RwLock;
use std::collections::HashMap;
use umbra_types::{Address, Host, InterfaceId, LedgerEvent, Node, StealthKeys};

/// Address, name, text and interface records.
#[derive(Debug, Default)]
pub struct RecordBook {
    addrs: RwLock<HashMap<Node, Address>>,
    names: RwLock<HashMap<Node, String>>,
    texts: RwLock<HashMap<(Node, String), String>>,
    interfaces: RwLock<HashMap<(Node, InterfaceId), Address>>,
}

impl RecordBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn addr(&self, node: &Node) -> Address {
        self.addrs.read().get(node).copied().unwrap_or_default()
    }

    pub fn set_addr(&self, host: &Host, node: Node, addr: Address) {
        {
            let mut addrs = self.addrs.write();
            if addr.is_zero() {
                addrs.remove(&node);
            } else {
                addrs.insert(node, addr);
            }
        }
        host.emit(LedgerEvent::AddrChanged { node, addr });
    }

    pub fn name(&self, node: &Node) -> String {
        self.names.read().get(node).cloned().unwrap_or_default()
    }

    pub fn set_name(&self, host: &Host, node: Node, name: String) {
        {
            let mut names = self.names.write();
            if name.is_empty() {
                names.remove(&node);
            } else {
                names.insert(node, name.clone());
            }
        }
        host.emit(LedgerEvent::NameChanged { node, name });
    }

    pub fn text(&self, node: &Node, key: &str) -> String {
        self.texts
            .read()
            .get(&(*node, key.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn set_text(&self, host: &Host, node: Node, key: String, value: String) {
        {
            let mut texts = self.texts.write();
            if value.is_empty() {
                texts.remove(&(node, key.clone()));
            } else {
                texts.insert((node, key.clone()), value);
            }
        }
        host.emit(LedgerEvent::TextChanged { node, key });
    }

    /// Explicitly registered implementer only; no fallback.
    pub fn interface(&self, node: &Node, interface_id: InterfaceId) -> Address {
        self.interfaces
            .read()
            .get(&(*node, interface_id))
            .copied()
            .unwrap_or_default()
    }

    pub fn set_interface(
        &self,
        host: &Host,
        node: Node,
        interface_id: InterfaceId,
        implementer: Address,
    ) {
        {
            let mut interfaces = self.interfaces.write();
            if implementer.is_zero() {
                interfaces.remove(&(node, interface_id));
            } else {
                interfaces.insert((node, interface_id), implementer);
            }
        }
        host.emit(LedgerEvent::InterfaceChanged {
            node,
            interface_id,
            implementer,
        });
    }
}

/// Stealth key records. One tuple per node, replaced whole on every write.
#[derive(Debug, Default)]
pub struct StealthKeyBook {
    keys: RwLock<HashMap<Node, StealthKeys>>,
}

impl StealthKeyBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: &Node) -> StealthKeys {
        self.keys.read().get(node).copied().unwrap_or_default()
    }

    pub fn set(&self, host: &Host, node: Node, keys: StealthKeys) {
        {
            let mut book = self.keys.write();
            if keys.is_unset() {
                book.remove(&node);
            } else {
                book.insert(node, keys);
            }
        }
        host.emit(LedgerEvent::StealthKeyChanged { node, keys });
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}
