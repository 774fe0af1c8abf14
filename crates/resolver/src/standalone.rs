//! Standalone stealth key resolver
//!
//! Owns every record it serves: stealth keys plus the generic address, name,
//! text and interface records. Writes are open to the node's owner and that
//! owner's approved operators only.

use crate::errors::*;
use crate::probe::resolve_implementer;
use crate::records::{RecordBook, StealthKeyBook};
use crate::traits::{RecordResolver, StealthKeyResolver};
use std::sync::Arc;
use tracing::debug;
use umbra_directory::Directory;
use umbra_types::{Address, CallError, Contract, Host, InterfaceId, Node, StealthKeys};

pub struct StandaloneKeyResolver {
    address: Address,
    host: Arc<Host>,
    directory: Arc<dyn Directory>,
    records: RecordBook,
    keys: StealthKeyBook,
}

impl StandaloneKeyResolver {
    pub fn deploy(host: Arc<Host>, directory: Arc<dyn Directory>) -> Arc<Self> {
        let resolver = Arc::new(Self {
            address: host.allocate_address(),
            host: host.clone(),
            directory,
            records: RecordBook::new(),
            keys: StealthKeyBook::new(),
        });
        host.install(&resolver);
        debug!(target: "resolver", "Deployed standalone key resolver at {}", resolver.address);
        resolver
    }

    fn guarded(&self, caller: Address, node: Node, write: impl FnOnce()) -> Result<()> {
        self.host.atomic(|| -> Result<()> {
            ensure_authorised(self.directory.is_authorised(&node, &caller), &node, &caller)?;
            write();
            Ok(())
        })
    }
}

impl std::fmt::Debug for StandaloneKeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandaloneKeyResolver")
            .field("address", &self.address)
            .field("directory", &self.directory.address())
            .field("stealth_records", &self.keys.len())
            .finish()
    }
}

impl Contract for StandaloneKeyResolver {
    fn address(&self) -> Address {
        self.address
    }

    fn supports_interface(&self, interface_id: InterfaceId) -> std::result::Result<bool, CallError> {
        Ok(interface_id == InterfaceId::SUPPORTS_INTERFACE
            || interface_id == InterfaceId::ADDR
            || interface_id == InterfaceId::NAME
            || interface_id == InterfaceId::TEXT
            || interface_id == InterfaceId::interface_implementer()
            || interface_id == InterfaceId::stealth_keys())
    }
}

impl RecordResolver for StandaloneKeyResolver {
    fn addr(&self, node: &Node) -> Result<Address> {
        Ok(self.host.view(|| self.records.addr(node)))
    }

    fn set_addr(&self, caller: Address, node: Node, addr: Address) -> Result<()> {
        self.guarded(caller, node, || self.records.set_addr(&self.host, node, addr))
    }

    fn name(&self, node: &Node) -> Result<String> {
        Ok(self.host.view(|| self.records.name(node)))
    }

    fn set_name(&self, caller: Address, node: Node, name: String) -> Result<()> {
        self.guarded(caller, node, || self.records.set_name(&self.host, node, name))
    }

    fn text(&self, node: &Node, key: &str) -> Result<String> {
        Ok(self.host.view(|| self.records.text(node, key)))
    }

    fn set_text(&self, caller: Address, node: Node, key: String, value: String) -> Result<()> {
        self.guarded(caller, node, || {
            self.records.set_text(&self.host, node, key, value)
        })
    }

    fn interface_implementer(&self, node: &Node, interface_id: InterfaceId) -> Result<Address> {
        Ok(self.host.view(|| {
            let explicit = self.records.interface(node, interface_id);
            resolve_implementer(&self.host, explicit, interface_id, || {
                Ok(self.records.addr(node))
            })
        }))
    }

    fn set_interface(
        &self,
        caller: Address,
        node: Node,
        interface_id: InterfaceId,
        implementer: Address,
    ) -> Result<()> {
        self.guarded(caller, node, || {
            self.records
                .set_interface(&self.host, node, interface_id, implementer)
        })
    }
}

impl StealthKeyResolver for StandaloneKeyResolver {
    fn stealth_keys(&self, node: &Node) -> StealthKeys {
        self.host.view(|| self.keys.get(node))
    }

    fn set_stealth_keys(&self, caller: Address, node: Node, keys: StealthKeys) -> Result<()> {
        self.guarded(caller, node, || {
            self.keys.set(&self.host, node, keys);
            debug!(target: "resolver", "Stealth keys of {} updated by {}", node, caller);
        })
    }
}
