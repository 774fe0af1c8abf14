//! Public resolver
//!
//! General-purpose record holder. Besides the node's owner and that owner's
//! operators, an owner may authorise further writers for a single node,
//! which is how a forwarding resolver is allowed to write through.

use crate::errors::*;
use crate::probe::resolve_implementer;
use crate::records::RecordBook;
use crate::traits::RecordResolver;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use umbra_directory::Directory;
use umbra_types::{Address, CallError, Contract, Host, InterfaceId, LedgerEvent, Node};

pub struct PublicResolver {
    address: Address,
    host: Arc<Host>,
    directory: Arc<dyn Directory>,
    records: RecordBook,
    /// (node, granting owner, target) → authorised
    authorisations: RwLock<HashMap<(Node, Address, Address), bool>>,
}

impl PublicResolver {
    pub fn deploy(host: Arc<Host>, directory: Arc<dyn Directory>) -> Arc<Self> {
        let resolver = Arc::new(Self {
            address: host.allocate_address(),
            host: host.clone(),
            directory,
            records: RecordBook::new(),
            authorisations: RwLock::new(HashMap::new()),
        });
        host.install(&resolver);
        debug!(target: "resolver", "Deployed public resolver at {}", resolver.address);
        resolver
    }

    /// Let `target` write this node's records on behalf of `caller`.
    ///
    /// The grant is keyed by the granting address, so it only has effect
    /// while that address owns the node.
    pub fn set_authorisation(
        &self,
        caller: Address,
        node: Node,
        target: Address,
        authorised: bool,
    ) -> Result<()> {
        self.host.atomic(|| -> Result<()> {
            self.authorisations
                .write()
                .insert((node, caller, target), authorised);
            self.host.emit(LedgerEvent::AuthorisationChanged {
                node,
                owner: caller,
                target,
                authorised,
            });
            debug!(
                target: "resolver",
                "Authorisation of {} on {} by {} set to {}",
                target,
                node,
                caller,
                authorised
            );
            Ok(())
        })
    }

    pub fn authorisation(&self, node: &Node, owner: &Address, target: &Address) -> bool {
        self.host.view(|| {
            self.authorisations
                .read()
                .get(&(*node, *owner, *target))
                .copied()
                .unwrap_or(false)
        })
    }

    fn is_authorised(&self, node: &Node, caller: &Address) -> bool {
        if self.directory.is_authorised(node, caller) {
            return true;
        }
        let owner = self.directory.owner(node);
        self.authorisation(node, &owner, caller)
    }

    fn guarded(&self, caller: Address, node: Node, write: impl FnOnce()) -> Result<()> {
        self.host.atomic(|| -> Result<()> {
            ensure_authorised(self.is_authorised(&node, &caller), &node, &caller)?;
            write();
            Ok(())
        })
    }
}

impl std::fmt::Debug for PublicResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublicResolver")
            .field("address", &self.address)
            .field("directory", &self.directory.address())
            .finish()
    }
}

impl Contract for PublicResolver {
    fn address(&self) -> Address {
        self.address
    }

    fn supports_interface(&self, interface_id: InterfaceId) -> std::result::Result<bool, CallError> {
        Ok(interface_id == InterfaceId::SUPPORTS_INTERFACE
            || interface_id == InterfaceId::ADDR
            || interface_id == InterfaceId::NAME
            || interface_id == InterfaceId::TEXT
            || interface_id == InterfaceId::interface_implementer())
    }
}

impl RecordResolver for PublicResolver {
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
