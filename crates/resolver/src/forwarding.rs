//! Forwarding stealth key resolver
//!
//! Wraps an existing resolver that stays the source of truth for every
//! generic record. Only stealth keys are stored here. All other reads and
//! writes are passed to the upstream unchanged; writes are made as this
//! resolver, so the node's owner must have authorised it on the upstream.

use crate::errors::*;
use crate::probe::resolve_implementer;
use crate::records::StealthKeyBook;
use crate::traits::{RecordResolver, StealthKeyResolver};
use std::sync::Arc;
use tracing::debug;
use umbra_directory::Directory;
use umbra_types::{Address, CallError, Contract, Host, InterfaceId, Node, StealthKeys};

pub struct ForwardingKeyResolver {
    address: Address,
    host: Arc<Host>,
    directory: Arc<dyn Directory>,
    upstream: Arc<dyn RecordResolver>,
    keys: StealthKeyBook,
}

impl ForwardingKeyResolver {
    pub fn deploy(
        host: Arc<Host>,
        directory: Arc<dyn Directory>,
        upstream: Arc<dyn RecordResolver>,
    ) -> Arc<Self> {
        let resolver = Arc::new(Self {
            address: host.allocate_address(),
            host: host.clone(),
            directory,
            upstream,
            keys: StealthKeyBook::new(),
        });
        host.install(&resolver);
        debug!(
            target: "resolver",
            "Deployed forwarding key resolver at {} over {}",
            resolver.address,
            resolver.upstream.address()
        );
        resolver
    }

    pub fn upstream(&self) -> &Arc<dyn RecordResolver> {
        &self.upstream
    }

    /// Check our own caller, then hand the write to the upstream as ourselves.
    fn forward(
        &self,
        caller: Address,
        node: Node,
        write: impl FnOnce(&dyn RecordResolver, Address) -> Result<()>,
    ) -> Result<()> {
        self.host.atomic(|| -> Result<()> {
            ensure_authorised(self.directory.is_authorised(&node, &caller), &node, &caller)?;
            write(self.upstream.as_ref(), self.address)
        })
    }
}

impl std::fmt::Debug for ForwardingKeyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForwardingKeyResolver")
            .field("address", &self.address)
            .field("upstream", &self.upstream.address())
            .field("stealth_records", &self.keys.len())
            .finish()
    }
}

impl Contract for ForwardingKeyResolver {
    fn address(&self) -> Address {
        self.address
    }

    fn supports_interface(&self, interface_id: InterfaceId) -> std::result::Result<bool, CallError> {
        if interface_id == InterfaceId::SUPPORTS_INTERFACE
            || interface_id == InterfaceId::stealth_keys()
        {
            return Ok(true);
        }
        self.upstream.supports_interface(interface_id)
    }
}

impl RecordResolver for ForwardingKeyResolver {
    fn addr(&self, node: &Node) -> Result<Address> {
        self.upstream.addr(node)
    }

    fn set_addr(&self, caller: Address, node: Node, addr: Address) -> Result<()> {
        self.forward(caller, node, |upstream, me| upstream.set_addr(me, node, addr))
    }

    fn name(&self, node: &Node) -> Result<String> {
        self.upstream.name(node)
    }

    fn set_name(&self, caller: Address, node: Node, name: String) -> Result<()> {
        self.forward(caller, node, |upstream, me| upstream.set_name(me, node, name))
    }

    fn text(&self, node: &Node, key: &str) -> Result<String> {
        self.upstream.text(node, key)
    }

    fn set_text(&self, caller: Address, node: Node, key: String, value: String) -> Result<()> {
        self.forward(caller, node, |upstream, me| {
            upstream.set_text(me, node, key, value)
        })
    }

    fn interface_implementer(&self, node: &Node, interface_id: InterfaceId) -> Result<Address> {
        let explicit = self.upstream.interface_implementer(node, interface_id)?;
        Ok(self.host.view(|| {
            resolve_implementer(&self.host, explicit, interface_id, || {
                self.upstream.addr(node)
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
        self.forward(caller, node, |upstream, me| {
            upstream.set_interface(me, node, interface_id, implementer)
        })
    }
}

impl StealthKeyResolver for ForwardingKeyResolver {
    fn stealth_keys(&self, node: &Node) -> StealthKeys {
        self.host.view(|| self.keys.get(node))
    }

    fn set_stealth_keys(&self, caller: Address, node: Node, keys: StealthKeys) -> Result<()> {
        self.host.atomic(|| -> Result<()> {
            ensure_authorised(self.directory.is_authorised(&node, &caller), &node, &caller)?;
            self.keys.set(&self.host, node, keys);
            debug!(target: "resolver", "Stealth keys of {} updated by {}", node, caller);
            Ok(())
        })
    }
}
