//! Serializing execution host.
//!
//! Every public operation of the directory, resolvers and registrar runs
//! inside the host's re-entrant call lock, so no two calls interleave and a
//! call that nests into another component simply re-enters. The host also
//! keeps the table of deployed contracts (anything absent from it is a plain
//! account) and an event journal that forgets the events of failed calls.

use crate::node::keccak256;
use crate::{Address, InterfaceId, LedgerEvent, Node, ADDRESS_BYTES};
use parking_lot::{ReentrantMutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::trace;

/// Failure of a call into another deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    #[error("no contract deployed at {target}")]
    NoCode { target: Address },
    #[error("contract at {target} has no supportsInterface entry point")]
    MissingEntryPoint { target: Address },
    #[error("call to {target} reverted: {reason}")]
    Reverted { target: Address, reason: String },
}

/// Anything deployed on the host.
pub trait Contract: Send + Sync {
    fn address(&self) -> Address;

    /// Capability query. Contracts that do not expose one keep this default.
    fn supports_interface(&self, _interface_id: InterfaceId) -> Result<bool, CallError> {
        Err(CallError::MissingEntryPoint {
            target: self.address(),
        })
    }
}

#[derive(Default)]
pub struct Host {
    call_lock: ReentrantMutex<()>,
    contracts: RwLock<HashMap<Address, Weak<dyn Contract>>>,
    events: RwLock<Vec<LedgerEvent>>,
    deploy_nonce: AtomicU64,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a state-changing call. If it fails, the events it emitted are dropped.
    pub fn atomic<T, E>(&self, call: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let _guard = self.call_lock.lock();
        let mark = self.events.read().len();
        let outcome = call();
        if outcome.is_err() {
            let mut events = self.events.write();
            trace!(target: "host", "discarding {} events of failed call", events.len() - mark);
            events.truncate(mark);
        }
        outcome
    }

    /// Run a read-only call.
    pub fn view<T>(&self, call: impl FnOnce() -> T) -> T {
        let _guard = self.call_lock.lock();
        call()
    }

    /// Reserve the address of the next contract to be deployed.
    pub fn allocate_address(&self) -> Address {
        let nonce = self.deploy_nonce.fetch_add(1, Ordering::SeqCst);
        const DOMAIN: &[u8] = b"umbra:deploy";
        let mut preimage = Vec::with_capacity(DOMAIN.len() + 8);
        preimage.extend_from_slice(DOMAIN);
        preimage.extend_from_slice(&nonce.to_be_bytes());
        let hash = keccak256(&preimage);
        let mut bytes = [0u8; ADDRESS_BYTES];
        bytes.copy_from_slice(&hash[32 - ADDRESS_BYTES..]);
        Address(bytes)
    }

    /// Make a deployed component reachable at its address.
    ///
    /// Only a weak reference is kept; once the last owner drops the component
    /// its address behaves like a plain account again.
    pub fn install<C: Contract + 'static>(&self, contract: &Arc<C>) {
        let address = contract.address();
        let weak: Weak<dyn Contract> = Arc::downgrade(contract) as Weak<dyn Contract>;
        self.contracts.write().insert(address, weak);
        trace!(target: "host", "installed contract at {}", address);
    }

    pub fn contract_at(&self, address: &Address) -> Option<Arc<dyn Contract>> {
        self.contracts.read().get(address).and_then(Weak::upgrade)
    }

    pub fn is_contract(&self, address: &Address) -> bool {
        self.contract_at(address).is_some()
    }

    /// Call `supportsInterface` on whatever lives at `target`.
    pub fn call_supports_interface(
        &self,
        target: &Address,
        interface_id: InterfaceId,
    ) -> Result<bool, CallError> {
        let contract = self
            .contract_at(target)
            .ok_or(CallError::NoCode { target: *target })?;
        self.view(|| contract.supports_interface(interface_id))
    }

    pub fn emit(&self, event: LedgerEvent) {
        trace!(target: "host", "event {:?}", event);
        self.events.write().push(event);
    }

    /// Every event emitted by successful calls, oldest first.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.read().clone()
    }

    pub fn events_for(&self, node: &Node) -> Vec<LedgerEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.node().as_ref() == Some(node))
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("contracts", &self.contracts.read().len())
            .field("events", &self.events.read().len())
            .field("deploy_nonce", &self.deploy_nonce.load(Ordering::SeqCst))
            .finish()
    }
}
