//! Directory contract and its in-memory implementation

use crate::errors::*;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use umbra_types::{Address, Contract, Host, LabelHash, LedgerEvent, Node};

/// The naming tree as seen by resolvers and registrars.
///
/// Writes take the calling address explicitly and fail with
/// [`DirectoryError::Unauthorized`] unless the caller owns the node (the
/// parent, for [`Directory::set_subnode_owner`]) or is an approved operator
/// of that owner.
pub trait Directory: Contract {
    /// Current owner, zero if the node was never claimed.
    fn owner(&self, node: &Node) -> Address;

    /// Resolver pointer, zero if unset.
    fn resolver(&self, node: &Node) -> Address;

    fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool;

    fn set_owner(&self, caller: Address, node: Node, owner: Address) -> Result<()>;

    /// Assign the owner of `parent`'s child `label`, returning the child node.
    fn set_subnode_owner(
        &self,
        caller: Address,
        parent: Node,
        label: LabelHash,
        owner: Address,
    ) -> Result<Node>;

    fn set_resolver(&self, caller: Address, node: Node, resolver: Address) -> Result<()>;

    /// Grant or revoke blanket rights over all of `caller`'s nodes.
    fn set_approval_for_all(&self, caller: Address, operator: Address, approved: bool)
        -> Result<()>;

    fn record_exists(&self, node: &Node) -> bool {
        !self.owner(node).is_zero()
    }

    fn child_node(&self, parent: &Node, label: &LabelHash) -> Node {
        parent.child(label)
    }

    /// Owner-or-operator check, evaluated against current state on every call.
    fn is_authorised(&self, node: &Node, caller: &Address) -> bool {
        if caller.is_zero() {
            return false;
        }
        let owner = self.owner(node);
        owner == *caller || self.is_approved_for_all(&owner, caller)
    }
}

/// Per-node directory entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeRecord {
    pub owner: Address,
    pub resolver: Address,
}

/// In-memory directory
///
/// The deployer owns the root node; everything else is handed out from there.
#[derive(Debug)]
pub struct MemoryDirectory {
    address: Address,
    host: Arc<Host>,
    /// Node → owner / resolver
    records: RwLock<HashMap<Node, NodeRecord>>,
    /// Owner → approved operators
    operators: RwLock<HashMap<Address, HashSet<Address>>>,
}

impl MemoryDirectory {
    /// Deploy a directory on `host` with `root_owner` owning the root node.
    pub fn deploy(host: Arc<Host>, root_owner: Address) -> Arc<Self> {
        let mut records = HashMap::new();
        records.insert(
            Node::ROOT,
            NodeRecord {
                owner: root_owner,
                resolver: Address::ZERO,
            },
        );

        let directory = Arc::new(Self {
            address: host.allocate_address(),
            host: host.clone(),
            records: RwLock::new(records),
            operators: RwLock::new(HashMap::new()),
        });
        host.install(&directory);
        debug!(
            target: "directory",
            "Deployed directory at {} with root owner {}",
            directory.address,
            root_owner
        );
        directory
    }

    /// Full entry for a node, default if never written.
    pub fn record(&self, node: &Node) -> NodeRecord {
        self.host
            .view(|| self.records.read().get(node).copied().unwrap_or_default())
    }

    fn ensure_authorised(&self, node: &Node, caller: &Address) -> Result<()> {
        if self.is_authorised(node, caller) {
            Ok(())
        } else {
            Err(DirectoryError::Unauthorized {
                node: *node,
                caller: *caller,
            })
        }
    }

    fn write_owner(&self, node: Node, owner: Address) {
        self.records.write().entry(node).or_default().owner = owner;
    }
}

impl Contract for MemoryDirectory {
    fn address(&self) -> Address {
        self.address
    }
}

impl Directory for MemoryDirectory {
    fn owner(&self, node: &Node) -> Address {
        self.host.view(|| {
            self.records
                .read()
                .get(node)
                .map(|record| record.owner)
                .unwrap_or_default()
        })
    }

    fn resolver(&self, node: &Node) -> Address {
        self.host.view(|| {
            self.records
                .read()
                .get(node)
                .map(|record| record.resolver)
                .unwrap_or_default()
        })
    }

    fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.host.view(|| {
            self.operators
                .read()
                .get(owner)
                .is_some_and(|set| set.contains(operator))
        })
    }

    fn set_owner(&self, caller: Address, node: Node, owner: Address) -> Result<()> {
        self.host.atomic(|| -> Result<()> {
            self.ensure_authorised(&node, &caller)?;
            self.write_owner(node, owner);
            self.host.emit(LedgerEvent::Transfer { node, owner });
            debug!(target: "directory", "Node {} transferred to {}", node, owner);
            Ok(())
        })
    }

    fn set_subnode_owner(
        &self,
        caller: Address,
        parent: Node,
        label: LabelHash,
        owner: Address,
    ) -> Result<Node> {
        self.host.atomic(|| -> Result<Node> {
            self.ensure_authorised(&parent, &caller)?;
            let child = self.child_node(&parent, &label);
            self.write_owner(child, owner);
            self.host.emit(LedgerEvent::NewOwner {
                parent,
                label,
                owner,
            });
            debug!(
                target: "directory",
                "Subnode {} of {} assigned to {}",
                child,
                parent,
                owner
            );
            Ok(child)
        })
    }

    fn set_resolver(&self, caller: Address, node: Node, resolver: Address) -> Result<()> {
        self.host.atomic(|| -> Result<()> {
            self.ensure_authorised(&node, &caller)?;
            self.records.write().entry(node).or_default().resolver = resolver;
            self.host.emit(LedgerEvent::NewResolver { node, resolver });
            debug!(target: "directory", "Node {} resolver set to {}", node, resolver);
            Ok(())
        })
    }

    fn set_approval_for_all(
        &self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> Result<()> {
        self.host.atomic(|| -> Result<()> {
            {
                let mut operators = self.operators.write();
                let set = operators.entry(caller).or_default();
                if approved {
                    set.insert(operator);
                } else {
                    set.remove(&operator);
                }
            }
            self.host.emit(LedgerEvent::ApprovalForAll {
                owner: caller,
                operator,
                approved,
            });
            debug!(
                target: "directory",
                "Operator {} {} for {}",
                operator,
                if approved { "approved" } else { "revoked" },
                caller
            );
            Ok(())
        })
    }
}
