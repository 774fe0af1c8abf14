//! Change notifications emitted by the directory and resolvers.

use crate::{Address, InterfaceId, LabelHash, Node, StealthKeys};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    NewOwner {
        parent: Node,
        label: LabelHash,
        owner: Address,
    },
    Transfer {
        node: Node,
        owner: Address,
    },
    NewResolver {
        node: Node,
        resolver: Address,
    },
    ApprovalForAll {
        owner: Address,
        operator: Address,
        approved: bool,
    },
    AuthorisationChanged {
        node: Node,
        owner: Address,
        target: Address,
        authorised: bool,
    },
    AddrChanged {
        node: Node,
        addr: Address,
    },
    NameChanged {
        node: Node,
        name: String,
    },
    TextChanged {
        node: Node,
        key: String,
    },
    InterfaceChanged {
        node: Node,
        interface_id: InterfaceId,
        implementer: Address,
    },
    StealthKeyChanged {
        node: Node,
        keys: StealthKeys,
    },
}

impl LedgerEvent {
    /// Node the event refers to, if any.
    pub fn node(&self) -> Option<Node> {
        match self {
            LedgerEvent::NewOwner { parent, label, .. } => Some(parent.child(label)),
            LedgerEvent::Transfer { node, .. }
            | LedgerEvent::NewResolver { node, .. }
            | LedgerEvent::AuthorisationChanged { node, .. }
            | LedgerEvent::AddrChanged { node, .. }
            | LedgerEvent::NameChanged { node, .. }
            | LedgerEvent::TextChanged { node, .. }
            | LedgerEvent::InterfaceChanged { node, .. }
            | LedgerEvent::StealthKeyChanged { node, .. } => Some(*node),
            LedgerEvent::ApprovalForAll { .. } => None,
        }
    }
}
