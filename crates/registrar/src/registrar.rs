//! FIFS registrar implementation

use crate::errors::*;
use std::sync::Arc;
use tracing::{info, warn};
use umbra_directory::Directory;
use umbra_resolver::StealthKeyResolver;
use umbra_types::{Address, Contract, Host, LabelHash, Node, StealthKeys};

/// First-come-first-served registrar for the children of one parent node.
///
/// A child can be claimed only while its directory owner is zero. Once
/// claimed, the registrar never touches it again.
pub struct FifsRegistrar {
    address: Address,
    host: Arc<Host>,
    directory: Arc<dyn Directory>,
    parent: Node,
}

/// State captured before the bootstrap so a failure can put it back.
struct Checkpoint {
    child: Node,
    resolver: Option<Address>,
    keys: Option<(Arc<dyn StealthKeyResolver>, StealthKeys)>,
}

impl FifsRegistrar {
    pub fn deploy(host: Arc<Host>, directory: Arc<dyn Directory>, parent: Node) -> Arc<Self> {
        let registrar = Arc::new(Self {
            address: host.allocate_address(),
            host: host.clone(),
            directory,
            parent,
        });
        host.install(&registrar);
        info!(
            target: "registrar",
            "Deployed FIFS registrar at {} for {}",
            registrar.address,
            parent
        );
        registrar
    }

    /// Node whose children this registrar hands out.
    pub fn parent(&self) -> Node {
        self.parent
    }

    pub fn child_node(&self, label: &str) -> Result<Node> {
        let label = LabelHash::from_label(label)?;
        Ok(self.directory.child_node(&self.parent, &label))
    }

    /// Whether `label` is still unclaimed.
    pub fn is_available(&self, label: &str) -> Result<bool> {
        let child = self.child_node(label)?;
        Ok(self.host.view(|| !self.directory.record_exists(&child)))
    }

    /// Claim `label` for `new_owner`.
    pub fn register(&self, label: &str, new_owner: Address) -> Result<Node> {
        self.host.atomic(|| -> Result<Node> {
            let (label_hash, child) = self.claimable(label, new_owner)?;
            self.directory
                .set_subnode_owner(self.address, self.parent, label_hash, new_owner)?;
            info!(
                target: "registrar",
                "Registered {} ({}) to {}",
                label,
                child,
                new_owner
            );
            Ok(child)
        })
    }

    /// Claim `label` for `new_owner` with `resolver` assigned and `keys` seeded.
    ///
    /// The registrar holds the child itself while it writes the resolver
    /// pointer and keys, then hands it to `new_owner`. If anything after the
    /// initial claim fails, every earlier step is undone and the child is
    /// left unowned. Steps that could not be undone are listed in
    /// [`RegistrarError::RollbackIncomplete`].
    pub fn register_with_keys(
        &self,
        label: &str,
        new_owner: Address,
        resolver: Arc<dyn StealthKeyResolver>,
        keys: StealthKeys,
    ) -> Result<Node> {
        self.host.atomic(|| -> Result<Node> {
            let (label_hash, child) = self.claimable(label, new_owner)?;
            self.directory
                .set_subnode_owner(self.address, self.parent, label_hash, self.address)?;

            let mut checkpoint = Checkpoint {
                child,
                resolver: None,
                keys: None,
            };

            let previous_resolver = self.directory.resolver(&child);
            self.directory
                .set_resolver(self.address, child, resolver.address())
                .map_err(|err| self.abort(&checkpoint, BootstrapStep::AssignResolver, err.into()))?;
            checkpoint.resolver = Some(previous_resolver);

            let previous_keys = resolver.stealth_keys(&child);
            resolver
                .set_stealth_keys(self.address, child, keys)
                .map_err(|err| self.abort(&checkpoint, BootstrapStep::SeedStealthKeys, err.into()))?;
            checkpoint.keys = Some((resolver.clone(), previous_keys));

            self.directory
                .set_owner(self.address, child, new_owner)
                .map_err(|err| {
                    self.abort(&checkpoint, BootstrapStep::TransferOwnership, err.into())
                })?;

            info!(
                target: "registrar",
                "Registered {} ({}) to {} with resolver {}",
                label,
                child,
                new_owner,
                resolver.address()
            );
            Ok(child)
        })
    }

    /// A zero owner would leave the child unclaimed, so it is refused.
    fn claimable(&self, label: &str, new_owner: Address) -> Result<(LabelHash, Node)> {
        let label_hash = LabelHash::from_label(label)?;
        let child = self.directory.child_node(&self.parent, &label_hash);
        if new_owner.is_zero() {
            return Err(RegistrarError::InvalidOwner { node: child });
        }
        if self.directory.record_exists(&child) {
            return Err(RegistrarError::AlreadyRegistered { node: child });
        }
        Ok((label_hash, child))
    }

    /// Undo completed bootstrap steps in reverse order and build the error.
    fn abort(&self, checkpoint: &Checkpoint, step: BootstrapStep, fault: BootstrapFault) -> RegistrarError {
        let child = checkpoint.child;
        warn!(
            target: "registrar",
            "Bootstrap of {} failed while {}: {}; rolling back",
            child,
            step,
            fault
        );

        let mut unrestored = Vec::new();
        if let Some((resolver, previous)) = &checkpoint.keys {
            if let Err(err) = resolver.set_stealth_keys(self.address, child, *previous) {
                warn!(target: "registrar", "Could not restore stealth keys of {}: {}", child, err);
                unrestored.push(BootstrapStep::SeedStealthKeys);
            }
        }
        if let Some(previous) = checkpoint.resolver {
            if let Err(err) = self.directory.set_resolver(self.address, child, previous) {
                warn!(target: "registrar", "Could not restore resolver of {}: {}", child, err);
                unrestored.push(BootstrapStep::AssignResolver);
            }
        }
        if let Err(err) = self.directory.set_owner(self.address, child, Address::ZERO) {
            warn!(target: "registrar", "Could not release {}: {}", child, err);
            unrestored.push(BootstrapStep::ClaimNode);
        }

        if unrestored.is_empty() {
            RegistrarError::PartialBootstrapFailure {
                node: child,
                step,
                source: fault,
            }
        } else {
            RegistrarError::RollbackIncomplete {
                node: child,
                step,
                source: fault,
                unrestored,
            }
        }
    }
}

impl std::fmt::Debug for FifsRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifsRegistrar")
            .field("address", &self.address)
            .field("directory", &self.directory.address())
            .field("parent", &self.parent)
            .finish()
    }
}

impl Contract for FifsRegistrar {
    fn address(&self) -> Address {
        self.address
    }
}
