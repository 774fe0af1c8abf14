//! FIFS registration flows against a full in-memory deployment.
//!
//! Mirrors the production layout: `eth` owned by an admin, `umbra.eth`
//! owned by the namespace owner, subdomains claimed through the registrar.

use std::sync::Arc;
use umbra_directory::{Directory, DirectoryError, MemoryDirectory};
use umbra_registrar::{BootstrapFault, BootstrapStep, FifsRegistrar, RegistrarError};
use umbra_resolver::{
    ForwardingKeyResolver, PublicResolver, RecordResolver, ResolverError,
    StandaloneKeyResolver, StealthKeyResolver,
};
use umbra_types::{
    namehash, Address, CallError, Contract, Host, InterfaceId, LabelHash, LedgerEvent, Node,
    StealthKeys,
};

struct Deployment {
    host: Arc<Host>,
    directory: Arc<MemoryDirectory>,
    registrar: Arc<FifsRegistrar>,
    owner: Address,
    sub_owner: Address,
}

fn deploy() -> Deployment {
    let host = Arc::new(Host::new());
    let admin = Address::from_low_u64(1);
    let owner = Address::from_low_u64(2);
    let sub_owner = Address::from_low_u64(3);

    let directory = MemoryDirectory::deploy(host.clone(), admin);
    let eth = directory
        .set_subnode_owner(admin, Node::ROOT, LabelHash::from_label("eth").unwrap(), admin)
        .unwrap();
    assert_eq!(directory.owner(&eth), admin);

    let umbra = directory
        .set_subnode_owner(admin, eth, LabelHash::from_label("umbra").unwrap(), owner)
        .unwrap();
    assert_eq!(directory.owner(&umbra), owner);

    let registrar = FifsRegistrar::deploy(host.clone(), directory.clone(), umbra);

    Deployment {
        host,
        directory,
        registrar,
        owner,
        sub_owner,
    }
}

fn approve(d: &Deployment) {
    d.directory
        .set_approval_for_all(d.owner, d.registrar.address(), true)
        .unwrap();
    assert!(d
        .directory
        .is_approved_for_all(&d.owner, &d.registrar.address()));
}

fn keys() -> StealthKeys {
    StealthKeys::new(2, 10u64, 3, 20u64)
}

/// Resolver that refuses every stealth key write.
struct BrokenResolver(Address);

impl Contract for BrokenResolver {
    fn address(&self) -> Address {
        self.0
    }

    fn supports_interface(&self, _interface_id: InterfaceId) -> Result<bool, CallError> {
        Ok(false)
    }
}

impl RecordResolver for BrokenResolver {
    fn addr(&self, _node: &Node) -> umbra_resolver::Result<Address> {
        Ok(Address::ZERO)
    }

    fn set_addr(&self, _caller: Address, _node: Node, _addr: Address) -> umbra_resolver::Result<()> {
        Ok(())
    }

    fn name(&self, _node: &Node) -> umbra_resolver::Result<String> {
        Ok(String::new())
    }

    fn set_name(&self, _caller: Address, _node: Node, _name: String) -> umbra_resolver::Result<()> {
        Ok(())
    }

    fn text(&self, _node: &Node, _key: &str) -> umbra_resolver::Result<String> {
        Ok(String::new())
    }

    fn set_text(
        &self,
        _caller: Address,
        _node: Node,
        _key: String,
        _value: String,
    ) -> umbra_resolver::Result<()> {
        Ok(())
    }

    fn interface_implementer(
        &self,
        _node: &Node,
        _interface_id: InterfaceId,
    ) -> umbra_resolver::Result<Address> {
        Ok(Address::ZERO)
    }

    fn set_interface(
        &self,
        _caller: Address,
        _node: Node,
        _interface_id: InterfaceId,
        _implementer: Address,
    ) -> umbra_resolver::Result<()> {
        Ok(())
    }
}

impl StealthKeyResolver for BrokenResolver {
    fn stealth_keys(&self, _node: &Node) -> StealthKeys {
        StealthKeys::default()
    }

    fn set_stealth_keys(
        &self,
        _caller: Address,
        _node: Node,
        _keys: StealthKeys,
    ) -> umbra_resolver::Result<()> {
        Err(ResolverError::UpstreamCallFailed {
            target: self.0,
            reason: "storage offline".into(),
        })
    }
}

/// Directory that refuses non-zero `set_owner` transfers, and optionally
/// every `set_owner` at all.
struct StubbornDirectory {
    address: Address,
    inner: Arc<MemoryDirectory>,
    refuse_release: bool,
}

impl Contract for StubbornDirectory {
    fn address(&self) -> Address {
        self.address
    }
}

impl Directory for StubbornDirectory {
    fn owner(&self, node: &Node) -> Address {
        self.inner.owner(node)
    }

    fn resolver(&self, node: &Node) -> Address {
        self.inner.resolver(node)
    }

    fn is_approved_for_all(&self, owner: &Address, operator: &Address) -> bool {
        self.inner.is_approved_for_all(owner, operator)
    }

    fn set_owner(&self, caller: Address, node: Node, owner: Address) -> umbra_directory::Result<()> {
        if !owner.is_zero() || self.refuse_release {
            return Err(DirectoryError::Unauthorized { node, caller });
        }
        self.inner.set_owner(caller, node, owner)
    }

    fn set_subnode_owner(
        &self,
        caller: Address,
        parent: Node,
        label: LabelHash,
        owner: Address,
    ) -> umbra_directory::Result<Node> {
        self.inner.set_subnode_owner(caller, parent, label, owner)
    }

    fn set_resolver(&self, caller: Address, node: Node, resolver: Address) -> umbra_directory::Result<()> {
        self.inner.set_resolver(caller, node, resolver)
    }

    fn set_approval_for_all(
        &self,
        caller: Address,
        operator: Address,
        approved: bool,
    ) -> umbra_directory::Result<()> {
        self.inner.set_approval_for_all(caller, operator, approved)
    }
}

/// Registrar over a [`StubbornDirectory`], approved by the namespace owner.
fn stubborn_registrar(d: &Deployment, refuse_release: bool) -> Arc<FifsRegistrar> {
    let stubborn = Arc::new(StubbornDirectory {
        address: d.host.allocate_address(),
        inner: d.directory.clone(),
        refuse_release,
    });
    d.host.install(&stubborn);
    let registrar = FifsRegistrar::deploy(d.host.clone(), stubborn, d.registrar.parent());
    d.directory
        .set_approval_for_all(d.owner, registrar.address(), true)
        .unwrap();
    registrar
}

/// Leave `label` unowned but with a resolver pointer and keys from an
/// earlier owner.
fn seed_leftovers(
    d: &Deployment,
    label: &str,
    resolver: &StandaloneKeyResolver,
    leftover_resolver: Address,
    keys: StealthKeys,
) -> Node {
    let node = d
        .directory
        .set_subnode_owner(
            d.owner,
            d.registrar.parent(),
            LabelHash::from_label(label).unwrap(),
            d.owner,
        )
        .unwrap();
    resolver.set_stealth_keys(d.owner, node, keys).unwrap();
    d.directory
        .set_resolver(d.owner, node, leftover_resolver)
        .unwrap();
    d.directory.set_owner(d.owner, node, Address::ZERO).unwrap();
    node
}

#[test]
fn zero_owner_is_refused_by_both_variants() {
    let d = deploy();
    approve(&d);
    let resolver = StandaloneKeyResolver::deploy(d.host.clone(), d.directory.clone());
    let node = namehash("alice.umbra.eth").unwrap();
    let events_before = d.host.events().len();

    assert_eq!(
        d.registrar.register("alice", Address::ZERO),
        Err(RegistrarError::InvalidOwner { node })
    );
    assert_eq!(
        d.registrar
            .register_with_keys("alice", Address::ZERO, resolver.clone(), keys()),
        Err(RegistrarError::InvalidOwner { node })
    );

    assert_eq!(d.directory.owner(&node), Address::ZERO);
    assert_eq!(d.directory.resolver(&node), Address::ZERO);
    assert!(resolver.stealth_keys(&node).is_unset());
    assert_eq!(d.host.events().len(), events_before);

    // The next real claimant starts from a clean record.
    let bob = Address::from_low_u64(4);
    d.registrar.register("alice", bob).unwrap();
    assert_eq!(d.directory.owner(&node), bob);
    assert_eq!(d.directory.resolver(&node), Address::ZERO);
    assert!(resolver.stealth_keys(&node).is_unset());
}

#[test]
fn failed_transfer_restores_keys_and_resolver() {
    let d = deploy();
    let registrar = stubborn_registrar(&d, false);
    let resolver = StandaloneKeyResolver::deploy(d.host.clone(), d.directory.clone());
    let leftover_resolver = Address::from_low_u64(55);
    let leftover_keys = StealthKeys::new(3, 7u64, 2, 8u64);
    let node = seed_leftovers(&d, "mysubdomain", &resolver, leftover_resolver, leftover_keys);
    let events_before = d.host.events().len();

    let err = registrar
        .register_with_keys("mysubdomain", d.sub_owner, resolver.clone(), keys())
        .unwrap_err();
    match err {
        RegistrarError::PartialBootstrapFailure {
            node: failed,
            step,
            source,
        } => {
            assert_eq!(failed, node);
            assert_eq!(step, BootstrapStep::TransferOwnership);
            assert!(matches!(source, BootstrapFault::Directory(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(resolver.stealth_keys(&node), leftover_keys);
    assert_eq!(d.directory.resolver(&node), leftover_resolver);
    assert_eq!(d.directory.owner(&node), Address::ZERO);
    assert!(registrar.is_available("mysubdomain").unwrap());
    assert_eq!(d.host.events().len(), events_before);
}

#[test]
fn failed_release_is_reported_as_incomplete_rollback() {
    let d = deploy();
    let registrar = stubborn_registrar(&d, true);
    let resolver = StandaloneKeyResolver::deploy(d.host.clone(), d.directory.clone());
    let node = namehash("mysubdomain.umbra.eth").unwrap();

    let err = registrar
        .register_with_keys("mysubdomain", d.sub_owner, resolver.clone(), keys())
        .unwrap_err();
    assert_eq!(
        err,
        RegistrarError::RollbackIncomplete {
            node,
            step: BootstrapStep::TransferOwnership,
            source: BootstrapFault::Directory(DirectoryError::Unauthorized {
                node,
                caller: registrar.address(),
            }),
            unrestored: vec![BootstrapStep::ClaimNode],
        }
    );

    // Keys and resolver were put back; only the claim is still held.
    assert!(resolver.stealth_keys(&node).is_unset());
    assert_eq!(d.directory.resolver(&node), Address::ZERO);
    assert_eq!(d.directory.owner(&node), registrar.address());
}

#[test]
fn registration_requires_operator_approval() {
    let d = deploy();
    let err = d.registrar.register("mysubdomain", d.sub_owner).unwrap_err();
    assert!(matches!(err, RegistrarError::Directory(_)));

    let node = namehash("mysubdomain.umbra.eth").unwrap();
    assert_eq!(d.directory.owner(&node), Address::ZERO);
}

#[test]
fn first_claim_wins() {
    let d = deploy();
    approve(&d);
    let node = namehash("mysubdomain.umbra.eth").unwrap();

    let registered = d.registrar.register("mysubdomain", d.sub_owner).unwrap();
    assert_eq!(registered, node);
    assert_eq!(d.directory.owner(&node), d.sub_owner);

    let late = Address::from_low_u64(4);
    let err = d.registrar.register("mysubdomain", late).unwrap_err();
    assert_eq!(err, RegistrarError::AlreadyRegistered { node });
    assert_eq!(d.directory.owner(&node), d.sub_owner);
}

#[test]
fn claimed_name_cannot_be_reclaimed_by_its_owner() {
    let d = deploy();
    approve(&d);
    d.registrar.register("mysubdomain", d.sub_owner).unwrap();
    assert!(matches!(
        d.registrar.register("mysubdomain", d.sub_owner),
        Err(RegistrarError::AlreadyRegistered { .. })
    ));
}

#[test]
fn key_seeding_registration_sets_everything() {
    let d = deploy();
    approve(&d);
    let resolver = StandaloneKeyResolver::deploy(d.host.clone(), d.directory.clone());

    let node = d
        .registrar
        .register_with_keys("mysubdomain", d.sub_owner, resolver.clone(), keys())
        .unwrap();

    assert_eq!(d.directory.owner(&node), d.sub_owner);
    assert_eq!(d.directory.resolver(&node), resolver.address());
    assert_eq!(resolver.stealth_keys(&node), keys());

    // The registrar keeps no rights over the node it handed out.
    assert!(!d.directory.is_authorised(&node, &d.registrar.address()));
    resolver
        .set_stealth_keys(d.sub_owner, node, StealthKeys::new(3, 11u64, 2, 21u64))
        .unwrap();
}

#[test]
fn key_seeding_registration_with_forwarding_resolver() {
    let d = deploy();
    approve(&d);
    let upstream = PublicResolver::deploy(d.host.clone(), d.directory.clone());
    let resolver =
        ForwardingKeyResolver::deploy(d.host.clone(), d.directory.clone(), upstream.clone());

    let node = d
        .registrar
        .register_with_keys("mysubdomain", d.sub_owner, resolver.clone(), keys())
        .unwrap();

    assert_eq!(d.directory.resolver(&node), resolver.address());
    assert_eq!(resolver.stealth_keys(&node), keys());

    upstream
        .set_authorisation(d.sub_owner, node, resolver.address(), true)
        .unwrap();
    resolver
        .set_addr(d.sub_owner, node, d.sub_owner)
        .unwrap();
    assert_eq!(upstream.addr(&node).unwrap(), d.sub_owner);
}

#[test]
fn key_seeding_without_approval_changes_nothing() {
    let d = deploy();
    let resolver = StandaloneKeyResolver::deploy(d.host.clone(), d.directory.clone());
    let events_before = d.host.events().len();

    let err = d
        .registrar
        .register_with_keys("mysubdomain", d.sub_owner, resolver.clone(), keys())
        .unwrap_err();
    assert!(matches!(err, RegistrarError::Directory(_)));

    let node = namehash("mysubdomain.umbra.eth").unwrap();
    assert_eq!(d.directory.owner(&node), Address::ZERO);
    assert_eq!(d.directory.resolver(&node), Address::ZERO);
    assert!(resolver.stealth_keys(&node).is_unset());
    assert_eq!(d.host.events().len(), events_before);
}

#[test]
fn failed_key_seed_rolls_back_claim() {
    let d = deploy();
    approve(&d);
    let broken = Arc::new(BrokenResolver(d.host.allocate_address()));
    d.host.install(&broken);
    let events_before = d.host.events().len();

    let err = d
        .registrar
        .register_with_keys("mysubdomain", d.sub_owner, broken.clone(), keys())
        .unwrap_err();

    let node = namehash("mysubdomain.umbra.eth").unwrap();
    match err {
        RegistrarError::PartialBootstrapFailure {
            node: failed,
            step,
            source,
        } => {
            assert_eq!(failed, node);
            assert_eq!(step, BootstrapStep::SeedStealthKeys);
            assert!(matches!(source, BootstrapFault::Resolver(_)));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    assert_eq!(d.directory.owner(&node), Address::ZERO);
    assert_eq!(d.directory.resolver(&node), Address::ZERO);
    assert!(d.registrar.is_available("mysubdomain").unwrap());
    assert_eq!(d.host.events().len(), events_before);

    // A later, well-formed claim still succeeds.
    let resolver = StandaloneKeyResolver::deploy(d.host.clone(), d.directory.clone());
    d.registrar
        .register_with_keys("mysubdomain", d.sub_owner, resolver.clone(), keys())
        .unwrap();
    assert_eq!(d.directory.owner(&node), d.sub_owner);
}

#[test]
fn successful_registration_emits_bootstrap_events() {
    let d = deploy();
    approve(&d);
    let resolver = StandaloneKeyResolver::deploy(d.host.clone(), d.directory.clone());

    let node = d
        .registrar
        .register_with_keys("mysubdomain", d.sub_owner, resolver.clone(), keys())
        .unwrap();

    let events = d.host.events_for(&node);
    assert!(matches!(events.first(), Some(LedgerEvent::NewOwner { .. })));
    assert!(events.contains(&LedgerEvent::NewResolver {
        node,
        resolver: resolver.address(),
    }));
    assert!(events.contains(&LedgerEvent::StealthKeyChanged { node, keys: keys() }));
    assert_eq!(
        events.last(),
        Some(&LedgerEvent::Transfer {
            node,
            owner: d.sub_owner,
        })
    );
}

#[test]
fn revoking_approval_stops_registrations() {
    let d = deploy();
    approve(&d);
    d.registrar.register("first", d.sub_owner).unwrap();

    d.directory
        .set_approval_for_all(d.owner, d.registrar.address(), false)
        .unwrap();
    assert!(d.registrar.register("second", d.sub_owner).is_err());
    assert!(d.registrar.is_available("second").unwrap());
}
