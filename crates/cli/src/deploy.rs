//! Scripted deployment of a full registry onto an in-memory host.
//!
//! Every step is written to `<dir>/<network>-<timestamp>.json` as it
//! happens. A run that completes is copied to `<dir>/<network>-latest.json`;
//! a failed run records its error under `actions.Error` instead.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use umbra_directory::{Directory, MemoryDirectory};
use umbra_registrar::FifsRegistrar;
use umbra_resolver::{ForwardingKeyResolver, PublicResolver, StandaloneKeyResolver};
use umbra_types::{Address, Contract, Host, LabelHash, Node, StealthKeys};

use crate::config::CliConfig;

/// Contents of a deploy history file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployRecord {
    pub admin: Option<Address>,
    pub contracts: BTreeMap<String, Address>,
    pub actions: BTreeMap<String, String>,
}

/// Deploy history writer.
#[derive(Debug)]
pub struct DeployHistory {
    path: PathBuf,
    latest_path: PathBuf,
    record: DeployRecord,
}

impl DeployHistory {
    pub fn create(dir: &Path, network: &str, timestamp: &str) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create deploy history dir {}", dir.display()))?;
        Ok(Self {
            path: dir.join(format!("{network}-{timestamp}.json")),
            latest_path: dir.join(format!("{network}-latest.json")),
            record: DeployRecord::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn latest_path(&self) -> &Path {
        &self.latest_path
    }

    pub fn record(&self) -> &DeployRecord {
        &self.record
    }

    pub fn set_admin(&mut self, admin: Address) -> Result<()> {
        self.record.admin = Some(admin);
        self.save()
    }

    pub fn contract(&mut self, name: &str, address: Address) -> Result<()> {
        self.record.contracts.insert(name.to_string(), address);
        self.save()
    }

    pub fn action(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.record.actions.insert(name.to_string(), value.into());
        self.save()
    }

    /// Publish the completed run as the network's latest deployment.
    pub fn finish(&self) -> Result<()> {
        write_json(&self.latest_path, &self.record)
    }

    fn save(&self) -> Result<()> {
        write_json(&self.path, &self.record)
    }
}

fn write_json(path: &Path, record: &DeployRecord) -> Result<()> {
    let json = serde_json::to_string_pretty(record)?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// One key-seeding registration to perform after deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub label: String,
    pub owner: Address,
    pub keys: StealthKeys,
}

/// Handles to everything a deployment created.
#[derive(Debug)]
pub struct Deployment {
    pub host: Arc<Host>,
    pub admin: Address,
    pub parent: Node,
    pub directory: Arc<MemoryDirectory>,
    pub public_resolver: Arc<PublicResolver>,
    pub forwarding_resolver: Arc<ForwardingKeyResolver>,
    pub standalone_resolver: Arc<StandaloneKeyResolver>,
    pub registrar: Arc<FifsRegistrar>,
    pub registered: Option<Node>,
}

/// Run a deployment and record it under the configured history directory.
pub fn execute(
    config: &CliConfig,
    registration: Option<&Registration>,
    timestamp: &str,
) -> Result<Deployment> {
    let mut history =
        DeployHistory::create(&config.deploy_history_dir, &config.network, timestamp)?;

    match deploy(config, registration, &mut history) {
        Ok(deployment) => {
            history.finish()?;
            info!(
                target: "deploy",
                "Deployment recorded in {}",
                history.latest_path().display()
            );
            Ok(deployment)
        }
        Err(err) => {
            error!(target: "deploy", "Deployment error: {:#}", err);
            history.action("Error", format!("{err:#}"))?;
            Err(err)
        }
    }
}

fn deploy(
    config: &CliConfig,
    registration: Option<&Registration>,
    history: &mut DeployHistory,
) -> Result<Deployment> {
    info!(target: "deploy", "Deploying to {}", config.network);
    history.action("DeployingContractsToNetwork", config.network.as_str())?;

    let host = Arc::new(Host::new());
    let admin = host.allocate_address();
    history.set_admin(admin)?;

    let directory = MemoryDirectory::deploy(host.clone(), admin);
    history.contract("Directory", directory.address())?;

    let public_resolver = PublicResolver::deploy(host.clone(), directory.clone());
    history.contract("PublicResolver", public_resolver.address())?;

    let forwarding_resolver = ForwardingKeyResolver::deploy(
        host.clone(),
        directory.clone(),
        public_resolver.clone(),
    );
    history.contract("ForwardingKeyResolver", forwarding_resolver.address())?;

    let standalone_resolver = StandaloneKeyResolver::deploy(host.clone(), directory.clone());
    history.contract("StandaloneKeyResolver", standalone_resolver.address())?;

    let parent = claim_name(directory.as_ref(), admin, &config.parent_name)?;
    history.action("AssignedParent", format!("{} {}", config.parent_name, parent))?;

    let registrar = FifsRegistrar::deploy(host.clone(), directory.clone(), parent);
    history.contract("FifsRegistrar", registrar.address())?;

    directory.set_approval_for_all(admin, registrar.address(), true)?;
    history.action("ApprovedRegistrar", registrar.address().to_string())?;

    let registered = match registration {
        Some(request) => {
            let node = registrar
                .register_with_keys(
                    &request.label,
                    request.owner,
                    standalone_resolver.clone(),
                    request.keys,
                )
                .with_context(|| format!("failed to register {:?}", request.label))?;
            history.action(
                "Registered",
                format!("{}.{} {} {}", request.label, config.parent_name, node, request.owner),
            )?;
            Some(node)
        }
        None => None,
    };

    Ok(Deployment {
        host,
        admin,
        parent,
        directory,
        public_resolver,
        forwarding_resolver,
        standalone_resolver,
        registrar,
        registered,
    })
}

/// Assign every label of `name` to `owner`, starting below the root.
fn claim_name(directory: &dyn Directory, owner: Address, name: &str) -> Result<Node> {
    let mut node = Node::ROOT;
    for label in name.rsplit('.') {
        let label = LabelHash::from_label(label)
            .with_context(|| format!("invalid name {name:?}"))?;
        node = directory.set_subnode_owner(owner, node, label, owner)?;
    }
    Ok(node)
}
