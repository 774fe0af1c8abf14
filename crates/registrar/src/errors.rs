//! Error types for the FIFS registrar

use std::fmt;
use thiserror::Error;
use umbra_directory::DirectoryError;
use umbra_resolver::ResolverError;
use umbra_types::{LabelError, Node};

/// Bootstrap step that runs after the registrar has taken the child node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStep {
    ClaimNode,
    AssignResolver,
    SeedStealthKeys,
    TransferOwnership,
}

impl fmt::Display for BootstrapStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            BootstrapStep::ClaimNode => "claiming the node",
            BootstrapStep::AssignResolver => "assigning the resolver",
            BootstrapStep::SeedStealthKeys => "seeding stealth keys",
            BootstrapStep::TransferOwnership => "transferring ownership",
        };
        f.write_str(step)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapFault {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrarError {
    #[error("Name already registered: {node}")]
    AlreadyRegistered { node: Node },

    #[error("Invalid label: {0}")]
    InvalidLabel(#[from] LabelError),

    #[error("Cannot register {node} to the zero address")]
    InvalidOwner { node: Node },

    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    #[error("Registration of {node} rolled back, failed while {step}: {source}")]
    PartialBootstrapFailure {
        node: Node,
        step: BootstrapStep,
        #[source]
        source: BootstrapFault,
    },

    /// Like `PartialBootstrapFailure`, but some steps could not be undone and
    /// their effects are still in place.
    #[error("Registration of {node} failed while {step} and rollback left {unrestored:?} applied: {source}")]
    RollbackIncomplete {
        node: Node,
        step: BootstrapStep,
        #[source]
        source: BootstrapFault,
        unrestored: Vec<BootstrapStep>,
    },
}

pub type Result<T> = std::result::Result<T, RegistrarError>;
