//! Error types for resolvers

use thiserror::Error;
use umbra_types::{Address, CallError, Node};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("Unauthorized: {caller} may not write records of {node}")]
    Unauthorized { node: Node, caller: Address },

    #[error("Upstream call to {target} failed: {reason}")]
    UpstreamCallFailed { target: Address, reason: String },
}

impl From<CallError> for ResolverError {
    fn from(err: CallError) -> Self {
        let target = match &err {
            CallError::NoCode { target }
            | CallError::MissingEntryPoint { target }
            | CallError::Reverted { target, .. } => *target,
        };
        ResolverError::UpstreamCallFailed {
            target,
            reason: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;

pub(crate) fn ensure_authorised(authorised: bool, node: &Node, caller: &Address) -> Result<()> {
    if authorised {
        Ok(())
    } else {
        Err(ResolverError::Unauthorized {
            node: *node,
            caller: *caller,
        })
    }
}
