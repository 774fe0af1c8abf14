//! Error types for the node directory

use thiserror::Error;
use umbra_types::{Address, LabelError, Node};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Unauthorized: {caller} is neither owner nor operator of {node}")]
    Unauthorized { node: Node, caller: Address },

    #[error("Invalid label: {0}")]
    InvalidLabel(#[from] LabelError),
}

pub type Result<T> = std::result::Result<T, DirectoryError>;
