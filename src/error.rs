use thiserror::Error;

use crate::domain::adapter::Notation;
use crate::domain::cpf::id::{EdgeId, NetId, NodeId};
use crate::domain::validation::Violation;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON document: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Malformed {notation} document: {reason}")]
    MalformedDocument { notation: Notation, reason: String },

    #[error("Node '{node}' in net '{net}' still has {} incident edge(s)", .edges.len())]
    DanglingEdge { net: NetId, node: NodeId, edges: Vec<EdgeId> },

    #[error("Node '{node}' does not exist in net '{net}'")]
    UnknownNode { net: NetId, node: NodeId },

    #[error("Edge '{edge}' does not exist in net '{net}'")]
    UnknownEdge { net: NetId, edge: EdgeId },

    #[error("Identifier '{id}' is already used in net '{net}'")]
    DuplicateId { net: NetId, id: String },

    #[error("{notation} cannot express {construct}")]
    UnsupportedConstruct { notation: Notation, construct: String },

    #[error("Canonical net failed structural validation with {} violation(s)", .0.len())]
    StructuralViolations(Vec<Violation>),

    #[error("Translation lost fidelity: {0}")]
    FidelityLoss(String),
}

impl Error {
    pub fn malformed(notation: Notation, reason: impl Into<String>) -> Self {
        Error::MalformedDocument { notation, reason: reason.into() }
    }

    pub fn unsupported(notation: Notation, construct: impl Into<String>) -> Self {
        Error::UnsupportedConstruct { notation, construct: construct.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
