//! Structural well-formedness of canonical nets.
//!
//! Validation never mutates the net and always terminates. Violations are collected,
//! not raised: a net with violations can still be inspected, only rendering refuses it.

mod validator;

use std::fmt;

use thiserror::Error;

use crate::domain::cpf::{EdgeId, Net, NetId, NodeId};

pub use validator::validate_net;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    #[error("edge '{edge}' references missing node '{missing}'")]
    DanglingEdge { edge: EdgeId, missing: NodeId },

    #[error("node '{node}' has no incoming or outgoing edges")]
    OrphanNode { node: NodeId },

    #[error("gateway '{node}' has {incoming} incoming and {outgoing} outgoing edge(s)")]
    UnbalancedGateway { node: NodeId, incoming: usize, outgoing: usize },

    #[error("{} node(s) are not connected to the rest of the net", .nodes.len())]
    DisconnectedSubgraph { nodes: Vec<NodeId> },

    #[error("cycle through {} node(s) is not a structured loop", .nodes.len())]
    InvalidCycle { nodes: Vec<NodeId> },

    #[error("node '{node}' refers to unknown {reference}")]
    UnresolvedReference { node: NodeId, reference: String },
}

/// A broken invariant, tagged with the net it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub net: NetId,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.net, self.kind)
    }
}

/// `Ok` or the non-empty, ordered list of violations.
pub type ValidationResult = Result<(), Vec<Violation>>;

/// Validates `net` and, recursively, all of its sub-nets.
///
/// Within a net the checks run in a fixed order: dangling edges, orphan nodes, gateway
/// balance, connectivity, cycles, then references to cancelled nodes and sub-nets.
/// Sub-net references are resolved against `net` as the root of the hierarchy.
pub fn validate(net: &Net) -> ValidationResult {
    let mut violations = Vec::new();
    collect(net, net, &mut violations);

    if violations.is_empty() {
        Ok(())
    } else {
        log::debug!("Net '{}' has {} violation(s)", net.id, violations.len());
        Err(violations)
    }
}

fn collect(root: &Net, net: &Net, violations: &mut Vec<Violation>) {
    violations.extend(validate_net(root, net).into_iter().map(|kind| Violation { net: net.id.clone(), kind }));
    for subnet in net.subnets() {
        collect(root, subnet, violations);
    }
}
