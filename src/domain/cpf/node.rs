use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::cpf::id::{NetId, NodeId, ResourceId};

/// Free-form annotations carried by nodes and edges. Order is irrelevant.
pub type Attributes = HashMap<String, String>;

/// Whether a gateway fans control flow out or in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Split,
    Join,
}

/// Branching semantics of a canonical gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GatewayKind {
    /// All branches.
    And,
    /// Any non-empty subset of branches.
    Or,
    /// Exactly one branch, decided by data.
    Xor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Gateway {
    pub direction: Direction,
    pub kind: GatewayKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    Start,
    End,
    Intermediate,
}

/// Multiple-instance settings of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiInstance {
    pub min: u32,
    pub max: Option<u32>,
    pub threshold: Option<u32>,
    /// New instances may be added while the task runs.
    pub dynamic: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    /// Decomposition of a composite task.
    pub subnet: Option<NetId>,
    pub multi_instance: Option<MultiInstance>,
    /// Cancellation region: nodes withdrawn when this task completes.
    pub cancels: Vec<NodeId>,
}

/// The canonical node variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Task(Task),
    Event(EventKind),
    /// A place/condition. Fan-out of two or more races the branches (deferred choice).
    State,
    Gateway(Gateway),
}

impl NodeKind {
    pub fn task() -> Self {
        NodeKind::Task(Task::default())
    }

    pub fn split(kind: GatewayKind) -> Self {
        NodeKind::Gateway(Gateway { direction: Direction::Split, kind })
    }

    pub fn join(kind: GatewayKind) -> Self {
        NodeKind::Gateway(Gateway { direction: Direction::Join, kind })
    }

    pub fn as_task(&self) -> Option<&Task> {
        match self {
            NodeKind::Task(task) => Some(task),
            _ => None,
        }
    }

    pub fn as_gateway(&self) -> Option<Gateway> {
        match self {
            NodeKind::Gateway(gateway) => Some(*gateway),
            _ => None,
        }
    }

    pub fn is_state(&self) -> bool {
        matches!(self, NodeKind::State)
    }

    pub fn is_event(&self, kind: EventKind) -> bool {
        matches!(self, NodeKind::Event(k) if *k == kind)
    }

    /// A short, id-independent label used in structural signatures and log lines.
    pub fn label(&self) -> String {
        match self {
            NodeKind::Task(task) => {
                let mut label = "task".to_string();
                if task.subnet.is_some() {
                    label.push_str("+subnet");
                }
                if task.multi_instance.is_some() {
                    label.push_str("+mi");
                }
                if !task.cancels.is_empty() {
                    label.push_str(&format!("+cancels{}", task.cancels.len()));
                }
                label
            }
            NodeKind::Event(kind) => format!("event:{}", format!("{:?}", kind).to_lowercase()),
            NodeKind::State => "state".to_string(),
            NodeKind::Gateway(gateway) => format!(
                "{}:{}",
                format!("{:?}", gateway.direction).to_lowercase(),
                format!("{:?}", gateway.kind).to_lowercase()
            ),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub attributes: Attributes,
    pub resources: Vec<ResourceId>,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind, name: impl Into<String>, attributes: Attributes) -> Self {
        Node { id, name: name.into(), kind, attributes, resources: Vec::new() }
    }

    pub fn with_resources(mut self, resources: Vec<ResourceId>) -> Self {
        self.resources = resources;
        self
    }
}
