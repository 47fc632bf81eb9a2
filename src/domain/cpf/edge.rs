use crate::domain::cpf::id::{EdgeId, NodeId};
use crate::domain::cpf::node::Attributes;

/// Optional payload of a new edge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeAttributes {
    /// Guard evaluated when the source is an XOR/OR split.
    pub condition: Option<String>,
    /// Taken when no other condition holds.
    pub default: bool,
    pub attributes: Attributes,
}

impl EdgeAttributes {
    pub fn conditional(condition: impl Into<String>) -> Self {
        EdgeAttributes { condition: Some(condition.into()), ..Default::default() }
    }

    pub fn default_flow() -> Self {
        EdgeAttributes { default: true, ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub condition: Option<String>,
    pub default: bool,
    pub attributes: Attributes,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId, payload: EdgeAttributes) -> Self {
        Edge {
            id,
            source,
            target,
            condition: payload.condition,
            default: payload.default,
            attributes: payload.attributes,
        }
    }

    pub fn payload(&self) -> EdgeAttributes {
        EdgeAttributes { condition: self.condition.clone(), default: self.default, attributes: self.attributes.clone() }
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || &self.target == node
    }
}
