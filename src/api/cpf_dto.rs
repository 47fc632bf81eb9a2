use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::cpf::{
    Direction, Edge, EdgeAttributes, EdgeId, EventKind, Gateway, GatewayKind, MultiInstance, Net, NetId, Node,
    NodeId, NodeKind, ResourceId, Task,
};
use crate::error::Error;

/// JSON carrier of a canonical net, sub-nets included.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CpfNetDto {
    pub id: String,
    #[serde(default)]
    pub name: String,

    pub nodes: Vec<CpfNodeDto>,
    pub edges: Vec<CpfEdgeDto>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<CpfNetDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CpfNodeDto {
    pub id: String,
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    pub kind: CpfNodeKindDto,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CpfNodeKindDto {
    #[serde(rename_all = "camelCase")]
    Task {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subnet: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        multi_instance: Option<MultiInstance>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cancels: Vec<String>,
    },
    Event {
        event: EventKind,
    },
    State,
    Gateway {
        direction: Direction,
        routing: GatewayKind,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CpfEdgeDto {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub default: bool,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
}

impl From<&Net> for CpfNetDto {
    fn from(net: &Net) -> Self {
        let nodes = net
            .nodes()
            .map(|node| CpfNodeDto {
                id: node.id.to_string(),
                name: node.name.clone(),
                kind: CpfNodeKindDto::from(&node.kind),
                attributes: node.attributes.clone(),
                resources: node.resources.iter().map(ToString::to_string).collect(),
            })
            .collect();

        let edges = net
            .edges()
            .map(|edge| CpfEdgeDto {
                id: edge.id.to_string(),
                source: edge.source.to_string(),
                target: edge.target.to_string(),
                condition: edge.condition.clone(),
                default: edge.default,
                attributes: edge.attributes.clone(),
            })
            .collect();

        CpfNetDto {
            id: net.id.to_string(),
            name: net.name.clone(),
            nodes,
            edges,
            subnets: net.subnets().iter().map(CpfNetDto::from).collect(),
        }
    }
}

impl From<&NodeKind> for CpfNodeKindDto {
    fn from(kind: &NodeKind) -> Self {
        match kind {
            NodeKind::Task(task) => CpfNodeKindDto::Task {
                subnet: task.subnet.as_ref().map(ToString::to_string),
                multi_instance: task.multi_instance.clone(),
                cancels: task.cancels.iter().map(ToString::to_string).collect(),
            },
            NodeKind::Event(event) => CpfNodeKindDto::Event { event: *event },
            NodeKind::State => CpfNodeKindDto::State,
            NodeKind::Gateway(gateway) => {
                CpfNodeKindDto::Gateway { direction: gateway.direction, routing: gateway.kind }
            }
        }
    }
}

impl From<CpfNodeKindDto> for NodeKind {
    fn from(dto: CpfNodeKindDto) -> Self {
        match dto {
            CpfNodeKindDto::Task { subnet, multi_instance, cancels } => NodeKind::Task(Task {
                subnet: subnet.map(NetId::new),
                multi_instance,
                cancels: cancels.into_iter().map(NodeId::new).collect(),
            }),
            CpfNodeKindDto::Event { event } => NodeKind::Event(event),
            CpfNodeKindDto::State => NodeKind::State,
            CpfNodeKindDto::Gateway { direction, routing } => NodeKind::Gateway(Gateway { direction, kind: routing }),
        }
    }
}

impl TryFrom<CpfNetDto> for Net {
    type Error = Error;

    /// Imports a net as it is. Edges are kept even when an endpoint is missing, so that
    /// the validator can report them.
    fn try_from(dto: CpfNetDto) -> Result<Self, Self::Error> {
        let mut net = Net::new(dto.id, dto.name);

        // Phase 1: Nodes
        for node_dto in dto.nodes {
            let resources = node_dto.resources.into_iter().map(ResourceId::new).collect();
            let node = Node::new(NodeId::new(node_dto.id), node_dto.kind.into(), node_dto.name, node_dto.attributes)
                .with_resources(resources);
            net.add_node(node)?;
        }

        // Phase 2: Edges
        for edge_dto in dto.edges {
            let payload =
                EdgeAttributes { condition: edge_dto.condition, default: edge_dto.default, attributes: edge_dto.attributes };
            let edge = Edge::new(
                EdgeId::new(edge_dto.id),
                NodeId::new(edge_dto.source),
                NodeId::new(edge_dto.target),
                payload,
            );
            net.insert_edge_unchecked(edge)?;
        }

        // Phase 3: Sub-nets
        for subnet_dto in dto.subnets {
            net.add_subnet(Net::try_from(subnet_dto)?)?;
        }

        log::debug!("Imported net '{}' with {} node(s), {} edge(s)", net.id, net.node_count(), net.edge_count());
        Ok(net)
    }
}
