use std::collections::HashMap;

use crate::domain::cpf::edge::{Edge, EdgeAttributes};
use crate::domain::cpf::id::{EdgeId, NetId, NodeId};
use crate::domain::cpf::node::{Attributes, Node, NodeKind};
use crate::error::{Error, Result};

/// A canonical process graph.
///
/// A `Net` exclusively owns its nodes, its edges and its sub-nets. Nodes and edges keep
/// their insertion order, which makes iteration (and therefore validation reports and
/// rendered documents) deterministic. Identifiers are unique within the net and stay
/// stable for the lifetime of the translation session.
#[derive(Debug, Clone)]
pub struct Net {
    pub id: NetId,
    pub name: String,

    nodes: HashMap<NodeId, Node>,
    node_order: Vec<NodeId>,
    edges: HashMap<EdgeId, Edge>,
    edge_order: Vec<EdgeId>,

    // Adjacency lists, keyed by node id. Kept in sync with `edges`.
    outgoing: HashMap<NodeId, Vec<EdgeId>>,
    incoming: HashMap<NodeId, Vec<EdgeId>>,

    subnets: Vec<Net>,

    next_node: usize,
    next_edge: usize,
}

/// The node/edge multiset of a net, independent of identifiers.
///
/// Two nets with equal signatures are equivalent up to renaming.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct NetSignature {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String, Option<String>)>,
    pub subnets: Vec<NetSignature>,
}

impl Net {
    pub fn new(id: impl Into<NetId>, name: impl Into<String>) -> Self {
        Net {
            id: id.into(),
            name: name.into(),
            nodes: HashMap::new(),
            node_order: Vec::new(),
            edges: HashMap::new(),
            edge_order: Vec::new(),
            outgoing: HashMap::new(),
            incoming: HashMap::new(),
            subnets: Vec::new(),
            next_node: 0,
            next_edge: 0,
        }
    }

    //---------------------
    // --- Node Methods ---
    //---------------------

    /// Creates a node with a generated identifier.
    pub fn create_node(&mut self, kind: NodeKind, name: impl Into<String>, attributes: Attributes) -> NodeId {
        let id = self.fresh_node_id();
        self.insert_node(Node::new(id.clone(), kind, name, attributes));
        id
    }

    /// Creates a node under a caller-chosen identifier, e.g. the id of the source element.
    pub fn create_node_with_id(
        &mut self,
        id: impl Into<NodeId>,
        kind: NodeKind,
        name: impl Into<String>,
        attributes: Attributes,
    ) -> Result<NodeId> {
        self.add_node(Node::new(id.into(), kind, name, attributes))
    }

    pub fn add_node(&mut self, node: Node) -> Result<NodeId> {
        if self.nodes.contains_key(&node.id) {
            return Err(Error::DuplicateId { net: self.id.clone(), id: node.id.to_string() });
        }
        let id = node.id.clone();
        self.insert_node(node);
        Ok(id)
    }

    /// Removes a node. Fails with `DanglingEdge` while edges still touch it.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<Node> {
        if !self.nodes.contains_key(id) {
            return Err(Error::UnknownNode { net: self.id.clone(), node: id.clone() });
        }

        let mut incident: Vec<EdgeId> = self.incoming(id).to_vec();
        for edge in self.outgoing(id) {
            if !incident.contains(edge) {
                incident.push(edge.clone());
            }
        }
        if !incident.is_empty() {
            return Err(Error::DanglingEdge { net: self.id.clone(), node: id.clone(), edges: incident });
        }

        self.outgoing.remove(id);
        self.incoming.remove(id);
        self.node_order.retain(|n| n != id);
        self.nodes.remove(id).ok_or_else(|| Error::UnknownNode { net: self.id.clone(), node: id.clone() })
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(move |id| self.nodes.get(id))
    }

    pub fn node_ids(&self) -> &[NodeId] {
        &self.node_order
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    //---------------------
    // --- Edge Methods ---
    //---------------------

    /// Connects two existing nodes. Fails with `UnknownNode` and leaves the net untouched
    /// if either endpoint is missing.
    pub fn create_edge(&mut self, source: &NodeId, target: &NodeId, payload: EdgeAttributes) -> Result<EdgeId> {
        self.check_endpoints(source, target)?;
        let id = self.fresh_edge_id();
        self.insert_edge(Edge::new(id.clone(), source.clone(), target.clone(), payload));
        Ok(id)
    }

    pub fn create_edge_with_id(
        &mut self,
        id: impl Into<EdgeId>,
        source: &NodeId,
        target: &NodeId,
        payload: EdgeAttributes,
    ) -> Result<EdgeId> {
        let id = id.into();
        if self.edges.contains_key(&id) {
            return Err(Error::DuplicateId { net: self.id.clone(), id: id.to_string() });
        }
        self.check_endpoints(source, target)?;
        self.insert_edge(Edge::new(id.clone(), source.clone(), target.clone(), payload));
        Ok(id)
    }

    /// Inserts an edge without checking its endpoints.
    ///
    /// Only used when importing an externally produced graph, so that dangling references
    /// survive long enough to be reported by the validator.
    pub(crate) fn insert_edge_unchecked(&mut self, edge: Edge) -> Result<EdgeId> {
        if self.edges.contains_key(&edge.id) {
            return Err(Error::DuplicateId { net: self.id.clone(), id: edge.id.to_string() });
        }
        let id = edge.id.clone();
        self.insert_edge(edge);
        Ok(id)
    }

    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<Edge> {
        let edge = self.edges.remove(id).ok_or_else(|| Error::UnknownEdge { net: self.id.clone(), edge: id.clone() })?;
        self.edge_order.retain(|e| e != id);
        if let Some(list) = self.outgoing.get_mut(&edge.source) {
            list.retain(|e| e != id);
        }
        if let Some(list) = self.incoming.get_mut(&edge.target) {
            list.retain(|e| e != id);
        }
        Ok(edge)
    }

    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edge_mut(&mut self, id: &EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(move |id| self.edges.get(id))
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn outgoing(&self, node: &NodeId) -> &[EdgeId] {
        self.outgoing.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn incoming(&self, node: &NodeId) -> &[EdgeId] {
        self.incoming.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn out_degree(&self, node: &NodeId) -> usize {
        self.outgoing(node).len()
    }

    pub fn in_degree(&self, node: &NodeId) -> usize {
        self.incoming(node).len()
    }

    pub fn successors(&self, node: &NodeId) -> Vec<&NodeId> {
        self.outgoing(node).iter().filter_map(|e| self.edges.get(e)).map(|e| &e.target).collect()
    }

    pub fn predecessors(&self, node: &NodeId) -> Vec<&NodeId> {
        self.incoming(node).iter().filter_map(|e| self.edges.get(e)).map(|e| &e.source).collect()
    }

    /// Nodes without incoming edges.
    pub fn entry_nodes(&self) -> Vec<&NodeId> {
        self.node_order.iter().filter(|n| self.in_degree(n) == 0).collect()
    }

    /// Nodes without outgoing edges.
    pub fn exit_nodes(&self) -> Vec<&NodeId> {
        self.node_order.iter().filter(|n| self.out_degree(n) == 0).collect()
    }

    //-----------------------
    // --- Sub-net Methods ---
    //-----------------------

    pub fn add_subnet(&mut self, subnet: Net) -> Result<()> {
        if subnet.id == self.id || self.find_subnet(&subnet.id).is_some() {
            return Err(Error::DuplicateId { net: self.id.clone(), id: subnet.id.to_string() });
        }
        self.subnets.push(subnet);
        Ok(())
    }

    pub fn subnets(&self) -> &[Net] {
        &self.subnets
    }

    pub fn subnet(&self, id: &NetId) -> Option<&Net> {
        self.subnets.iter().find(|s| &s.id == id)
    }

    /// Searches this net and all nested sub-nets.
    pub fn find_subnet(&self, id: &NetId) -> Option<&Net> {
        if &self.id == id {
            return Some(self);
        }
        self.subnets.iter().find_map(|s| s.find_subnet(id))
    }

    /// Identity-free description of the net, recursively including its sub-nets.
    pub fn signature(&self) -> NetSignature {
        let describe = |id: &NodeId| match self.nodes.get(id) {
            Some(node) if matches!(node.kind, NodeKind::Task(_)) => format!("{}({})", node.kind.label(), node.name),
            Some(node) => node.kind.label(),
            None => "<missing>".to_string(),
        };

        let mut nodes: Vec<String> = self.node_order.iter().map(describe).collect();
        nodes.sort();

        let mut edges: Vec<(String, String, Option<String>)> =
            self.edges().map(|e| (describe(&e.source), describe(&e.target), e.condition.clone())).collect();
        edges.sort();

        let mut subnets: Vec<NetSignature> = self.subnets.iter().map(Net::signature).collect();
        subnets.sort();

        NetSignature { nodes, edges, subnets }
    }

    //--------------------
    // --- Internals ---
    //--------------------

    fn insert_node(&mut self, node: Node) {
        self.node_order.push(node.id.clone());
        self.nodes.insert(node.id.clone(), node);
    }

    fn insert_edge(&mut self, edge: Edge) {
        self.outgoing.entry(edge.source.clone()).or_default().push(edge.id.clone());
        self.incoming.entry(edge.target.clone()).or_default().push(edge.id.clone());
        self.edge_order.push(edge.id.clone());
        self.edges.insert(edge.id.clone(), edge);
    }

    fn check_endpoints(&self, source: &NodeId, target: &NodeId) -> Result<()> {
        for endpoint in [source, target] {
            if !self.nodes.contains_key(endpoint) {
                return Err(Error::UnknownNode { net: self.id.clone(), node: endpoint.clone() });
            }
        }
        Ok(())
    }

    fn fresh_node_id(&mut self) -> NodeId {
        loop {
            self.next_node += 1;
            let candidate = NodeId::new(format!("n{}", self.next_node));
            if !self.nodes.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    fn fresh_edge_id(&mut self) -> EdgeId {
        loop {
            self.next_edge += 1;
            let candidate = EdgeId::new(format!("e{}", self.next_edge));
            if !self.edges.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cpf::node::GatewayKind;

    fn task(net: &mut Net, name: &str) -> NodeId {
        net.create_node(NodeKind::task(), name, Attributes::new())
    }

    #[test]
    fn test_create_and_query_adjacency() {
        let mut net = Net::new("root", "Root");
        let a = task(&mut net, "A");
        let split = net.create_node(NodeKind::split(GatewayKind::And), "", Attributes::new());
        let b = task(&mut net, "B");
        let c = task(&mut net, "C");

        let e1 = net.create_edge(&a, &split, EdgeAttributes::default()).unwrap();
        let e2 = net.create_edge(&split, &b, EdgeAttributes::default()).unwrap();
        let e3 = net.create_edge(&split, &c, EdgeAttributes::default()).unwrap();

        assert_eq!(net.outgoing(&split), &[e2.clone(), e3.clone()]);
        assert_eq!(net.incoming(&split), &[e1]);
        assert_eq!(net.successors(&split), vec![&b, &c]);
        assert_eq!(net.entry_nodes(), vec![&a]);
        assert_eq!(net.exit_nodes(), vec![&b, &c]);

        let order: Vec<&str> = net.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(order, vec!["A", "", "B", "C"]);
    }

    #[test]
    fn test_create_edge_to_missing_node_has_no_effect() {
        let mut net = Net::new("root", "Root");
        let a = task(&mut net, "A");

        let result = net.create_edge(&a, &NodeId::new("ghost"), EdgeAttributes::default());
        assert!(matches!(result, Err(Error::UnknownNode { ref node, .. }) if node == "ghost"));
        assert_eq!(net.edge_count(), 0);
        assert!(net.outgoing(&a).is_empty());
    }

    #[test]
    fn test_remove_node_with_incident_edges_fails() {
        let mut net = Net::new("root", "Root");
        let a = task(&mut net, "A");
        let b = task(&mut net, "B");
        let edge = net.create_edge(&a, &b, EdgeAttributes::default()).unwrap();

        match net.remove_node(&b) {
            Err(Error::DanglingEdge { node, edges, .. }) => {
                assert_eq!(node, b);
                assert_eq!(edges, vec![edge.clone()]);
            }
            other => panic!("Expected DanglingEdge, got {:?}", other),
        }
        assert!(net.contains_node(&b));

        net.remove_edge(&edge).unwrap();
        let removed = net.remove_node(&b).unwrap();
        assert_eq!(removed.name, "B");
        assert_eq!(net.node_count(), 1);
        assert!(net.outgoing(&a).is_empty());
    }

    #[test]
    fn test_generated_ids_skip_caller_chosen_ones() {
        let mut net = Net::new("root", "Root");
        net.create_node_with_id("n1", NodeKind::State, "", Attributes::new()).unwrap();
        let generated = task(&mut net, "A");
        assert_eq!(generated, "n2");

        let duplicate = net.create_node_with_id("n1", NodeKind::State, "", Attributes::new());
        assert!(matches!(duplicate, Err(Error::DuplicateId { .. })));
    }

    #[test]
    fn test_signature_is_independent_of_ids() {
        let mut left = Net::new("l", "Left");
        let a = left.create_node_with_id("a", NodeKind::task(), "A", Attributes::new()).unwrap();
        let s = left.create_node_with_id("s", NodeKind::State, "", Attributes::new()).unwrap();
        left.create_edge(&a, &s, EdgeAttributes::default()).unwrap();

        let mut right = Net::new("r", "Right");
        let s2 = right.create_node(NodeKind::State, "whatever", Attributes::new());
        let a2 = right.create_node(NodeKind::task(), "A", Attributes::new());
        right.create_edge(&a2, &s2, EdgeAttributes::default()).unwrap();

        assert_eq!(left.signature(), right.signature());
    }

    #[test]
    fn test_find_subnet_is_recursive() {
        let mut root = Net::new("root", "Root");
        let mut child = Net::new("child", "Child");
        child.add_subnet(Net::new("grandchild", "Grandchild")).unwrap();
        root.add_subnet(child).unwrap();

        assert!(root.subnet(&NetId::new("grandchild")).is_none());
        assert_eq!(root.find_subnet(&NetId::new("grandchild")).map(|n| n.name.as_str()), Some("Grandchild"));
        assert!(root.add_subnet(Net::new("grandchild", "again")).is_err());
    }
}
