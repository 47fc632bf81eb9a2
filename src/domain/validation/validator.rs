use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::domain::cpf::{Direction, GatewayKind, Net, NodeId, NodeKind};
use crate::domain::validation::ViolationKind;

/// Runs every check on a single net, without descending into its sub-nets.
pub fn validate_net(root: &Net, net: &Net) -> Vec<ViolationKind> {
    let mut violations = Vec::new();

    check_dangling_edges(net, &mut violations);
    let orphans = check_orphans(net, &mut violations);
    check_gateway_balance(net, &mut violations);
    check_connectivity(net, &orphans, &mut violations);
    check_cycles(net, &mut violations);
    check_references(root, net, &mut violations);

    violations
}

fn check_dangling_edges(net: &Net, violations: &mut Vec<ViolationKind>) {
    for edge in net.edges() {
        for endpoint in [&edge.source, &edge.target] {
            if !net.contains_node(endpoint) {
                violations.push(ViolationKind::DanglingEdge { edge: edge.id.clone(), missing: endpoint.clone() });
            }
        }
    }
}

/// A lone node is a trivial net, not an orphan.
fn check_orphans(net: &Net, violations: &mut Vec<ViolationKind>) -> Vec<NodeId> {
    if net.node_count() < 2 {
        return Vec::new();
    }

    let orphans: Vec<NodeId> =
        net.node_ids().iter().filter(|n| net.in_degree(n) == 0 && net.out_degree(n) == 0).cloned().collect();
    for node in &orphans {
        violations.push(ViolationKind::OrphanNode { node: node.clone() });
    }
    orphans
}

fn check_gateway_balance(net: &Net, violations: &mut Vec<ViolationKind>) {
    for node in net.nodes() {
        let Some(gateway) = node.kind.as_gateway() else {
            continue;
        };
        let incoming = net.in_degree(&node.id);
        let outgoing = net.out_degree(&node.id);
        let balanced = match gateway.direction {
            Direction::Split => incoming >= 1 && outgoing >= 2,
            Direction::Join => incoming >= 2 && outgoing >= 1,
        };
        if !balanced {
            violations.push(ViolationKind::UnbalancedGateway { node: node.id.clone(), incoming, outgoing });
        }
    }
}

/// Groups the nodes into weakly connected components with a disjoint set union and
/// reports every component apart from the one holding the first node. Orphans are
/// already reported on their own.
fn check_connectivity(net: &Net, orphans: &[NodeId], violations: &mut Vec<ViolationKind>) {
    let node_ids: Vec<&NodeId> = net.node_ids().iter().filter(|n| !orphans.contains(*n)).collect();
    if node_ids.len() < 2 {
        return;
    }

    let node_id_to_index: HashMap<&NodeId, usize> = node_ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    let mut dsu = QuickUnionUf::<UnionBySize>::new(node_ids.len());

    for edge in net.edges() {
        if let (Some(&source_index), Some(&target_index)) =
            (node_id_to_index.get(&edge.source), node_id_to_index.get(&edge.target))
        {
            dsu.union(source_index, target_index);
        }
    }

    let main = dsu.find(0);
    let mut components: Vec<(usize, Vec<NodeId>)> = Vec::new();
    for (index, id) in node_ids.iter().enumerate() {
        let representative = dsu.find(index);
        if representative == main {
            continue;
        }
        match components.iter_mut().find(|(rep, _)| *rep == representative) {
            Some((_, members)) => members.push((*id).clone()),
            None => components.push((representative, vec![(*id).clone()])),
        }
    }

    for (_, nodes) in components {
        violations.push(ViolationKind::DisconnectedSubgraph { nodes });
    }
}

/// Every strongly connected component with a cycle must be a structured loop: some
/// node merges a flow from outside into the cycle and some node chooses a flow leaving it.
fn check_cycles(net: &Net, violations: &mut Vec<ViolationKind>) {
    for component in strongly_connected_components(net) {
        let cyclic = component.len() > 1 || net.successors(&component[0]).contains(&&component[0]);
        if !cyclic {
            continue;
        }

        let inside = |id: &NodeId| component.contains(id);
        let entered = component.iter().any(|n| is_merging(net, n) && net.predecessors(n).iter().any(|p| !inside(*p)));
        let left = component.iter().any(|n| is_deciding(net, n) && net.successors(n).iter().any(|s| !inside(*s)));

        if !(entered && left) {
            violations.push(ViolationKind::InvalidCycle { nodes: component });
        }
    }
}

fn is_merging(net: &Net, id: &NodeId) -> bool {
    match net.node(id).map(|n| &n.kind) {
        Some(NodeKind::Gateway(gateway)) => {
            gateway.direction == Direction::Join && gateway.kind != GatewayKind::And
        }
        Some(NodeKind::State) | Some(NodeKind::Task(_)) | Some(NodeKind::Event(_)) => net.in_degree(id) >= 2,
        None => false,
    }
}

fn is_deciding(net: &Net, id: &NodeId) -> bool {
    match net.node(id).map(|n| &n.kind) {
        Some(NodeKind::Gateway(gateway)) => {
            gateway.direction == Direction::Split && gateway.kind != GatewayKind::And
        }
        Some(NodeKind::State) => net.out_degree(id) >= 2,
        _ => false,
    }
}

/// Strongly connected components over the existing nodes. Components come out in
/// reverse topological order, members in node order. Edges to missing nodes are skipped.
fn strongly_connected_components(net: &Net) -> Vec<Vec<NodeId>> {
    let mut graph = DiGraph::<&NodeId, ()>::with_capacity(net.node_count(), net.edge_count());
    let node_id_to_index: HashMap<&NodeId, NodeIndex> =
        net.node_ids().iter().map(|id| (id, graph.add_node(id))).collect();

    for edge in net.edges() {
        if let (Some(&source), Some(&target)) =
            (node_id_to_index.get(&edge.source), node_id_to_index.get(&edge.target))
        {
            graph.add_edge(source, target, ());
        }
    }

    tarjan_scc(&graph)
        .into_iter()
        .map(|mut component| {
            component.sort();
            component.into_iter().map(|index| (*graph[index]).clone()).collect()
        })
        .collect()
}

fn check_references(root: &Net, net: &Net, violations: &mut Vec<ViolationKind>) {
    for node in net.nodes() {
        let Some(task) = node.kind.as_task() else {
            continue;
        };
        if let Some(subnet) = &task.subnet
            && root.find_subnet(subnet).is_none()
        {
            violations.push(ViolationKind::UnresolvedReference {
                node: node.id.clone(),
                reference: format!("sub-net '{}'", subnet),
            });
        }
        for cancelled in &task.cancels {
            if !net.contains_node(cancelled) {
                violations.push(ViolationKind::UnresolvedReference {
                    node: node.id.clone(),
                    reference: format!("cancelled node '{}'", cancelled),
                });
            }
        }
    }
}
