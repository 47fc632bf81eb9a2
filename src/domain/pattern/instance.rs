use crate::domain::cpf::{Direction, Net, NodeId};
use crate::domain::pattern::{Pattern, classify};

/// A control-flow idiom located in a net: a split, the branch chains leaving it and,
/// when all branches converge on the same node, that join.
///
/// Only used while translating or inspecting a net. Nothing refers to it afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternInstance {
    pub pattern: Pattern,
    /// Sole predecessor of the split, if it has exactly one.
    pub trigger: Option<NodeId>,
    pub split: NodeId,
    /// The inner nodes of each branch, in order, excluding split and join.
    pub branches: Vec<Vec<NodeId>>,
    pub join: Option<NodeId>,
}

/// Locates every split pattern of `net` (sub-nets are not searched).
///
/// Each outgoing branch is followed through nodes with one incoming and one outgoing
/// edge. The branches share a join when they all stop at the same node and that node
/// has two or more incoming edges.
pub fn find_instances(net: &Net) -> Vec<PatternInstance> {
    let mut instances = Vec::new();

    for split in net.node_ids() {
        let Some(subgraph) = classify(net, split) else {
            continue;
        };
        let Some(matched) = subgraph.pattern(Direction::Split) else {
            continue;
        };

        let predecessors = net.predecessors(split);
        let trigger = match predecessors.as_slice() {
            [single] => Some((*single).clone()),
            _ => None,
        };

        let mut branches = Vec::new();
        let mut ends = Vec::new();
        for first in net.successors(split) {
            let (chain, end) = follow_branch(net, split, first);
            branches.push(chain);
            ends.push(end);
        }

        let join = match ends.split_first() {
            Some((Some(first), rest))
                if rest.iter().all(|end| end.as_ref() == Some(first)) && net.in_degree(first) >= 2 =>
            {
                Some(first.clone())
            }
            _ => None,
        };

        log::debug!(
            "Found {} at '{}' with {} branch(es), join {:?}",
            matched.pattern,
            split,
            branches.len(),
            join.as_ref().map(|j| j.as_str())
        );
        instances.push(PatternInstance { pattern: matched.pattern, trigger, split: split.clone(), branches, join });
    }

    instances
}

/// Walks one branch. Returns the inner chain and the node the branch stops at, if any.
fn follow_branch(net: &Net, split: &NodeId, first: &NodeId) -> (Vec<NodeId>, Option<NodeId>) {
    let mut chain = Vec::new();
    let mut current = first.clone();

    // Bounded by the node count so that loops back into the branch terminate.
    for _ in 0..=net.node_count() {
        if &current == split {
            return (chain, None);
        }
        if net.in_degree(&current) != 1 || net.out_degree(&current) != 1 {
            return (chain, Some(current));
        }
        let next = match net.successors(&current).first() {
            Some(next) => (*next).clone(),
            None => return (chain, Some(current)),
        };
        chain.push(current);
        current = next;
    }

    (chain, None)
}
