use crate::domain::cpf::{Attributes, Direction, EdgeAttributes, Net, NodeId, NodeKind};
use crate::domain::pattern::registry::{PATTERN_REGISTRY, routing_features};
use crate::domain::pattern::{
    CanonicalSubgraph, Construct, Core, FidelityWarning, PatternMatch, Role, RoutingPoint, SubgraphNode,
};
use crate::error::{Error, Result};

/// Maps a source construct onto its canonical shape.
///
/// Returns `None` when one of the construct's routing points has no named canonical
/// equivalent. The caller is then expected to use [`generic_decomposition`] and to keep
/// the fidelity warnings it returns.
pub fn recognize(construct: &Construct) -> Option<CanonicalSubgraph> {
    build(construct, false).map(|(subgraph, _)| subgraph)
}

/// Decomposes a construct with explicit OR-gateways wherever no named pattern applies.
///
/// Only `None` if the registry lacks the generic split/join definitions.
pub fn generic_decomposition(construct: &Construct) -> Option<(CanonicalSubgraph, Vec<FidelityWarning>)> {
    build(construct, true)
}

fn build(construct: &Construct, allow_generic: bool) -> Option<(CanonicalSubgraph, Vec<FidelityWarning>)> {
    let mut warnings = Vec::new();
    let mut patterns = Vec::new();

    let join = match construct.join {
        Some(point) => Some(resolve_point(construct, Direction::Join, point, allow_generic, &mut patterns, &mut warnings)?),
        None => None,
    };
    let split = match construct.split {
        Some(point) => Some(resolve_point(construct, Direction::Split, point, allow_generic, &mut patterns, &mut warnings)?),
        None => None,
    };

    let mut nodes = Vec::new();
    match &construct.core {
        Core::Task(task) => {
            push_routing(&mut nodes, Role::Join, join);
            nodes.push(SubgraphNode { role: Role::Core, kind: NodeKind::Task(task.clone()) });
            push_routing(&mut nodes, Role::Split, split);
        }
        Core::State => {
            // A state already is a state-based merge and a deferred choice.
            push_routing(&mut nodes, Role::Join, join.filter(|kind| !kind.is_state()));
            nodes.push(SubgraphNode { role: Role::Core, kind: NodeKind::State });
            push_routing(&mut nodes, Role::Split, split.filter(|kind| !kind.is_state()));
        }
        Core::Event(kind) => {
            push_routing(&mut nodes, Role::Join, join);
            nodes.push(SubgraphNode { role: Role::Core, kind: NodeKind::Event(*kind) });
            push_routing(&mut nodes, Role::Split, split);
        }
        Core::Route(routing) => {
            if join.as_ref().is_some_and(NodeKind::is_state) && split.as_ref().is_some_and(NodeKind::is_state) {
                // One state both merges and races its branches.
                nodes.push(SubgraphNode { role: Role::Core, kind: NodeKind::State });
            } else {
                push_routing(&mut nodes, Role::Join, join);
                push_routing(&mut nodes, Role::Split, split);
            }
            if nodes.is_empty() {
                // Pass-through routes never get here (see `NetBuilder::add_pass_through`); a
                // dead-end route keeps its declared routing as a split.
                let point = RoutingPoint { routing: *routing, branches: 1 };
                let kind = resolve_point(construct, Direction::Split, point, allow_generic, &mut patterns, &mut warnings)?;
                nodes.push(SubgraphNode { role: Role::Split, kind });
            }
        }
    }

    let subgraph = CanonicalSubgraph { element: construct.element.clone(), name: construct.name.clone(), nodes, patterns };
    log::debug!(
        "Recognized '{}' as [{}]",
        construct.element,
        subgraph.nodes.iter().map(|n| n.kind.label()).collect::<Vec<_>>().join(" -> ")
    );
    Some((subgraph, warnings))
}

fn resolve_point(
    construct: &Construct,
    direction: Direction,
    point: RoutingPoint,
    allow_generic: bool,
    patterns: &mut Vec<PatternMatch>,
    warnings: &mut Vec<FidelityWarning>,
) -> Option<NodeKind> {
    let observed = routing_features(direction, point.routing);

    let definition = match PATTERN_REGISTRY.resolve_named(&observed) {
        Some(definition) => definition,
        None if allow_generic => {
            let definition = PATTERN_REGISTRY.resolve(&observed)?;
            let warning = FidelityWarning::new(
                construct.element.clone(),
                format!(
                    "{} {} over {} branch(es) has no canonical equivalent, approximated by {}",
                    point.routing,
                    direction_name(direction),
                    point.branches,
                    definition.pattern
                ),
            );
            log::warn!("Fidelity loss at {}", warning);
            warnings.push(warning);
            definition
        }
        None => return None,
    };

    patterns.push(PatternMatch { pattern: definition.pattern, branches: point.branches });
    Some(definition.shape.clone())
}

fn push_routing(nodes: &mut Vec<SubgraphNode>, role: Role, kind: Option<NodeKind>) {
    if let Some(kind) = kind {
        nodes.push(SubgraphNode { role, kind });
    }
}

fn direction_name(direction: Direction) -> &'static str {
    match direction {
        Direction::Split => "split",
        Direction::Join => "join",
    }
}

/// Inserts a subgraph into `net` and chains its nodes.
///
/// The element name and `attributes` go to the core node (or to the first node of a
/// pure routing element). Returns the entry and exit node ids. Fails with `DuplicateId`
/// and leaves the net untouched if any of the chain's ids is taken.
pub fn splice(net: &mut Net, subgraph: &CanonicalSubgraph, attributes: Attributes) -> Result<(NodeId, NodeId)> {
    let ids = (0..subgraph.nodes.len()).map(|index| subgraph.node_id(index));
    if let Some(taken) = ids.into_iter().find(|id| net.contains_node(id)) {
        return Err(Error::DuplicateId { net: net.id.clone(), id: taken.to_string() });
    }

    let labelled = subgraph.nodes.iter().position(|n| n.role == Role::Core).unwrap_or(0);
    let mut attributes = Some(attributes);
    let mut previous: Option<NodeId> = None;

    for (index, node) in subgraph.nodes.iter().enumerate() {
        let (name, attrs) = if index == labelled {
            (subgraph.name.clone(), attributes.take().unwrap_or_default())
        } else {
            (String::new(), Attributes::new())
        };
        let id = net.create_node_with_id(subgraph.node_id(index), node.kind.clone(), name, attrs)?;
        if let Some(previous) = previous {
            net.create_edge(&previous, &id, EdgeAttributes::default())?;
        }
        previous = Some(id);
    }

    Ok((subgraph.entry(), subgraph.exit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cpf::{EventKind, GatewayKind, Task};
    use crate::domain::pattern::{Pattern, Routing};

    fn kinds(subgraph: &CanonicalSubgraph) -> Vec<String> {
        subgraph.nodes.iter().map(|n| n.kind.label()).collect()
    }

    #[test]
    fn test_task_with_join_and_split_codes() {
        let construct = Construct::new("T", "Approve", Core::Task(Task::default()))
            .with_join(Routing::And, 2)
            .with_split(Routing::Xor, 3);

        let subgraph = recognize(&construct).unwrap();
        assert_eq!(kinds(&subgraph), vec!["join:and", "task", "split:xor"]);
        assert_eq!(subgraph.entry(), "T.join");
        assert_eq!(subgraph.exit(), "T.split");
        assert_eq!(subgraph.node_id(1), "T");
        assert_eq!(
            subgraph.patterns.iter().map(|m| m.pattern).collect::<Vec<_>>(),
            vec![Pattern::Synchronization, Pattern::ExclusiveChoice]
        );
    }

    #[test]
    fn test_single_branch_routing_is_ignored() {
        let construct = Construct::new("T", "", Core::Task(Task::default())).with_split(Routing::And, 1);
        let subgraph = recognize(&construct).unwrap();
        assert_eq!(kinds(&subgraph), vec!["task"]);
        assert!(subgraph.patterns.is_empty());
    }

    #[test]
    fn test_state_absorbs_deferred_choice_and_merge() {
        let construct = Construct::new("B", "", Core::State).with_join(Routing::Event, 2).with_split(Routing::Event, 2);
        let subgraph = recognize(&construct).unwrap();
        assert_eq!(kinds(&subgraph), vec!["state"]);
        assert_eq!(subgraph.pattern(Direction::Split).map(|m| m.pattern), Some(Pattern::DeferredChoice));
        assert_eq!(subgraph.pattern(Direction::Join).map(|m| m.pattern), Some(Pattern::StateMerge));
    }

    #[test]
    fn test_end_event_with_racing_branches_gets_merge_state() {
        let construct = Construct::new("out", "", Core::Event(EventKind::End)).with_join(Routing::Event, 2);
        let subgraph = recognize(&construct).unwrap();
        assert_eq!(kinds(&subgraph), vec!["state", "event:end"]);
        assert_eq!(subgraph.entry(), "out.join");
        assert_eq!(subgraph.exit(), "out");
    }

    #[test]
    fn test_complex_routing_needs_generic_decomposition() {
        let construct = Construct::new("G", "", Core::Route(Routing::Complex)).with_split(Routing::Complex, 2);
        assert!(recognize(&construct).is_none());

        let (subgraph, warnings) = generic_decomposition(&construct).unwrap();
        assert_eq!(subgraph.nodes[0].kind, NodeKind::split(GatewayKind::Or));
        assert_eq!(subgraph.patterns[0].pattern, Pattern::GenericSplit);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].element, "G");
    }

    #[test]
    fn test_splice_chains_nodes() {
        let construct = Construct::new("T", "Approve", Core::Task(Task::default())).with_split(Routing::And, 2);
        let subgraph = recognize(&construct).unwrap();

        let mut net = Net::new("root", "");
        let mut attributes = Attributes::new();
        attributes.insert("cost".to_string(), "3".to_string());
        let (entry, exit) = splice(&mut net, &subgraph, attributes).unwrap();

        assert_eq!(entry, "T");
        assert_eq!(exit, "T.split");
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 1);
        let task = net.node(&entry).unwrap();
        assert_eq!(task.name, "Approve");
        assert_eq!(task.attributes.get("cost").map(String::as_str), Some("3"));
        assert!(net.node(&exit).unwrap().name.is_empty());
    }

    #[test]
    fn test_splice_with_taken_id_leaves_net_untouched() {
        let construct = Construct::new("T", "Approve", Core::Task(Task::default()))
            .with_join(Routing::Xor, 2)
            .with_split(Routing::And, 2);
        let subgraph = recognize(&construct).unwrap();

        let mut net = Net::new("root", "");
        net.create_node_with_id("T.split", NodeKind::State, "", Attributes::new()).unwrap();
        let result = splice(&mut net, &subgraph, Attributes::new());

        assert!(matches!(&result, Err(Error::DuplicateId { id, .. }) if id == "T.split"));
        assert_eq!(net.node_count(), 1);
        assert_eq!(net.edge_count(), 0);
    }
}
