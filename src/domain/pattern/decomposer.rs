use std::collections::BTreeSet;

use crate::domain::adapter::{Capabilities, Notation};
use crate::domain::cpf::{Direction, GatewayKind, Net, NodeId, NodeKind};
use crate::domain::pattern::registry::{Feature, PATTERN_REGISTRY, gateway_features, routing_features};
use crate::domain::pattern::{CanonicalSubgraph, Construct, Core, PatternMatch, Role, Routing, SubgraphNode};
use crate::error::{Error, Result};

/// Describes the routing a canonical node performs, as a one-node subgraph.
///
/// Gateways carry their own routing. States with fan-out race their branches (deferred
/// choice) and merge whatever arrives first. Tasks and events with several outgoing
/// edges start all of them, with several incoming edges they continue on each arrival.
pub fn classify(net: &Net, node_id: &NodeId) -> Option<CanonicalSubgraph> {
    let node = net.node(node_id)?;
    let fan_in = net.in_degree(node_id);
    let fan_out = net.out_degree(node_id);
    let mut patterns = Vec::new();

    let role = match &node.kind {
        NodeKind::Gateway(gateway) => {
            let branches = match gateway.direction {
                Direction::Split => fan_out,
                Direction::Join => fan_in,
            };
            push_match(&mut patterns, gateway_features(gateway.direction, gateway.kind), branches);
            match gateway.direction {
                Direction::Split => Role::Split,
                Direction::Join => Role::Join,
            }
        }
        NodeKind::State => {
            if fan_in >= 2 {
                push_match(&mut patterns, routing_features(Direction::Join, Routing::Event), fan_in);
            }
            if fan_out >= 2 {
                push_match(&mut patterns, routing_features(Direction::Split, Routing::Event), fan_out);
            }
            Role::Core
        }
        NodeKind::Task(_) | NodeKind::Event(_) => {
            if fan_in >= 2 {
                push_match(&mut patterns, routing_features(Direction::Join, Routing::Xor), fan_in);
            }
            if fan_out >= 2 {
                push_match(&mut patterns, routing_features(Direction::Split, Routing::And), fan_out);
            }
            Role::Core
        }
    };

    Some(CanonicalSubgraph {
        element: node.id.to_string(),
        name: node.name.clone(),
        nodes: vec![SubgraphNode { role, kind: node.kind.clone() }],
        patterns,
    })
}

fn push_match(patterns: &mut Vec<PatternMatch>, observed: BTreeSet<Feature>, branches: usize) {
    if let Some(definition) = PATTERN_REGISTRY.resolve(&observed) {
        patterns.push(PatternMatch { pattern: definition.pattern, branches });
    }
}

/// Turns a canonical subgraph back into a notation construct.
///
/// Fails with `UnsupportedConstruct` when `capabilities` lack the routing one of the
/// subgraph's patterns needs. No other routing is substituted.
pub fn decompose(subgraph: &CanonicalSubgraph, capabilities: &Capabilities, notation: Notation) -> Result<Construct> {
    let core = match subgraph.core().or_else(|| subgraph.nodes.first()).map(|n| &n.kind) {
        Some(NodeKind::Task(task)) => Core::Task(task.clone()),
        Some(NodeKind::State) => Core::State,
        Some(NodeKind::Event(kind)) => Core::Event(*kind),
        Some(NodeKind::Gateway(gateway)) => Core::Route(gateway_routing(gateway.kind)),
        None => return Err(Error::unsupported(notation, format!("empty subgraph for '{}'", subgraph.element))),
    };

    let mut construct = Construct::new(subgraph.element.clone(), subgraph.name.clone(), core);
    for matched in &subgraph.patterns {
        let routing = matched.pattern.routing();
        let direction = matched.pattern.direction();
        if !capabilities.supports(direction, routing) {
            return Err(Error::unsupported(
                notation,
                format!("{} ({} {:?}) at '{}'", matched.pattern, routing, direction, subgraph.element),
            ));
        }
        construct = match direction {
            Direction::Join => construct.with_join(routing, matched.branches),
            Direction::Split => construct.with_split(routing, matched.branches),
        };
    }

    log::debug!("Decomposed '{}' for {}", subgraph.element, notation);
    Ok(construct)
}

pub(crate) fn gateway_routing(kind: GatewayKind) -> Routing {
    match kind {
        GatewayKind::And => Routing::And,
        GatewayKind::Or => Routing::Or,
        GatewayKind::Xor => Routing::Xor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::adapter::{FormatAdapter, PnmlAdapter, XpdlAdapter, YawlAdapter};
    use crate::domain::cpf::{Attributes, EdgeAttributes};
    use crate::domain::pattern::Pattern;

    fn or_join_net() -> (Net, NodeId) {
        let mut net = Net::new("root", "");
        let a = net.create_node(NodeKind::task(), "A", Attributes::new());
        let b = net.create_node(NodeKind::task(), "B", Attributes::new());
        let join = net.create_node(NodeKind::join(GatewayKind::Or), "", Attributes::new());
        let c = net.create_node(NodeKind::task(), "C", Attributes::new());
        net.create_edge(&a, &join, EdgeAttributes::default()).unwrap();
        net.create_edge(&b, &join, EdgeAttributes::default()).unwrap();
        net.create_edge(&join, &c, EdgeAttributes::default()).unwrap();
        (net, join)
    }

    #[test]
    fn test_classify_or_join() {
        let (net, join) = or_join_net();
        let subgraph = classify(&net, &join).unwrap();
        assert_eq!(subgraph.patterns, vec![PatternMatch { pattern: Pattern::SynchronizingMerge, branches: 2 }]);
        assert_eq!(subgraph.entry(), join);
    }

    #[test]
    fn test_or_join_is_unsupported_in_petri_nets() {
        let (net, join) = or_join_net();
        let subgraph = classify(&net, &join).unwrap();

        let pnml = PnmlAdapter::new();
        let result = decompose(&subgraph, pnml.capabilities(), pnml.notation());
        assert!(
            matches!(result, Err(Error::UnsupportedConstruct { notation: Notation::Pnml, .. })),
            "Expected UnsupportedConstruct, got {:?}",
            result
        );

        // Notations with OR-joins keep the routing unchanged.
        for (capabilities, notation) in [
            (YawlAdapter::new().capabilities().clone(), Notation::Yawl),
            (XpdlAdapter::new().capabilities().clone(), Notation::Xpdl),
        ] {
            let construct = decompose(&subgraph, &capabilities, notation).unwrap();
            assert_eq!(construct.core, Core::Route(Routing::Or));
            assert_eq!(construct.join.map(|p| p.routing), Some(Routing::Or));
        }
    }

    #[test]
    fn test_state_with_fan_out_is_deferred_choice() {
        let mut net = Net::new("root", "");
        let s = net.create_node(NodeKind::State, "", Attributes::new());
        let a = net.create_node(NodeKind::task(), "A", Attributes::new());
        let b = net.create_node(NodeKind::task(), "B", Attributes::new());
        net.create_edge(&s, &a, EdgeAttributes::default()).unwrap();
        net.create_edge(&s, &b, EdgeAttributes::default()).unwrap();

        let subgraph = classify(&net, &s).unwrap();
        assert_eq!(subgraph.pattern(Direction::Split).map(|m| m.pattern), Some(Pattern::DeferredChoice));

        let pnml = PnmlAdapter::new();
        let construct = decompose(&subgraph, pnml.capabilities(), pnml.notation()).unwrap();
        assert_eq!(construct.split.map(|p| p.routing), Some(Routing::Event));
    }
}
