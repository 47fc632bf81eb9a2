use std::collections::{HashMap, HashSet};

use crate::domain::adapter::{Notation, Translated};
use crate::domain::cpf::{Attributes, EdgeAttributes, EdgeId, Net, Node, NodeId, ResourceId};
use crate::domain::pattern::{Construct, FidelityWarning, Routing, generic_decomposition, recognize, splice};
use crate::error::{Error, Result};

/// Assembles a canonical net from source elements and the flows between them.
///
/// Each element is recognized and spliced in as a chain of nodes. Flows are then drawn
/// from the exit of the source element's chain to the entry of the target's chain.
/// Pass-through elements get no nodes: the flows around them are joined when the net
/// is finished.
pub struct NetBuilder {
    notation: Notation,
    net: Net,
    /// Source element id -> (entry node, exit node)
    elements: HashMap<String, (NodeId, NodeId)>,
    pass_through: HashSet<String>,
    /// Flows touching a pass-through element, in document order.
    pending: Vec<(String, String, EdgeAttributes)>,
    warnings: Vec<FidelityWarning>,
}

impl NetBuilder {
    pub fn new(notation: Notation, id: &str, name: &str) -> Self {
        NetBuilder {
            notation,
            net: Net::new(id, name),
            elements: HashMap::new(),
            pass_through: HashSet::new(),
            pending: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Recognizes `construct` and adds its canonical subgraph.
    ///
    /// Falls back to the generic decomposition when no named pattern matches and keeps
    /// the fidelity warnings. Returns the id of the element's labelled node.
    pub fn add_element(&mut self, construct: &Construct, attributes: Attributes) -> Result<NodeId> {
        self.check_new(&construct.element)?;

        let subgraph = match recognize(construct) {
            Some(subgraph) => subgraph,
            None => {
                let (subgraph, warnings) = generic_decomposition(construct).ok_or_else(|| {
                    Error::unsupported(self.notation, format!("routing of element '{}'", construct.element))
                })?;
                self.warnings.extend(warnings);
                subgraph
            }
        };

        let (entry, exit) = splice(&mut self.net, &subgraph, attributes).map_err(|error| match error {
            Error::DuplicateId { id, .. } => Error::malformed(
                self.notation,
                format!("element '{}' needs node id '{}', which is already taken", construct.element, id),
            ),
            other => other,
        })?;
        self.elements.insert(construct.element.clone(), (entry, exit));
        Ok(NodeId::new(construct.element.clone()))
    }

    /// Adds a routing element with one incoming and one outgoing flow. It gets no node of
    /// its own; its two flows become a single edge. Only a complex routing rule is lost.
    pub fn add_pass_through(&mut self, element: &str, routing: Routing) -> Result<()> {
        self.check_new(element)?;
        if routing == Routing::Complex {
            self.warn(FidelityWarning::new(
                element.to_string(),
                "complex route with a single incoming and outgoing flow reduced to a plain flow",
            ));
        }
        self.pass_through.insert(element.to_string());
        Ok(())
    }

    /// Draws a flow between two previously added elements.
    ///
    /// Returns `None` when either end is a pass-through element; the edge is drawn by
    /// [`finish`](Self::finish).
    pub fn connect(&mut self, source: &str, target: &str, payload: EdgeAttributes) -> Result<Option<EdgeId>> {
        for element in [source, target] {
            if !self.elements.contains_key(element) && !self.pass_through.contains(element) {
                return Err(self.unknown(element));
            }
        }
        if self.pass_through.contains(source) || self.pass_through.contains(target) {
            self.pending.push((source.to_string(), target.to_string(), payload));
            return Ok(None);
        }

        let exit = self.elements[source].1.clone();
        let entry = self.elements[target].0.clone();
        self.net.create_edge(&exit, &entry, payload).map(Some)
    }

    pub fn set_resources(&mut self, element: &str, resources: Vec<ResourceId>) {
        if let Some(node) = self.node_mut(element) {
            node.resources = resources;
        }
    }

    pub fn contains(&self, element: &str) -> bool {
        self.elements.contains_key(element)
    }

    pub fn warn(&mut self, warning: FidelityWarning) {
        log::warn!("Fidelity loss at {}", warning);
        self.warnings.push(warning);
    }

    pub fn add_subnet(&mut self, subnet: Net) -> Result<()> {
        self.net.add_subnet(subnet)
    }

    /// Joins the flows around pass-through elements and hands out the net.
    pub fn finish(mut self) -> Result<Translated<Net>> {
        let pending = std::mem::take(&mut self.pending);
        let mut visited: HashSet<&str> = HashSet::new();

        for (source, target, payload) in pending.iter().filter(|(source, ..)| self.elements.contains_key(source)) {
            let mut target = target;
            let mut payload = payload.clone();
            while self.pass_through.contains(target) {
                if !visited.insert(target.as_str()) {
                    return Err(Error::malformed(
                        self.notation,
                        format!("route '{}' is reached by more than one flow", target),
                    ));
                }
                let mut outgoing = pending.iter().filter(|(from, ..)| from == target);
                let (Some((_, next, onward)), None) = (outgoing.next(), outgoing.next()) else {
                    return Err(Error::malformed(
                        self.notation,
                        format!("route '{}' needs exactly one outgoing flow", target),
                    ));
                };
                payload.condition = payload.condition.or_else(|| onward.condition.clone());
                payload.default |= onward.default;
                payload.attributes.extend(onward.attributes.clone());
                target = next;
            }

            let exit = self.elements[source].1.clone();
            let entry = match self.elements.get(target) {
                Some((entry, _)) => entry.clone(),
                None => return Err(self.unknown(target)),
            };
            self.net.create_edge(&exit, &entry, payload)?;
        }

        if let Some(unreached) = self.pass_through.iter().find(|element| !visited.contains(element.as_str())) {
            return Err(Error::malformed(
                self.notation,
                format!("route '{}' is not reached from any activity in net '{}'", unreached, self.net.id),
            ));
        }

        Ok(Translated::new(self.net, self.warnings))
    }

    fn node_mut(&mut self, element: &str) -> Option<&mut Node> {
        self.net.node_mut(&NodeId::new(element))
    }

    fn check_new(&self, element: &str) -> Result<()> {
        if self.elements.contains_key(element) || self.pass_through.contains(element) {
            return Err(Error::malformed(
                self.notation,
                format!("duplicate element id '{}' in net '{}'", element, self.net.id),
            ));
        }
        Ok(())
    }

    fn unknown(&self, element: &str) -> Error {
        Error::malformed(self.notation, format!("flow references unknown element '{}' in net '{}'", element, self.net.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cpf::{EventKind, Task};
    use crate::domain::pattern::{Core, Routing};

    #[test]
    fn test_flows_connect_exit_to_entry() {
        let mut builder = NetBuilder::new(Notation::Yawl, "root", "");
        builder.add_element(&Construct::new("in", "", Core::Event(EventKind::Start)), Attributes::new()).unwrap();
        builder
            .add_element(
                &Construct::new("T", "Task", Core::Task(Task::default())).with_split(Routing::Xor, 2),
                Attributes::new(),
            )
            .unwrap();
        builder.add_element(&Construct::new("out", "", Core::Event(EventKind::End)), Attributes::new()).unwrap();

        builder.connect("in", "T", EdgeAttributes::default()).unwrap();
        let edge = builder.connect("T", "out", EdgeAttributes::conditional("ok")).unwrap().unwrap();

        let net = builder.finish().unwrap().output;
        assert_eq!(net.edge(&edge).unwrap().source, "T.split");
        assert_eq!(net.edge(&edge).unwrap().condition.as_deref(), Some("ok"));
    }

    #[test]
    fn test_duplicate_and_unknown_elements_are_malformed() {
        let mut builder = NetBuilder::new(Notation::Xpdl, "root", "");
        let construct = Construct::new("A", "", Core::Task(Task::default()));
        builder.add_element(&construct, Attributes::new()).unwrap();

        assert!(matches!(
            builder.add_element(&construct, Attributes::new()),
            Err(Error::MalformedDocument { notation: Notation::Xpdl, .. })
        ));
        assert!(matches!(
            builder.connect("A", "missing", EdgeAttributes::default()),
            Err(Error::MalformedDocument { .. })
        ));
    }

    #[test]
    fn test_pass_through_route_becomes_a_plain_flow() {
        let mut builder = NetBuilder::new(Notation::Xpdl, "root", "");
        builder.add_element(&Construct::new("s", "", Core::Event(EventKind::Start)), Attributes::new()).unwrap();
        builder.add_pass_through("g1", Routing::Xor).unwrap();
        builder.add_pass_through("g2", Routing::And).unwrap();
        builder.add_element(&Construct::new("A", "A", Core::Task(Task::default())), Attributes::new()).unwrap();

        assert_eq!(builder.connect("g2", "A", EdgeAttributes::default()).unwrap(), None);
        assert_eq!(builder.connect("s", "g1", EdgeAttributes::conditional("ok")).unwrap(), None);
        assert_eq!(builder.connect("g1", "g2", EdgeAttributes::default()).unwrap(), None);

        let translated = builder.finish().unwrap();
        let net = translated.output;
        assert!(translated.warnings.is_empty());
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 1);
        let edge = net.edges().next().unwrap();
        assert_eq!((edge.source.as_str(), edge.target.as_str()), ("s", "A"));
        assert_eq!(edge.condition.as_deref(), Some("ok"));
    }

    #[test]
    fn test_complex_pass_through_is_flagged() {
        let mut builder = NetBuilder::new(Notation::Xpdl, "root", "");
        builder.add_element(&Construct::new("s", "", Core::Event(EventKind::Start)), Attributes::new()).unwrap();
        builder.add_pass_through("g", Routing::Complex).unwrap();
        builder.add_element(&Construct::new("e", "", Core::Event(EventKind::End)), Attributes::new()).unwrap();
        builder.connect("s", "g", EdgeAttributes::default()).unwrap();
        builder.connect("g", "e", EdgeAttributes::default()).unwrap();

        let translated = builder.finish().unwrap();
        assert_eq!(translated.warnings.len(), 1);
        assert_eq!(translated.warnings[0].element, "g");
        assert_eq!(translated.output.edge_count(), 1);
    }

    #[test]
    fn test_route_cycle_without_activities_is_malformed() {
        let mut builder = NetBuilder::new(Notation::Xpdl, "root", "");
        builder.add_pass_through("g1", Routing::Xor).unwrap();
        builder.add_pass_through("g2", Routing::Xor).unwrap();
        builder.connect("g1", "g2", EdgeAttributes::default()).unwrap();
        builder.connect("g2", "g1", EdgeAttributes::default()).unwrap();

        assert!(matches!(builder.finish(), Err(Error::MalformedDocument { notation: Notation::Xpdl, .. })));
    }

    #[test]
    fn test_generated_id_clash_is_malformed() {
        let mut builder = NetBuilder::new(Notation::Yawl, "root", "");
        builder
            .add_element(
                &Construct::new("T", "Task", Core::Task(Task::default())).with_split(Routing::Xor, 2),
                Attributes::new(),
            )
            .unwrap();

        let result = builder.add_element(&Construct::new("T.split", "", Core::State), Attributes::new());
        assert!(
            matches!(&result, Err(Error::MalformedDocument { notation: Notation::Yawl, reason }) if reason.contains("T.split")),
            "Expected malformed document, got {:?}",
            result
        );
    }
}
