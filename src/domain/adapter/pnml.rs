use std::collections::{HashMap, HashSet};

use bimap::BiHashMap;
use union_find::{QuickUnionUf, UnionBySize, UnionFind};

use crate::api::pnml_dto::{PnmlArcDto, PnmlNetDto, PnmlPlaceDto, PnmlTransitionDto};
use crate::domain::adapter::{Capabilities, FormatAdapter, NetBuilder, Notation, Translated, construct_for, dropped_attributes};
use crate::domain::cpf::{Attributes, EdgeAttributes, EventKind, GatewayKind, Net, NodeId, NodeKind, Task};
use crate::domain::pattern::{Construct, Core, FidelityWarning, Routing};
use crate::error::{Error, Result};

static PNML_CAPABILITIES: Capabilities = Capabilities {
    splits: &[Routing::And, Routing::Xor, Routing::Event],
    joins: &[Routing::And, Routing::Xor, Routing::Event],
    states: true,
    multi_instance: false,
    cancellation: false,
    subnets: false,
    intermediate_events: false,
};

/// Translates place/transition nets.
///
/// Places become states (start and end events at the borders of the net), labelled
/// transitions become tasks that synchronise all input places and mark all output
/// places. Silent transitions are plain AND routing.
#[derive(Debug, Clone, Copy, Default)]
pub struct PnmlAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Place,
    Transition,
}

/// A rendered place or transition.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Place(String),
    Transition(String),
}

/// A group of canonical nodes rendered as one element.
struct Group {
    id: String,
    name: String,
    side: Element,
    marked: bool,
}

#[derive(Default)]
struct Layout {
    places: Vec<PnmlPlaceDto>,
    transitions: Vec<PnmlTransitionDto>,
    arcs: Vec<PnmlArcDto>,
}

impl Layout {
    fn place(&mut self, id: impl Into<String>, name: impl Into<String>, marking: u32) -> Slot {
        let id = id.into();
        self.places.push(PnmlPlaceDto { id: id.clone(), name: name.into(), initial_marking: marking });
        Slot::Place(id)
    }

    fn transition(&mut self, id: impl Into<String>, label: Option<String>) -> Slot {
        let id = id.into();
        self.transitions.push(PnmlTransitionDto { id: id.clone(), label });
        Slot::Transition(id)
    }

    fn arc(&mut self, source: &Slot, target: &Slot) {
        let id = format!("a{}", self.arcs.len() + 1);
        self.arcs.push(PnmlArcDto { id, source: source.id().to_string(), target: target.id().to_string() });
    }
}

impl Slot {
    fn id(&self) -> &str {
        match self {
            Slot::Place(id) | Slot::Transition(id) => id,
        }
    }
}

impl PnmlAdapter {
    pub fn new() -> Self {
        PnmlAdapter
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::malformed(Notation::Pnml, reason)
    }

    fn unsupported(&self, construct: impl Into<String>) -> Error {
        Error::unsupported(Notation::Pnml, construct)
    }

    /// Rejects what no place/transition net can carry and collects what it loses.
    fn check_net(&self, net: &Net) -> Result<Vec<FidelityWarning>> {
        if let Some(subnet) = net.subnets().first() {
            return Err(self.unsupported(format!("sub-net '{}' of net '{}'", subnet.id, net.id)));
        }

        let mut warnings = dropped_attributes(net, Notation::Pnml);
        for node in net.nodes() {
            construct_for(self, net, &node.id)?;
            match &node.kind {
                NodeKind::Task(task) => {
                    if task.subnet.is_some() {
                        return Err(self.unsupported(format!("composite task '{}'", node.id)));
                    }
                    if task.multi_instance.is_some() {
                        return Err(self.unsupported(format!("multiple-instance task '{}'", node.id)));
                    }
                    if !task.cancels.is_empty() {
                        return Err(self.unsupported(format!("cancellation region of task '{}'", node.id)));
                    }
                }
                NodeKind::Event(EventKind::Intermediate) => {
                    return Err(self.unsupported(format!("intermediate event '{}'", node.id)));
                }
                NodeKind::Gateway(gateway) if gateway.kind == GatewayKind::Xor => {
                    warnings.push(FidelityWarning::new(
                        node.id.to_string(),
                        "XOR gateway rendered as a place, the choice is no longer data-based",
                    ));
                }
                _ => {}
            }
            if !node.resources.is_empty() {
                warnings.push(FidelityWarning::new(node.id.to_string(), "resources dropped"));
            }
        }
        for edge in net.edges().filter(|e| e.condition.is_some() || e.default) {
            warnings.push(FidelityWarning::new(edge.id.to_string(), "flow condition dropped"));
        }
        Ok(warnings)
    }
}

fn side(kind: &NodeKind) -> Element {
    match kind {
        NodeKind::Task(_) => Element::Transition,
        NodeKind::Gateway(gateway) if gateway.kind == GatewayKind::And => Element::Transition,
        _ => Element::Place,
    }
}

/// Tasks and events carry identity; gateways and states only route.
fn is_anchor(kind: &NodeKind) -> bool {
    matches!(kind, NodeKind::Task(_) | NodeKind::Event(_))
}

/// Merges chains of routing nodes into their neighbouring element.
///
/// Two nodes on the same side of the net are merged along an edge that is the only exit
/// of its source and the only entry of its target, as long as the group keeps at most
/// one task or event.
fn group_nodes(net: &Net, index: &BiHashMap<NodeId, usize>) -> QuickUnionUf<UnionBySize> {
    let mut groups = QuickUnionUf::<UnionBySize>::new(index.len());
    let mut anchors: Vec<usize> = net.nodes().map(|n| usize::from(is_anchor(&n.kind))).collect();

    for edge in net.edges() {
        let (Some(source), Some(target)) = (net.node(&edge.source), net.node(&edge.target)) else {
            continue;
        };
        if side(&source.kind) != side(&target.kind)
            || net.out_degree(&source.id) != 1
            || net.in_degree(&target.id) != 1
            || (is_anchor(&source.kind) && is_anchor(&target.kind))
        {
            continue;
        }
        let (Some(&a), Some(&b)) = (index.get_by_left(&source.id), index.get_by_left(&target.id)) else {
            continue;
        };

        let (a, b) = (groups.find(a), groups.find(b));
        let count = anchors[a] + anchors[b];
        if a == b || count > 1 {
            continue;
        }
        groups.union(a, b);
        let merged = groups.find(a);
        anchors[merged] = count;
    }
    groups
}

impl FormatAdapter for PnmlAdapter {
    type Document = PnmlNetDto;

    fn notation(&self) -> Notation {
        Notation::Pnml
    }

    fn capabilities(&self) -> &Capabilities {
        &PNML_CAPABILITIES
    }

    fn parse(&self, dto: &PnmlNetDto) -> Result<Translated<Net>> {
        log::debug!("Parsing PNML net '{}'", dto.id);
        let mut builder = NetBuilder::new(Notation::Pnml, &dto.id, &dto.name);

        // Phase 1: Element index and fan-in/fan-out
        let mut elements: HashMap<&str, Element> = HashMap::new();
        let declared = dto
            .places
            .iter()
            .map(|p| (&p.id, Element::Place))
            .chain(dto.transitions.iter().map(|t| (&t.id, Element::Transition)));
        for (id, element) in declared {
            if elements.insert(id.as_str(), element).is_some() {
                return Err(self.malformed(format!("duplicate element id '{}'", id)));
            }
        }

        let mut arcs = HashSet::new();
        let mut fan_in: HashMap<&str, usize> = HashMap::new();
        let mut fan_out: HashMap<&str, usize> = HashMap::new();
        for arc in &dto.arcs {
            if !arcs.insert(arc.id.as_str()) {
                return Err(self.malformed(format!("duplicate arc id '{}'", arc.id)));
            }
            match (elements.get(arc.source.as_str()), elements.get(arc.target.as_str())) {
                (Some(source), Some(target)) if source != target => {}
                (Some(_), Some(_)) => {
                    return Err(self.malformed(format!(
                        "arc '{}' connects {} to {} of the same kind",
                        arc.id, arc.source, arc.target
                    )));
                }
                _ => {
                    return Err(self.malformed(format!("arc '{}' references an unknown element", arc.id)));
                }
            }
            *fan_out.entry(arc.source.as_str()).or_default() += 1;
            *fan_in.entry(arc.target.as_str()).or_default() += 1;
        }
        let fan = |map: &HashMap<&str, usize>, id: &str| map.get(id).copied().unwrap_or(0);

        // Phase 2: Places
        for place in &dto.places {
            let (incoming, outgoing) = (fan(&fan_in, &place.id), fan(&fan_out, &place.id));
            let construct = if incoming == 0 && place.initial_marking > 0 {
                Construct::new(place.id.clone(), place.name.clone(), Core::Event(EventKind::Start))
                    .with_split(Routing::Event, outgoing)
            } else if outgoing == 0 {
                Construct::new(place.id.clone(), place.name.clone(), Core::Event(EventKind::End))
                    .with_join(Routing::Event, incoming)
            } else {
                Construct::new(place.id.clone(), place.name.clone(), Core::State)
                    .with_join(Routing::Event, incoming)
                    .with_split(Routing::Event, outgoing)
            };
            builder.add_element(&construct, Attributes::new())?;

            let start = incoming == 0 && place.initial_marking > 0;
            if place.initial_marking > 1 || (place.initial_marking > 0 && !start) {
                builder.warn(FidelityWarning::new(
                    place.id.clone(),
                    format!("initial marking {} reduced to the start of the net", place.initial_marking),
                ));
            }
        }

        // Phase 3: Transitions
        for transition in &dto.transitions {
            let (incoming, outgoing) = (fan(&fan_in, &transition.id), fan(&fan_out, &transition.id));
            let construct = match &transition.label {
                Some(label) => Construct::new(transition.id.clone(), label.clone(), Core::Task(Task::default()))
                    .with_join(Routing::And, incoming)
                    .with_split(Routing::And, outgoing),
                None if incoming >= 2 || outgoing >= 2 => {
                    Construct::new(transition.id.clone(), String::new(), Core::Route(Routing::And))
                        .with_join(Routing::And, incoming)
                        .with_split(Routing::And, outgoing)
                }
                None => Construct::new(transition.id.clone(), String::new(), Core::Task(Task::default())),
            };
            builder.add_element(&construct, Attributes::new())?;
        }

        // Phase 4: Arcs
        for arc in &dto.arcs {
            builder.connect(&arc.source, &arc.target, EdgeAttributes::default())?;
        }

        let translated = builder.finish()?;
        log::debug!("PNML net '{}' parsed with {} warning(s)", dto.id, translated.warnings.len());
        Ok(translated)
    }

    fn render(&self, net: &Net) -> Result<Translated<PnmlNetDto>> {
        let warnings = self.check_net(net)?;

        // Phase 1: Group routing nodes with their neighbours
        let index: BiHashMap<NodeId, usize> = net.node_ids().iter().cloned().enumerate().map(|(i, id)| (id, i)).collect();
        let mut groups = group_nodes(net, &index);

        let mut order = Vec::new();
        let mut elements: HashMap<usize, Group> = HashMap::new();
        for (i, node) in net.nodes().enumerate() {
            let representative = groups.find(i);
            let group = elements.entry(representative).or_insert_with(|| {
                order.push(representative);
                Group { id: node.id.to_string(), name: node.name.clone(), side: side(&node.kind), marked: false }
            });
            if is_anchor(&node.kind) {
                group.id = node.id.to_string();
                group.name = node.name.clone();
            }
            group.marked |= node.kind.is_event(EventKind::Start);
        }

        // Phase 2: One place or transition per group
        let mut layout = Layout::default();
        let mut slots: HashMap<usize, Slot> = HashMap::new();
        for representative in &order {
            let Some(group) = elements.get(representative) else {
                continue;
            };
            let slot = match group.side {
                Element::Place => layout.place(group.id.clone(), group.name.clone(), u32::from(group.marked)),
                Element::Transition => {
                    let label = (!group.name.is_empty()).then(|| group.name.clone());
                    layout.transition(group.id.clone(), label)
                }
            };
            slots.insert(*representative, slot);
        }

        // Phase 3: Where every node is entered and left
        let mut entries: HashMap<&NodeId, Slot> = HashMap::new();
        let mut exits: HashMap<&NodeId, Slot> = HashMap::new();
        for (i, node) in net.nodes().enumerate() {
            let Some(slot) = slots.get(&groups.find(i)).cloned() else {
                continue;
            };

            // A task continuing on each arrival reads from one shared place.
            let entry = if matches!(node.kind, NodeKind::Task(_)) && net.in_degree(&node.id) >= 2 {
                let merge = layout.place(format!("{}.in", node.id), "", 0);
                layout.arc(&merge, &slot);
                merge
            } else {
                slot.clone()
            };
            // An event starting several branches at once needs a transition.
            let exit = if matches!(node.kind, NodeKind::Event(_)) && net.out_degree(&node.id) >= 2 {
                let split = layout.transition(format!("{}.split", node.id), None);
                layout.arc(&slot, &split);
                split
            } else {
                slot
            };
            entries.insert(&node.id, entry);
            exits.insert(&node.id, exit);
        }

        // Phase 4: Arcs, with buffers between elements of the same kind
        for edge in net.edges() {
            let (Some(exit), Some(entry)) = (exits.get(&edge.source), entries.get(&edge.target)) else {
                continue;
            };
            match (exit, entry) {
                (Slot::Transition(a), Slot::Transition(b)) | (Slot::Place(a), Slot::Place(b))
                    if a == b && edge.source != edge.target => {}
                (Slot::Transition(_), Slot::Transition(_)) => {
                    let buffer = layout.place(format!("{}.buffer", edge.id), "", 0);
                    layout.arc(exit, &buffer);
                    layout.arc(&buffer, entry);
                }
                (Slot::Place(_), Slot::Place(_)) => {
                    let tau = layout.transition(format!("{}.tau", edge.id), None);
                    layout.arc(exit, &tau);
                    layout.arc(&tau, entry);
                }
                _ => layout.arc(exit, entry),
            }
        }

        let dto = PnmlNetDto {
            id: net.id.to_string(),
            name: net.name.clone(),
            places: layout.places,
            transitions: layout.transitions,
            arcs: layout.arcs,
        };
        log::debug!(
            "Rendered net '{}' as {} place(s), {} transition(s), {} arc(s)",
            net.id,
            dto.places.len(),
            dto.transitions.len(),
            dto.arcs.len()
        );
        Ok(Translated::new(dto, warnings))
    }
}
