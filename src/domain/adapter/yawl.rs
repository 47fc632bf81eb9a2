use std::collections::{BTreeSet, HashMap, HashSet};

use crate::api::yawl_dto::{
    YawlCodeDto, YawlConditionDto, YawlCreationModeDto, YawlFlowDto, YawlMultiInstanceDto, YawlNetDto, YawlRoleDto,
    YawlSpecificationDto, YawlTaskDto,
};
use crate::domain::adapter::{
    Capabilities, FormatAdapter, NetBuilder, Notation, Translated, check_hierarchy, construct_for, dropped_attributes,
};
use crate::domain::cpf::{
    Attributes, Direction, EdgeAttributes, EventKind, GatewayKind, MultiInstance, Net, NetId, NodeId, NodeKind,
    ResourceId, Task,
};
use crate::domain::pattern::{Construct, Core, FidelityWarning, Routing};
use crate::error::{Error, Result};

static YAWL_CAPABILITIES: Capabilities = Capabilities {
    splits: &[Routing::And, Routing::Or, Routing::Xor, Routing::Event],
    joins: &[Routing::And, Routing::Or, Routing::Xor, Routing::Event],
    states: true,
    multi_instance: true,
    cancellation: true,
    subnets: true,
    intermediate_events: false,
};

/// Translates YAWL specifications.
///
/// Input and output conditions become start and end events, conditions become states
/// and the join/split codes of tasks become gateways around the task.
#[derive(Debug, Clone, Copy, Default)]
pub struct YawlAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Element {
    Input,
    Output,
    Condition,
    Task,
}

impl YawlAdapter {
    pub fn new() -> Self {
        YawlAdapter
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::malformed(Notation::Yawl, reason)
    }

    fn unsupported(&self, construct: impl Into<String>) -> Error {
        Error::unsupported(Notation::Yawl, construct)
    }

    //---------------
    // --- Parse ---
    //---------------

    fn parse_net(&self, dto: &YawlNetDto, nets: &HashMap<&str, &YawlNetDto>, roles: &HashSet<&str>) -> Result<Translated<Net>> {
        let mut builder = NetBuilder::new(Notation::Yawl, &dto.id, &dto.name);

        // Phase 1: Element index and fan-in/fan-out
        let mut elements: HashMap<&str, Element> = HashMap::new();
        let declared = [(&dto.input_condition.id, Element::Input), (&dto.output_condition.id, Element::Output)]
            .into_iter()
            .chain(dto.conditions.iter().map(|c| (&c.id, Element::Condition)))
            .chain(dto.tasks.iter().map(|t| (&t.id, Element::Task)));
        for (id, element) in declared {
            if elements.insert(id.as_str(), element).is_some() {
                return Err(self.malformed(format!("duplicate element id '{}' in net '{}'", id, dto.id)));
            }
        }

        let mut fan_in: HashMap<&str, usize> = HashMap::new();
        let mut fan_out: HashMap<&str, usize> = HashMap::new();
        for flow in &dto.flows {
            let source = elements.get(flow.source.as_str()).copied();
            let target = elements.get(flow.target.as_str()).copied();
            match (source, target) {
                (None, _) | (_, None) => {
                    return Err(self.malformed(format!(
                        "flow {} -> {} references an unknown element in net '{}'",
                        flow.source, flow.target, dto.id
                    )));
                }
                (_, Some(Element::Input)) => {
                    return Err(self.malformed(format!("flow into input condition '{}'", flow.target)));
                }
                (Some(Element::Output), _) => {
                    return Err(self.malformed(format!("flow out of output condition '{}'", flow.source)));
                }
                (Some(Element::Task), _) | (_, Some(Element::Task)) => {}
                _ => {
                    return Err(self.malformed(format!("flow {} -> {} connects two conditions", flow.source, flow.target)));
                }
            }
            *fan_out.entry(flow.source.as_str()).or_default() += 1;
            *fan_in.entry(flow.target.as_str()).or_default() += 1;
        }
        let fan = |map: &HashMap<&str, usize>, id: &str| map.get(id).copied().unwrap_or(0);

        // Phase 2: Elements
        let input = &dto.input_condition;
        let construct = Construct::new(input.id.clone(), input.name.clone(), Core::Event(EventKind::Start))
            .with_split(Routing::Event, fan(&fan_out, &input.id));
        builder.add_element(&construct, Attributes::new())?;

        let output = &dto.output_condition;
        let construct = Construct::new(output.id.clone(), output.name.clone(), Core::Event(EventKind::End))
            .with_join(Routing::Event, fan(&fan_in, &output.id));
        builder.add_element(&construct, Attributes::new())?;

        for condition in &dto.conditions {
            let construct = Construct::new(condition.id.clone(), condition.name.clone(), Core::State)
                .with_join(Routing::Event, fan(&fan_in, &condition.id))
                .with_split(Routing::Event, fan(&fan_out, &condition.id));
            builder.add_element(&construct, Attributes::new())?;
        }

        for task_dto in &dto.tasks {
            let task = self.parse_task(task_dto, &dto.id, nets, &elements)?;
            let construct = Construct::new(task_dto.id.clone(), task_dto.name.clone(), Core::Task(task))
                .with_join(code_routing(task_dto.join), fan(&fan_in, &task_dto.id))
                .with_split(code_routing(task_dto.split), fan(&fan_out, &task_dto.id));
            builder.add_element(&construct, Attributes::new())?;

            let mut resources = Vec::new();
            for role in &task_dto.roles {
                if !roles.contains(role.as_str()) {
                    return Err(self.malformed(format!("task '{}' refers to unknown role '{}'", task_dto.id, role)));
                }
                resources.push(ResourceId::new(role.clone()));
            }
            builder.set_resources(&task_dto.id, resources);
        }

        // Phase 3: Flows
        for flow in &dto.flows {
            let payload = EdgeAttributes {
                condition: flow.predicate.clone(),
                default: flow.is_default,
                attributes: Attributes::new(),
            };
            builder.connect(&flow.source, &flow.target, payload)?;
        }

        builder.finish()
    }

    fn parse_task(
        &self,
        dto: &YawlTaskDto,
        net: &str,
        nets: &HashMap<&str, &YawlNetDto>,
        elements: &HashMap<&str, Element>,
    ) -> Result<Task> {
        let subnet = match &dto.decomposes_to {
            Some(id) if nets.contains_key(id.as_str()) => Some(NetId::new(id.clone())),
            Some(id) => return Err(self.malformed(format!("task '{}' decomposes to unknown net '{}'", dto.id, id))),
            None => None,
        };

        let multi_instance = match &dto.multi_instance {
            Some(mi) => {
                if let Some(maximum) = mi.maximum
                    && mi.minimum > maximum
                {
                    return Err(self.malformed(format!(
                        "task '{}' has multi-instance minimum {} above maximum {}",
                        dto.id, mi.minimum, maximum
                    )));
                }
                Some(MultiInstance {
                    min: mi.minimum,
                    max: mi.maximum,
                    threshold: mi.threshold,
                    dynamic: mi.creation_mode == YawlCreationModeDto::Dynamic,
                })
            }
            None => None,
        };

        let mut cancels = Vec::new();
        for cancelled in &dto.cancels {
            if !elements.contains_key(cancelled.as_str()) {
                return Err(self.malformed(format!(
                    "task '{}' cancels unknown element '{}' of net '{}'",
                    dto.id, cancelled, net
                )));
            }
            cancels.push(NodeId::new(cancelled.clone()));
        }

        Ok(Task { subnet, multi_instance, cancels })
    }

    //----------------
    // --- Render ---
    //----------------

    fn render_net(
        &self,
        net: &Net,
        decompositions: &mut Vec<YawlNetDto>,
        roles: &mut BTreeSet<String>,
        warnings: &mut Vec<FidelityWarning>,
    ) -> Result<()> {
        warnings.extend(dropped_attributes(net, Notation::Yawl));

        let single_event = |kind: EventKind| -> Result<NodeId> {
            let events: Vec<&NodeId> = net.nodes().filter(|n| n.kind.is_event(kind)).map(|n| &n.id).collect();
            match events.as_slice() {
                [event] => Ok((*event).clone()),
                _ => Err(self.unsupported(format!(
                    "net '{}' with {} {:?} events (exactly one is required)",
                    net.id,
                    events.len(),
                    kind
                ))),
            }
        };
        let start = single_event(EventKind::Start)?;
        let end = single_event(EventKind::End)?;

        // Phase 1: Decide which YAWL element every canonical node belongs to
        let mut element_of: HashMap<NodeId, NodeId> = HashMap::new();
        let mut join_codes: HashMap<NodeId, YawlCodeDto> = HashMap::new();
        let mut split_codes: HashMap<NodeId, YawlCodeDto> = HashMap::new();

        let after_start = net.successors(&start);
        if let [next] = after_start.as_slice()
            && net.node(next).is_some_and(|n| n.kind.is_state())
            && net.in_degree(next) == 1
        {
            element_of.insert((*next).clone(), start.clone());
        }
        let before_end = net.predecessors(&end);
        if let [previous] = before_end.as_slice()
            && net.node(previous).is_some_and(|n| n.kind.is_state())
            && net.out_degree(previous) == 1
            && !element_of.contains_key(*previous)
        {
            element_of.insert((*previous).clone(), end.clone());
        }

        for node in net.nodes() {
            match &node.kind {
                NodeKind::Event(EventKind::Intermediate) => {
                    return Err(self.unsupported(format!("intermediate event '{}'", node.id)));
                }
                NodeKind::Gateway(gateway) => {
                    construct_for(self, net, &node.id)?;
                    let (task, codes) = match gateway.direction {
                        Direction::Join => (attached_task(net, &node.id, Direction::Join), &mut join_codes),
                        Direction::Split => (attached_task(net, &node.id, Direction::Split), &mut split_codes),
                    };
                    let task = task.ok_or_else(|| {
                        self.unsupported(format!("gateway '{}' that is not attached to a task", node.id))
                    })?;
                    codes.insert(task.clone(), gateway_code(gateway.kind));
                    element_of.insert(node.id.clone(), task);
                }
                _ => {
                    element_of.entry(node.id.clone()).or_insert_with(|| node.id.clone());
                }
            }
        }

        // Phase 2: Conditions and tasks
        let mut conditions = Vec::new();
        let mut tasks = Vec::new();
        for node in net.nodes() {
            if element_of.get(&node.id) != Some(&node.id) {
                continue;
            }
            match &node.kind {
                NodeKind::State => {
                    construct_for(self, net, &node.id)?;
                    conditions.push(YawlConditionDto { id: node.id.to_string(), name: node.name.clone() });
                }
                NodeKind::Task(task) => {
                    let construct = construct_for(self, net, &node.id)?;
                    let join = match join_codes.get(&node.id) {
                        Some(code) => *code,
                        None => construct.join.map(|p| routing_code(p.routing)).transpose()?.unwrap_or(YawlCodeDto::Xor),
                    };
                    let split = match split_codes.get(&node.id) {
                        Some(code) => *code,
                        None => construct.split.map(|p| routing_code(p.routing)).transpose()?.unwrap_or(YawlCodeDto::And),
                    };
                    roles.extend(node.resources.iter().map(ToString::to_string));

                    let mut cancels: Vec<String> = Vec::new();
                    for cancelled in &task.cancels {
                        let element = element_of.get(cancelled).unwrap_or(cancelled).to_string();
                        if !cancels.contains(&element) {
                            cancels.push(element);
                        }
                    }

                    tasks.push(YawlTaskDto {
                        id: node.id.to_string(),
                        name: node.name.clone(),
                        join,
                        split,
                        decomposes_to: task.subnet.as_ref().map(ToString::to_string),
                        multi_instance: task.multi_instance.as_ref().map(|mi| YawlMultiInstanceDto {
                            minimum: mi.min,
                            maximum: mi.max,
                            threshold: mi.threshold,
                            creation_mode: if mi.dynamic {
                                YawlCreationModeDto::Dynamic
                            } else {
                                YawlCreationModeDto::Static
                            },
                        }),
                        cancels,
                        roles: node.resources.iter().map(ToString::to_string).collect(),
                    });
                }
                _ => {}
            }
        }

        // Phase 3: Flows between elements, with a silent task between two conditions
        let is_condition = |element: &NodeId| {
            *element == start || *element == end || net.node(element).is_some_and(|n| n.kind.is_state())
        };
        let mut flows = Vec::new();
        for edge in net.edges() {
            let (Some(source), Some(target)) = (element_of.get(&edge.source), element_of.get(&edge.target)) else {
                continue;
            };
            if source == target {
                continue;
            }
            if !(is_condition(source) && is_condition(target)) {
                flows.push(YawlFlowDto {
                    source: source.to_string(),
                    target: target.to_string(),
                    predicate: edge.condition.clone(),
                    is_default: edge.default,
                });
                continue;
            }

            let mut bridge = format!("{}.bridge", edge.id);
            while net.contains_node(&NodeId::new(bridge.clone())) {
                bridge.push('_');
            }
            warnings.push(FidelityWarning::new(
                edge.id.to_string(),
                format!("silent task '{}' inserted between conditions '{}' and '{}'", bridge, source, target),
            ));
            tasks.push(YawlTaskDto {
                id: bridge.clone(),
                name: String::new(),
                join: YawlCodeDto::Xor,
                split: YawlCodeDto::And,
                decomposes_to: None,
                multi_instance: None,
                cancels: Vec::new(),
                roles: Vec::new(),
            });
            flows.push(YawlFlowDto {
                source: source.to_string(),
                target: bridge.clone(),
                predicate: edge.condition.clone(),
                is_default: edge.default,
            });
            flows.push(YawlFlowDto { source: bridge, target: target.to_string(), predicate: None, is_default: false });
        }

        let name_of = |id: &NodeId| net.node(id).map(|n| n.name.clone()).unwrap_or_default();
        decompositions.push(YawlNetDto {
            id: net.id.to_string(),
            name: net.name.clone(),
            input_condition: YawlConditionDto { id: start.to_string(), name: name_of(&start) },
            output_condition: YawlConditionDto { id: end.to_string(), name: name_of(&end) },
            conditions,
            tasks,
            flows,
        });

        for subnet in net.subnets() {
            self.render_net(subnet, decompositions, roles, warnings)?;
        }
        Ok(())
    }
}

/// The task a gateway can be folded into: the gateway's only neighbour on the task side,
/// which in turn has no other edge on that side.
fn attached_task(net: &Net, gateway: &NodeId, direction: Direction) -> Option<NodeId> {
    let neighbours = match direction {
        Direction::Join => net.successors(gateway),
        Direction::Split => net.predecessors(gateway),
    };
    let [task] = neighbours.as_slice() else {
        return None;
    };
    let degree = match direction {
        Direction::Join => net.in_degree(task),
        Direction::Split => net.out_degree(task),
    };
    let is_task = net.node(task).is_some_and(|n| n.kind.as_task().is_some());
    (is_task && degree == 1).then(|| (*task).clone())
}

fn code_routing(code: YawlCodeDto) -> Routing {
    match code {
        YawlCodeDto::And => Routing::And,
        YawlCodeDto::Or => Routing::Or,
        YawlCodeDto::Xor => Routing::Xor,
    }
}

fn gateway_code(kind: GatewayKind) -> YawlCodeDto {
    match kind {
        GatewayKind::And => YawlCodeDto::And,
        GatewayKind::Or => YawlCodeDto::Or,
        GatewayKind::Xor => YawlCodeDto::Xor,
    }
}

fn routing_code(routing: Routing) -> Result<YawlCodeDto> {
    match routing {
        Routing::And => Ok(YawlCodeDto::And),
        Routing::Or => Ok(YawlCodeDto::Or),
        Routing::Xor => Ok(YawlCodeDto::Xor),
        Routing::Event | Routing::Complex => Err(Error::unsupported(Notation::Yawl, format!("{} routing on a task", routing))),
    }
}

impl FormatAdapter for YawlAdapter {
    type Document = YawlSpecificationDto;

    fn notation(&self) -> Notation {
        Notation::Yawl
    }

    fn capabilities(&self) -> &Capabilities {
        &YAWL_CAPABILITIES
    }

    fn parse(&self, specification: &YawlSpecificationDto) -> Result<Translated<Net>> {
        log::debug!("Parsing YAWL specification '{}'", specification.uri);

        // Phase 1: Index decompositions and roles
        let mut nets: HashMap<&str, &YawlNetDto> = HashMap::new();
        for net in &specification.decompositions {
            if nets.insert(net.id.as_str(), net).is_some() {
                return Err(self.malformed(format!("duplicate decomposition '{}'", net.id)));
            }
        }
        let root = nets
            .get(specification.root_net.as_str())
            .copied()
            .ok_or_else(|| self.malformed(format!("root net '{}' not found", specification.root_net)))?;
        let roles: HashSet<&str> = specification.roles.iter().map(|r| r.id.as_str()).collect();

        // Phase 2: Reject recursive decompositions
        let ids: Vec<&str> = specification.decompositions.iter().map(|d| d.id.as_str()).collect();
        check_hierarchy(Notation::Yawl, &ids, |id| {
            nets.get(id).copied().map(|net| net.tasks.iter().filter_map(|t| t.decomposes_to.as_deref()).collect())
        })?;

        // Phase 3: Build the root net, every other decomposition becomes one of its sub-nets
        let Translated { output: mut net, mut warnings } = self.parse_net(root, &nets, &roles)?;
        for decomposition in specification.decompositions.iter().filter(|d| d.id != root.id) {
            let subnet = self.parse_net(decomposition, &nets, &roles)?;
            warnings.extend(subnet.warnings);
            net.add_subnet(subnet.output)?;
        }

        log::debug!("YAWL specification '{}' parsed into net '{}'", specification.uri, net.id);
        Ok(Translated::new(net, warnings))
    }

    fn render(&self, net: &Net) -> Result<Translated<YawlSpecificationDto>> {
        let mut decompositions = Vec::new();
        let mut roles = BTreeSet::new();
        let mut warnings = Vec::new();
        self.render_net(net, &mut decompositions, &mut roles, &mut warnings)?;

        let specification = YawlSpecificationDto {
            uri: net.id.to_string(),
            name: net.name.clone(),
            root_net: net.id.to_string(),
            decompositions,
            roles: roles.into_iter().map(|id| YawlRoleDto { name: id.clone(), id }).collect(),
        };
        Ok(Translated::new(specification, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(id: &str) -> YawlConditionDto {
        YawlConditionDto { id: id.to_string(), name: String::new() }
    }

    fn task(id: &str, join: YawlCodeDto, split: YawlCodeDto) -> YawlTaskDto {
        YawlTaskDto {
            id: id.to_string(),
            name: id.to_string(),
            join,
            split,
            decomposes_to: None,
            multi_instance: None,
            cancels: Vec::new(),
            roles: Vec::new(),
        }
    }

    fn flow(source: &str, target: &str) -> YawlFlowDto {
        YawlFlowDto { source: source.to_string(), target: target.to_string(), predicate: None, is_default: false }
    }

    fn specification(net: YawlNetDto) -> YawlSpecificationDto {
        YawlSpecificationDto {
            uri: "spec".to_string(),
            name: String::new(),
            root_net: net.id.clone(),
            decompositions: vec![net],
            roles: Vec::new(),
        }
    }

    /// in -> A (AND split) -> B, C -> D (AND join) -> out
    fn parallel_net() -> YawlNetDto {
        YawlNetDto {
            id: "root".to_string(),
            name: String::new(),
            input_condition: condition("in"),
            output_condition: condition("out"),
            conditions: Vec::new(),
            tasks: vec![
                task("A", YawlCodeDto::Xor, YawlCodeDto::And),
                task("B", YawlCodeDto::Xor, YawlCodeDto::And),
                task("C", YawlCodeDto::Xor, YawlCodeDto::And),
                task("D", YawlCodeDto::And, YawlCodeDto::And),
            ],
            flows: vec![flow("in", "A"), flow("A", "B"), flow("A", "C"), flow("B", "D"), flow("C", "D"), flow("D", "out")],
        }
    }

    #[test]
    fn test_task_codes_become_gateways() {
        let net = YawlAdapter::new().parse(&specification(parallel_net())).unwrap().output;

        assert_eq!(net.node(&NodeId::new("A.split")).unwrap().kind, NodeKind::split(GatewayKind::And));
        assert_eq!(net.node(&NodeId::new("D.join")).unwrap().kind, NodeKind::join(GatewayKind::And));
        assert_eq!(net.node_count(), 8);
        assert_eq!(net.edge_count(), 8);
    }

    #[test]
    fn test_render_folds_gateways_back_into_tasks() {
        let adapter = YawlAdapter::new();
        let document = specification(parallel_net());
        let net = adapter.parse(&document).unwrap().output;
        let rendered = adapter.render(&net).unwrap();

        assert!(rendered.is_lossless());
        assert_eq!(rendered.output.decompositions[0].tasks, document.decompositions[0].tasks);
        assert_eq!(rendered.output.decompositions[0].flows, document.decompositions[0].flows);
    }

    #[test]
    fn test_flow_into_input_condition_is_malformed() {
        let mut net = parallel_net();
        net.flows.push(flow("D", "in"));
        let result = YawlAdapter::new().parse(&specification(net));
        assert!(matches!(result, Err(Error::MalformedDocument { notation: Notation::Yawl, .. })));
    }

    #[test]
    fn test_multi_instance_bounds_are_checked() {
        let mut net = parallel_net();
        net.tasks[1].multi_instance = Some(YawlMultiInstanceDto {
            minimum: 3,
            maximum: Some(2),
            threshold: None,
            creation_mode: YawlCreationModeDto::Static,
        });
        let result = YawlAdapter::new().parse(&specification(net));
        assert!(matches!(result, Err(Error::MalformedDocument { .. })));
    }

    #[test]
    fn test_recursive_decomposition_is_malformed() {
        let mut root = parallel_net();
        root.tasks[1].decomposes_to = Some("sub".to_string());
        let mut sub = parallel_net();
        sub.id = "sub".to_string();
        sub.tasks[2].decomposes_to = Some("root".to_string());

        let mut document = specification(root);
        document.decompositions.push(sub);
        let result = YawlAdapter::new().parse(&document);
        assert!(
            matches!(&result, Err(Error::MalformedDocument { reason, .. }) if reason.contains("recursive")),
            "Expected recursive decomposition error, got {:?}",
            result
        );
    }

    #[test]
    fn test_adjacent_states_are_bridged_by_a_silent_task() {
        let adapter = YawlAdapter::new();
        let mut net = Net::new("root", "");
        let start = net.create_node(NodeKind::Event(EventKind::Start), "", Attributes::new());
        let a = net.create_node(NodeKind::task(), "A", Attributes::new());
        let s1 = net.create_node(NodeKind::State, "", Attributes::new());
        let s2 = net.create_node(NodeKind::State, "", Attributes::new());
        let b = net.create_node(NodeKind::task(), "B", Attributes::new());
        let end = net.create_node(NodeKind::Event(EventKind::End), "", Attributes::new());
        let mut between = None;
        for (source, target) in [(&start, &a), (&a, &s1), (&s1, &s2), (&s2, &b), (&b, &end)] {
            let edge = net.create_edge(source, target, EdgeAttributes::default()).unwrap();
            if source == &s1 {
                between = Some(edge);
            }
        }
        let between = between.unwrap();

        let rendered = adapter.render(&net).unwrap();
        assert_eq!(rendered.warnings.len(), 1);
        assert_eq!(rendered.warnings[0].element, between.to_string());

        let bridge = format!("{}.bridge", between);
        let decomposition = &rendered.output.decompositions[0];
        assert!(decomposition.tasks.iter().any(|t| t.id == bridge && t.name.is_empty()));
        assert!(decomposition.flows.contains(&flow(s1.as_str(), &bridge)));
        assert!(decomposition.flows.contains(&flow(&bridge, s2.as_str())));

        let reparsed = adapter.parse(&rendered.output).unwrap().output;
        assert_eq!(reparsed.node_count(), 7);
        assert_eq!(reparsed.edge_count(), 6);
    }

    #[test]
    fn test_start_connected_to_end_is_bridged() {
        let mut net = Net::new("root", "");
        let start = net.create_node(NodeKind::Event(EventKind::Start), "", Attributes::new());
        let end = net.create_node(NodeKind::Event(EventKind::End), "", Attributes::new());
        net.create_edge(&start, &end, EdgeAttributes::default()).unwrap();

        let adapter = YawlAdapter::new();
        let rendered = adapter.render(&net).unwrap();
        assert_eq!(rendered.warnings.len(), 1);
        assert_eq!(rendered.output.decompositions[0].tasks.len(), 1);
        assert!(adapter.parse(&rendered.output).is_ok());
    }

    #[test]
    fn test_unattached_gateway_is_unsupported() {
        let mut net = Net::new("root", "");
        let start = net.create_node(NodeKind::Event(EventKind::Start), "", Attributes::new());
        let split = net.create_node(NodeKind::split(GatewayKind::Xor), "", Attributes::new());
        let a = net.create_node(NodeKind::task(), "A", Attributes::new());
        let b = net.create_node(NodeKind::task(), "B", Attributes::new());
        let end = net.create_node(NodeKind::Event(EventKind::End), "", Attributes::new());
        for (source, target) in [(&start, &split), (&split, &a), (&split, &b), (&a, &end), (&b, &end)] {
            net.create_edge(source, target, EdgeAttributes::default()).unwrap();
        }

        let result = YawlAdapter::new().render(&net);
        assert!(matches!(result, Err(Error::UnsupportedConstruct { notation: Notation::Yawl, .. })));
    }
}
