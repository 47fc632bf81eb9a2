use std::collections::{BTreeSet, HashMap, HashSet};

use crate::api::xpdl_dto::{
    XpdlActivityDto, XpdlActivityKindDto, XpdlGatewayTypeDto, XpdlMultiInstanceLoopDto, XpdlPackageDto,
    XpdlParticipantDto, XpdlProcessDto, XpdlTransitionDto,
};
use crate::domain::adapter::{
    Capabilities, FormatAdapter, NetBuilder, Notation, Translated, check_hierarchy, construct_for, dropped_attributes,
};
use crate::domain::cpf::{
    Attributes, EdgeAttributes, EventKind, GatewayKind, MultiInstance, Net, NetId, NodeId, NodeKind, ResourceId, Task,
};
use crate::domain::pattern::{Construct, Core, FidelityWarning, Routing};
use crate::error::{Error, Result};

static XPDL_CAPABILITIES: Capabilities = Capabilities {
    splits: &[Routing::And, Routing::Or, Routing::Xor, Routing::Event],
    joins: &[Routing::And, Routing::Or, Routing::Xor, Routing::Event],
    states: false,
    multi_instance: true,
    cancellation: false,
    subnets: true,
    intermediate_events: true,
};

/// Translates XPDL packages.
///
/// Route activities become gateways, every other activity keeps its incoming and
/// outgoing transitions as they are (uncontrolled flow). XPDL has no explicit states, so
/// states are rendered as gateways where they route and dropped where they don't.
#[derive(Debug, Clone, Copy, Default)]
pub struct XpdlAdapter;

impl XpdlAdapter {
    pub fn new() -> Self {
        XpdlAdapter
    }

    fn malformed(&self, reason: impl Into<String>) -> Error {
        Error::malformed(Notation::Xpdl, reason)
    }

    fn unsupported(&self, construct: impl Into<String>) -> Error {
        Error::unsupported(Notation::Xpdl, construct)
    }

    //---------------
    // --- Parse ---
    //---------------

    fn parse_process(
        &self,
        dto: &XpdlProcessDto,
        processes: &HashSet<&str>,
        participants: &HashSet<&str>,
    ) -> Result<Translated<Net>> {
        let mut builder = NetBuilder::new(Notation::Xpdl, &dto.id, &dto.name);

        // Phase 1: Fan-in/fan-out of every activity
        let activities: HashSet<&str> = dto.activities.iter().map(|a| a.id.as_str()).collect();
        let mut transitions = HashSet::new();
        let mut fan_in: HashMap<&str, usize> = HashMap::new();
        let mut fan_out: HashMap<&str, usize> = HashMap::new();
        for transition in &dto.transitions {
            if !transitions.insert(transition.id.as_str()) {
                return Err(self.malformed(format!("duplicate transition id '{}' in process '{}'", transition.id, dto.id)));
            }
            for endpoint in [&transition.from, &transition.to] {
                if !activities.contains(endpoint.as_str()) {
                    return Err(self.malformed(format!(
                        "transition '{}' references unknown activity '{}' in process '{}'",
                        transition.id, endpoint, dto.id
                    )));
                }
            }
            *fan_out.entry(transition.from.as_str()).or_default() += 1;
            *fan_in.entry(transition.to.as_str()).or_default() += 1;
        }
        let fan = |map: &HashMap<&str, usize>, id: &str| map.get(id).copied().unwrap_or(0);

        // Phase 2: Activities
        for activity in &dto.activities {
            let core = self.parse_core(activity, processes)?;

            let mut resources = Vec::new();
            for performer in &activity.performers {
                if !participants.contains(performer.as_str()) {
                    return Err(self.malformed(format!(
                        "activity '{}' is performed by unknown participant '{}'",
                        activity.id, performer
                    )));
                }
                resources.push(ResourceId::new(performer.clone()));
            }

            // A route with a single incoming and outgoing transition only passes the flow on.
            if let Core::Route(routing) = core
                && fan(&fan_in, &activity.id) == 1
                && fan(&fan_out, &activity.id) == 1
            {
                builder.add_pass_through(&activity.id, routing)?;
                continue;
            }

            let construct = match core {
                Core::Route(routing) => Construct::new(activity.id.clone(), activity.name.clone(), core)
                    .with_join(routing, fan(&fan_in, &activity.id))
                    .with_split(routing, fan(&fan_out, &activity.id)),
                _ => Construct::new(activity.id.clone(), activity.name.clone(), core),
            };
            builder.add_element(&construct, Attributes::new())?;
            builder.set_resources(&activity.id, resources);
        }

        // Phase 3: Transitions
        for transition in &dto.transitions {
            let payload = EdgeAttributes {
                condition: transition.condition.clone(),
                default: transition.otherwise,
                attributes: Attributes::new(),
            };
            builder.connect(&transition.from, &transition.to, payload)?;
        }

        builder.finish()
    }

    fn parse_core(&self, activity: &XpdlActivityDto, processes: &HashSet<&str>) -> Result<Core> {
        let multi_instance = match &activity.multi_instance_loop {
            Some(mi) => Some(self.parse_loop(activity, mi)?),
            None => None,
        };
        if multi_instance.is_some()
            && !matches!(activity.kind, XpdlActivityKindDto::Task | XpdlActivityKindDto::SubFlow { .. })
        {
            return Err(self.malformed(format!("multi-instance loop on non-task activity '{}'", activity.id)));
        }

        let core = match &activity.kind {
            XpdlActivityKindDto::Task => Core::Task(Task { subnet: None, multi_instance, cancels: Vec::new() }),
            XpdlActivityKindDto::SubFlow { process } => {
                if !processes.contains(process.as_str()) {
                    return Err(self.malformed(format!(
                        "sub-flow '{}' refers to unknown process '{}'",
                        activity.id, process
                    )));
                }
                Core::Task(Task { subnet: Some(NetId::new(process.clone())), multi_instance, cancels: Vec::new() })
            }
            XpdlActivityKindDto::Route { gateway } => Core::Route(gateway_type_routing(*gateway)),
            XpdlActivityKindDto::StartEvent => Core::Event(EventKind::Start),
            XpdlActivityKindDto::EndEvent => Core::Event(EventKind::End),
            XpdlActivityKindDto::IntermediateEvent => Core::Event(EventKind::Intermediate),
        };
        Ok(core)
    }

    fn parse_loop(&self, activity: &XpdlActivityDto, mi: &XpdlMultiInstanceLoopDto) -> Result<MultiInstance> {
        if let Some(maximum) = mi.maximum
            && mi.minimum > maximum
        {
            return Err(self.malformed(format!(
                "activity '{}' has multi-instance minimum {} above maximum {}",
                activity.id, mi.minimum, maximum
            )));
        }
        Ok(MultiInstance { min: mi.minimum, max: mi.maximum, threshold: mi.complex_threshold, dynamic: mi.dynamic })
    }

    //----------------
    // --- Render ---
    //----------------

    fn render_process(
        &self,
        net: &Net,
        processes: &mut Vec<XpdlProcessDto>,
        participants: &mut BTreeSet<String>,
        warnings: &mut Vec<FidelityWarning>,
    ) -> Result<()> {
        warnings.extend(dropped_attributes(net, Notation::Xpdl));

        // Phase 1: States that neither merge nor choose have no XPDL element
        let collapsed: HashSet<&NodeId> = net
            .nodes()
            .filter(|n| n.kind.is_state() && net.in_degree(&n.id) <= 1 && net.out_degree(&n.id) <= 1)
            .map(|n| &n.id)
            .collect();

        // Phase 2: Activities
        let mut activities = Vec::new();
        for node in net.nodes() {
            let kind = match &node.kind {
                NodeKind::Task(task) => {
                    if !task.cancels.is_empty() {
                        return Err(self.unsupported(format!("cancellation region of task '{}'", node.id)));
                    }
                    construct_for(self, net, &node.id)?;
                    match &task.subnet {
                        Some(subnet) => XpdlActivityKindDto::SubFlow { process: subnet.to_string() },
                        None => XpdlActivityKindDto::Task,
                    }
                }
                NodeKind::Event(kind) => {
                    construct_for(self, net, &node.id)?;
                    match kind {
                        EventKind::Start => XpdlActivityKindDto::StartEvent,
                        EventKind::End => XpdlActivityKindDto::EndEvent,
                        EventKind::Intermediate => XpdlActivityKindDto::IntermediateEvent,
                    }
                }
                NodeKind::Gateway(gateway) => {
                    construct_for(self, net, &node.id)?;
                    XpdlActivityKindDto::Route { gateway: gateway_type(gateway.kind) }
                }
                NodeKind::State if collapsed.contains(&node.id) => {
                    warnings.push(FidelityWarning::new(
                        node.id.to_string(),
                        "state dropped, XPDL has no explicit states",
                    ));
                    continue;
                }
                NodeKind::State => {
                    construct_for(self, net, &node.id)?;
                    if net.out_degree(&node.id) < 2 {
                        warnings.push(FidelityWarning::new(
                            node.id.to_string(),
                            "state merge rendered as exclusive gateway",
                        ));
                        XpdlActivityKindDto::Route { gateway: XpdlGatewayTypeDto::Exclusive }
                    } else {
                        XpdlActivityKindDto::Route { gateway: XpdlGatewayTypeDto::EventBased }
                    }
                }
            };

            participants.extend(node.resources.iter().map(ToString::to_string));
            let multi_instance_loop = node.kind.as_task().and_then(|t| t.multi_instance.as_ref()).map(|mi| {
                XpdlMultiInstanceLoopDto {
                    minimum: mi.min,
                    maximum: mi.max,
                    complex_threshold: mi.threshold,
                    dynamic: mi.dynamic,
                }
            });
            activities.push(XpdlActivityDto {
                id: node.id.to_string(),
                name: node.name.clone(),
                kind,
                performers: node.resources.iter().map(ToString::to_string).collect(),
                multi_instance_loop,
            });
        }

        // Phase 3: Transitions, bridging over dropped states
        let mut transitions = Vec::new();
        'edges: for edge in net.edges() {
            if collapsed.contains(&edge.source) {
                continue;
            }
            let mut target = &edge.target;
            let mut condition = edge.condition.clone();
            let mut otherwise = edge.default;
            let mut hops = 0;
            while collapsed.contains(target) {
                let next = net.outgoing(target).first().and_then(|id| net.edge(id));
                match next {
                    Some(next) if hops < net.node_count() => {
                        condition = condition.or_else(|| next.condition.clone());
                        otherwise |= next.default;
                        target = &next.target;
                        hops += 1;
                    }
                    _ => continue 'edges,
                }
            }
            transitions.push(XpdlTransitionDto {
                id: edge.id.to_string(),
                from: edge.source.to_string(),
                to: target.to_string(),
                condition,
                otherwise,
            });
        }

        processes.push(XpdlProcessDto { id: net.id.to_string(), name: net.name.clone(), activities, transitions });

        for subnet in net.subnets() {
            self.render_process(subnet, processes, participants, warnings)?;
        }
        Ok(())
    }
}

fn gateway_type_routing(gateway: XpdlGatewayTypeDto) -> Routing {
    match gateway {
        XpdlGatewayTypeDto::Parallel => Routing::And,
        XpdlGatewayTypeDto::Exclusive => Routing::Xor,
        XpdlGatewayTypeDto::Inclusive => Routing::Or,
        XpdlGatewayTypeDto::EventBased => Routing::Event,
        XpdlGatewayTypeDto::Complex => Routing::Complex,
    }
}

fn gateway_type(kind: GatewayKind) -> XpdlGatewayTypeDto {
    match kind {
        GatewayKind::And => XpdlGatewayTypeDto::Parallel,
        GatewayKind::Or => XpdlGatewayTypeDto::Inclusive,
        GatewayKind::Xor => XpdlGatewayTypeDto::Exclusive,
    }
}

impl FormatAdapter for XpdlAdapter {
    type Document = XpdlPackageDto;

    fn notation(&self) -> Notation {
        Notation::Xpdl
    }

    fn capabilities(&self) -> &Capabilities {
        &XPDL_CAPABILITIES
    }

    fn parse(&self, package: &XpdlPackageDto) -> Result<Translated<Net>> {
        log::debug!("Parsing XPDL package '{}'", package.id);

        // Phase 1: Index processes and participants
        let mut processes: HashMap<&str, &XpdlProcessDto> = HashMap::new();
        for process in &package.workflow_processes {
            if processes.insert(process.id.as_str(), process).is_some() {
                return Err(self.malformed(format!("duplicate workflow process '{}'", process.id)));
            }
        }
        let root = package
            .workflow_processes
            .first()
            .ok_or_else(|| self.malformed(format!("package '{}' has no workflow process", package.id)))?;
        let participants: HashSet<&str> = package.participants.iter().map(|p| p.id.as_str()).collect();

        // Phase 2: Reject recursive sub-flows
        let ids: Vec<&str> = package.workflow_processes.iter().map(|p| p.id.as_str()).collect();
        check_hierarchy(Notation::Xpdl, &ids, |id| {
            processes.get(id).copied().map(|process| {
                process
                    .activities
                    .iter()
                    .filter_map(|a| match &a.kind {
                        XpdlActivityKindDto::SubFlow { process } => Some(process.as_str()),
                        _ => None,
                    })
                    .collect()
            })
        })?;

        // Phase 3: The first process is the root net, the others are its sub-nets
        let process_ids: HashSet<&str> = processes.keys().copied().collect();
        let Translated { output: mut net, mut warnings } = self.parse_process(root, &process_ids, &participants)?;
        for process in package.workflow_processes.iter().skip(1) {
            let subnet = self.parse_process(process, &process_ids, &participants)?;
            warnings.extend(subnet.warnings);
            net.add_subnet(subnet.output)?;
        }

        log::debug!("XPDL package '{}' parsed into net '{}'", package.id, net.id);
        Ok(Translated::new(net, warnings))
    }

    fn render(&self, net: &Net) -> Result<Translated<XpdlPackageDto>> {
        let mut processes = Vec::new();
        let mut participants = BTreeSet::new();
        let mut warnings = Vec::new();
        self.render_process(net, &mut processes, &mut participants, &mut warnings)?;

        let package = XpdlPackageDto {
            id: net.id.to_string(),
            name: net.name.clone(),
            participants: participants.into_iter().map(|id| XpdlParticipantDto { name: id.clone(), id }).collect(),
            workflow_processes: processes,
        };
        Ok(Translated::new(package, warnings))
    }
}
