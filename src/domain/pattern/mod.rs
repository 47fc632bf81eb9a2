//! Control-flow patterns: the bridge between notation routing constructs and canonical
//! subgraph shapes.
//!
//! Adapters describe every source element as a [`Construct`]. The recognizer turns a
//! construct into a [`CanonicalSubgraph`], a short chain `[join] -> core -> [split]` that
//! is spliced into the net. The decomposer goes the other way for rendering and refuses
//! shapes the target notation cannot express.

pub mod decomposer;
pub mod instance;
pub mod recognizer;
pub mod registry;

use std::fmt;

use crate::domain::cpf::{Direction, EventKind, NodeId, NodeKind, Task};

pub use decomposer::{classify, decompose};
pub use instance::{PatternInstance, find_instances};
pub use recognizer::{generic_decomposition, recognize, splice};
pub use registry::{Feature, PATTERN_REGISTRY, PatternDefinition, PatternRegistry};

/// Named control-flow idioms, following the workflow-pattern catalogue where one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pattern {
    ParallelSplit,
    Synchronization,
    ExclusiveChoice,
    SimpleMerge,
    MultiChoice,
    SynchronizingMerge,
    DeferredChoice,
    /// Merge through a shared state: whichever branch arrives first marks it.
    StateMerge,
    GenericSplit,
    GenericJoin,
}

impl Pattern {
    pub fn direction(self) -> Direction {
        match self {
            Pattern::ParallelSplit
            | Pattern::ExclusiveChoice
            | Pattern::MultiChoice
            | Pattern::DeferredChoice
            | Pattern::GenericSplit => Direction::Split,
            Pattern::Synchronization
            | Pattern::SimpleMerge
            | Pattern::SynchronizingMerge
            | Pattern::StateMerge
            | Pattern::GenericJoin => Direction::Join,
        }
    }

    /// The notation-side routing a pattern is rendered with.
    pub fn routing(self) -> Routing {
        match self {
            Pattern::ParallelSplit | Pattern::Synchronization => Routing::And,
            Pattern::ExclusiveChoice | Pattern::SimpleMerge => Routing::Xor,
            Pattern::MultiChoice | Pattern::SynchronizingMerge => Routing::Or,
            Pattern::DeferredChoice | Pattern::StateMerge => Routing::Event,
            Pattern::GenericSplit | Pattern::GenericJoin => Routing::Or,
        }
    }

    pub fn is_generic(self) -> bool {
        matches!(self, Pattern::GenericSplit | Pattern::GenericJoin)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Pattern::ParallelSplit => "parallel split",
            Pattern::Synchronization => "synchronization",
            Pattern::ExclusiveChoice => "exclusive choice",
            Pattern::SimpleMerge => "simple merge",
            Pattern::MultiChoice => "multi-choice",
            Pattern::SynchronizingMerge => "synchronizing merge",
            Pattern::DeferredChoice => "deferred choice",
            Pattern::StateMerge => "state merge",
            Pattern::GenericSplit => "generic split",
            Pattern::GenericJoin => "generic join",
        };
        write!(f, "{}", name)
    }
}

/// How a source notation combines or chooses branches at one routing point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Routing {
    And,
    Or,
    Xor,
    /// Decided by whichever branch is triggered first (places, conditions, event gateways).
    Event,
    /// Custom activation rule with no canonical counterpart.
    Complex,
}

impl fmt::Display for Routing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Routing::And => "AND",
            Routing::Or => "OR",
            Routing::Xor => "XOR",
            Routing::Event => "event-based",
            Routing::Complex => "complex",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingPoint {
    pub routing: Routing,
    pub branches: usize,
}

/// What a source element is, apart from its routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Core {
    Task(Task),
    State,
    Event(EventKind),
    /// A pure routing element (gateway, silent transition) with its declared routing.
    Route(Routing),
}

/// A source element as seen by the recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Construct {
    /// Identifier of the element in the source document.
    pub element: String,
    pub name: String,
    pub core: Core,
    pub join: Option<RoutingPoint>,
    pub split: Option<RoutingPoint>,
}

impl Construct {
    pub fn new(element: impl Into<String>, name: impl Into<String>, core: Core) -> Self {
        Construct { element: element.into(), name: name.into(), core, join: None, split: None }
    }

    /// Declares how incoming branches are combined. Ignored below two branches.
    pub fn with_join(mut self, routing: Routing, branches: usize) -> Self {
        if branches >= 2 {
            self.join = Some(RoutingPoint { routing, branches });
        }
        self
    }

    /// Declares how outgoing branches are chosen. Ignored below two branches.
    pub fn with_split(mut self, routing: Routing, branches: usize) -> Self {
        if branches >= 2 {
            self.split = Some(RoutingPoint { routing, branches });
        }
        self
    }

    pub fn point(&self, direction: Direction) -> Option<RoutingPoint> {
        match direction {
            Direction::Join => self.join,
            Direction::Split => self.split,
        }
    }
}

/// Position of a node inside a canonical subgraph chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Join,
    Core,
    Split,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubgraphNode {
    pub role: Role,
    pub kind: NodeKind,
}

/// A pattern matched at one routing point of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    pub pattern: Pattern,
    pub branches: usize,
}

/// The canonical shape of one source element: a chain of nodes connected in order.
///
/// The first node receives the element's incoming flows, the last one emits its
/// outgoing flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSubgraph {
    pub element: String,
    pub name: String,
    pub nodes: Vec<SubgraphNode>,
    pub patterns: Vec<PatternMatch>,
}

impl CanonicalSubgraph {
    /// Identifier the node at `index` receives when spliced into a net.
    ///
    /// The core node keeps the element id (the first node does, for pure routing
    /// elements); auxiliary routing nodes are suffixed with their role.
    pub fn node_id(&self, index: usize) -> NodeId {
        let has_core = self.core().is_some();
        match self.nodes.get(index).map(|n| n.role) {
            Some(Role::Core) => NodeId::new(self.element.clone()),
            _ if !has_core && index == 0 => NodeId::new(self.element.clone()),
            Some(Role::Join) => NodeId::new(format!("{}.join", self.element)),
            Some(Role::Split) => NodeId::new(format!("{}.split", self.element)),
            None => NodeId::new(format!("{}.{}", self.element, index)),
        }
    }

    pub fn entry(&self) -> NodeId {
        self.node_id(0)
    }

    pub fn exit(&self) -> NodeId {
        self.node_id(self.nodes.len().saturating_sub(1))
    }

    pub fn pattern(&self, direction: Direction) -> Option<PatternMatch> {
        self.patterns.iter().copied().find(|m| m.pattern.direction() == direction)
    }

    pub fn core(&self) -> Option<&SubgraphNode> {
        self.nodes.iter().find(|n| n.role == Role::Core)
    }
}

/// Information lost or approximated while translating between notations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FidelityWarning {
    /// Element (source id or canonical node id) the warning is about.
    pub element: String,
    pub message: String,
}

impl FidelityWarning {
    pub fn new(element: impl Into<String>, message: impl Into<String>) -> Self {
        FidelityWarning { element: element.into(), message: message.into() }
    }
}

impl fmt::Display for FidelityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.element, self.message)
    }
}
