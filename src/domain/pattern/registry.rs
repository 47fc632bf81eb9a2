use std::collections::BTreeSet;

use lazy_static::lazy_static;

use crate::domain::cpf::{Direction, GatewayKind, NodeKind};
use crate::domain::pattern::{Pattern, Routing};

/// Observable properties of a routing point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Split,
    Join,
    AllBranches,
    OneBranch,
    SomeBranches,
    /// The branch is decided by a state/token, not by evaluating data.
    StateBased,
}

/// How a pattern is recognised and which canonical node realises it.
#[derive(Debug, Clone)]
pub struct PatternDefinition {
    pub pattern: Pattern,
    pub features: Vec<Feature>,
    pub shape: NodeKind,
}

impl PatternDefinition {
    fn new(pattern: Pattern, features: &[Feature], shape: NodeKind) -> Self {
        PatternDefinition { pattern, features: features.to_vec(), shape }
    }

    pub fn matches(&self, observed: &BTreeSet<Feature>) -> bool {
        self.features.iter().all(|f| observed.contains(f))
    }
}

/// The set of known patterns, ordered from most to least specific.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    definitions: Vec<PatternDefinition>,
}

lazy_static! {
    /// Built once on first use and never mutated afterwards.
    pub static ref PATTERN_REGISTRY: PatternRegistry = PatternRegistry::standard();
}

impl PatternRegistry {
    pub fn standard() -> Self {
        use Feature::*;

        let definitions = vec![
            PatternDefinition::new(Pattern::DeferredChoice, &[Split, OneBranch, StateBased], NodeKind::State),
            PatternDefinition::new(Pattern::StateMerge, &[Join, OneBranch, StateBased], NodeKind::State),
            PatternDefinition::new(Pattern::ParallelSplit, &[Split, AllBranches], NodeKind::split(GatewayKind::And)),
            PatternDefinition::new(Pattern::ExclusiveChoice, &[Split, OneBranch], NodeKind::split(GatewayKind::Xor)),
            PatternDefinition::new(Pattern::MultiChoice, &[Split, SomeBranches], NodeKind::split(GatewayKind::Or)),
            PatternDefinition::new(Pattern::Synchronization, &[Join, AllBranches], NodeKind::join(GatewayKind::And)),
            PatternDefinition::new(Pattern::SimpleMerge, &[Join, OneBranch], NodeKind::join(GatewayKind::Xor)),
            PatternDefinition::new(Pattern::SynchronizingMerge, &[Join, SomeBranches], NodeKind::join(GatewayKind::Or)),
            PatternDefinition::new(Pattern::GenericSplit, &[Split], NodeKind::split(GatewayKind::Or)),
            PatternDefinition::new(Pattern::GenericJoin, &[Join], NodeKind::join(GatewayKind::Or)),
        ];

        PatternRegistry { definitions }
    }

    pub fn definitions(&self) -> &[PatternDefinition] {
        &self.definitions
    }

    pub fn definition(&self, pattern: Pattern) -> Option<&PatternDefinition> {
        self.definitions.iter().find(|d| d.pattern == pattern)
    }

    /// Every definition whose feature set is contained in `observed`.
    pub fn candidates(&self, observed: &BTreeSet<Feature>) -> Vec<&PatternDefinition> {
        self.definitions.iter().filter(|d| d.matches(observed)).collect()
    }

    /// The most specific matching definition, generic gateways included.
    ///
    /// Specificity is the size of the matched feature set; on a tie the definition
    /// registered first wins.
    pub fn resolve(&self, observed: &BTreeSet<Feature>) -> Option<&PatternDefinition> {
        most_specific(self.candidates(observed))
    }

    /// Like [`resolve`](Self::resolve) but never falls back to a generic gateway.
    pub fn resolve_named(&self, observed: &BTreeSet<Feature>) -> Option<&PatternDefinition> {
        most_specific(self.candidates(observed).into_iter().filter(|d| !d.pattern.is_generic()).collect())
    }
}

fn most_specific(candidates: Vec<&PatternDefinition>) -> Option<&PatternDefinition> {
    let mut best: Option<&PatternDefinition> = None;
    for candidate in candidates {
        match best {
            Some(current) if current.features.len() >= candidate.features.len() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Features observed at a notation routing point.
pub fn routing_features(direction: Direction, routing: Routing) -> BTreeSet<Feature> {
    let mut features = BTreeSet::new();
    features.insert(match direction {
        Direction::Split => Feature::Split,
        Direction::Join => Feature::Join,
    });
    match routing {
        Routing::And => {
            features.insert(Feature::AllBranches);
        }
        Routing::Or => {
            features.insert(Feature::SomeBranches);
        }
        Routing::Xor => {
            features.insert(Feature::OneBranch);
        }
        Routing::Event => {
            features.insert(Feature::OneBranch);
            features.insert(Feature::StateBased);
        }
        Routing::Complex => {}
    }
    features
}

/// Features observed at a canonical gateway.
pub fn gateway_features(direction: Direction, kind: GatewayKind) -> BTreeSet<Feature> {
    let routing = match kind {
        GatewayKind::And => Routing::And,
        GatewayKind::Or => Routing::Or,
        GatewayKind::Xor => Routing::Xor,
    };
    routing_features(direction, routing)
}
