//! The contract between notation documents and canonical nets.
//!
//! Every notation gets its own adapter. Adapters are peers: they share the pattern
//! recognizer and decomposer, not a base implementation.

pub mod builder;
pub mod pnml;
pub mod xpdl;
pub mod yawl;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::config::CanoniserConfig;
use crate::domain::cpf::{Direction, Net, NodeId};
use crate::domain::pattern::{Construct, FidelityWarning, Routing, classify, decompose};
use crate::domain::validation::{Violation, validate};
use crate::error::{Error, Result};

pub use builder::NetBuilder;
pub use pnml::PnmlAdapter;
pub use xpdl::XpdlAdapter;
pub use yawl::YawlAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    Yawl,
    Xpdl,
    Pnml,
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Notation::Yawl => "YAWL",
            Notation::Xpdl => "XPDL",
            Notation::Pnml => "PNML",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Notation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yawl" => Ok(Notation::Yawl),
            "xpdl" => Ok(Notation::Xpdl),
            "pnml" | "petri" => Ok(Notation::Pnml),
            other => Err(format!("unknown notation '{}', expected yawl, xpdl or pnml", other)),
        }
    }
}

/// What a notation can express. Consulted by the decomposer before anything is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub splits: &'static [Routing],
    pub joins: &'static [Routing],
    /// Explicit places/conditions.
    pub states: bool,
    pub multi_instance: bool,
    pub cancellation: bool,
    pub subnets: bool,
    pub intermediate_events: bool,
}

impl Capabilities {
    pub fn supports(&self, direction: Direction, routing: Routing) -> bool {
        match direction {
            Direction::Split => self.splits.contains(&routing),
            Direction::Join => self.joins.contains(&routing),
        }
    }
}

/// A translation result together with everything that was approximated on the way.
#[derive(Debug, Clone)]
pub struct Translated<T> {
    pub output: T,
    pub warnings: Vec<FidelityWarning>,
}

impl<T> Translated<T> {
    pub fn new(output: T, warnings: Vec<FidelityWarning>) -> Self {
        Translated { output, warnings }
    }

    pub fn is_lossless(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Translates one notation to and from canonical nets.
///
/// `parse` fails with `MalformedDocument` when the document breaks the notation's own
/// rules. `render` fails with `UnsupportedConstruct` when the net contains a shape the
/// notation cannot express; anything it can only approximate is reported as a warning.
pub trait FormatAdapter: Send + Sync {
    type Document;

    fn notation(&self) -> Notation;

    fn capabilities(&self) -> &Capabilities;

    fn parse(&self, document: &Self::Document) -> Result<Translated<Net>>;

    fn render(&self, net: &Net) -> Result<Translated<Self::Document>>;
}

/// A parsed and validated canonical net.
#[derive(Debug, Clone)]
pub struct Canonised {
    pub net: Net,
    pub warnings: Vec<FidelityWarning>,
    pub violations: Vec<Violation>,
}

impl Canonised {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// The net, provided it has no structural violations.
    pub fn into_valid(self) -> Result<Net> {
        if self.violations.is_empty() { Ok(self.net) } else { Err(Error::StructuralViolations(self.violations)) }
    }
}

/// Parses `document` into a canonical net and validates it.
///
/// With `strict_validation` violations are returned as `StructuralViolations`,
/// otherwise they are attached to the result for inspection.
pub fn canonise<A: FormatAdapter>(adapter: &A, document: &A::Document, config: &CanoniserConfig) -> Result<Canonised> {
    log::info!("Canonising {} document", adapter.notation());

    let Translated { output: net, warnings } = adapter.parse(document)?;
    check_fidelity(&warnings, config)?;

    let violations = match validate(&net) {
        Ok(()) => Vec::new(),
        Err(violations) => violations,
    };
    for violation in &violations {
        log::warn!("Structural violation {}", violation);
    }
    if config.strict_validation && !violations.is_empty() {
        return Err(Error::StructuralViolations(violations));
    }

    log::info!(
        "Canonical net '{}' built with {} node(s), {} edge(s), {} sub-net(s)",
        net.id,
        net.node_count(),
        net.edge_count(),
        net.subnets().len()
    );
    Ok(Canonised { net, warnings, violations })
}

/// Renders a canonical net. Nets with structural violations are never rendered.
pub fn decanonise<A: FormatAdapter>(adapter: &A, net: &Net, config: &CanoniserConfig) -> Result<Translated<A::Document>> {
    log::info!("Rendering net '{}' as {}", net.id, adapter.notation());

    validate(net).map_err(Error::StructuralViolations)?;
    let translated = adapter.render(net)?;
    check_fidelity(&translated.warnings, config)?;

    Ok(translated)
}

/// Classifies a node and decomposes it for `adapter`'s notation.
pub(crate) fn construct_for<A: FormatAdapter + ?Sized>(adapter: &A, net: &Net, node: &NodeId) -> Result<Construct> {
    let subgraph =
        classify(net, node).ok_or_else(|| Error::UnknownNode { net: net.id.clone(), node: node.clone() })?;
    decompose(&subgraph, adapter.capabilities(), adapter.notation())
}

/// Warnings for node and edge attributes a notation has no place for.
pub(crate) fn dropped_attributes(net: &Net, notation: Notation) -> Vec<FidelityWarning> {
    let mut warnings = Vec::new();
    for node in net.nodes().filter(|n| !n.attributes.is_empty()) {
        warnings.push(FidelityWarning::new(
            node.id.to_string(),
            format!("{} attribute(s) dropped, {} has no equivalent", node.attributes.len(), notation),
        ));
    }
    for edge in net.edges().filter(|e| !e.attributes.is_empty()) {
        warnings.push(FidelityWarning::new(
            edge.id.to_string(),
            format!("{} edge attribute(s) dropped, {} has no equivalent", edge.attributes.len(), notation),
        ));
    }
    warnings
}

/// Rejects recursive decompositions (composite tasks, sub-flows).
///
/// `children` lists the decompositions referenced from inside decomposition `id`, or
/// `None` when `id` does not exist.
pub(crate) fn check_hierarchy<'a, F>(notation: Notation, ids: &[&'a str], children: F) -> Result<()>
where
    F: Fn(&'a str) -> Option<Vec<&'a str>>,
{
    fn visit<'a, F>(
        notation: Notation,
        id: &'a str,
        children: &F,
        path: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<()>
    where
        F: Fn(&'a str) -> Option<Vec<&'a str>>,
    {
        if done.contains(id) {
            return Ok(());
        }
        if path.contains(&id) {
            return Err(Error::malformed(
                notation,
                format!("recursive decomposition {} -> {}", path.join(" -> "), id),
            ));
        }
        let referenced =
            children(id).ok_or_else(|| Error::malformed(notation, format!("unknown decomposition '{}'", id)))?;

        path.push(id);
        for child in referenced {
            visit(notation, child, children, path, done)?;
        }
        path.pop();
        done.insert(id);
        Ok(())
    }

    let mut done = HashSet::new();
    for id in ids {
        visit(notation, id, &children, &mut Vec::new(), &mut done)?;
    }
    Ok(())
}

fn check_fidelity(warnings: &[FidelityWarning], config: &CanoniserConfig) -> Result<()> {
    if warnings.is_empty() || config.allow_fidelity_loss {
        return Ok(());
    }
    let summary = warnings.iter().map(|w| w.to_string()).collect::<Vec<_>>().join("; ");
    Err(Error::FidelityLoss(summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notation_names() {
        assert_eq!("YAWL".parse::<Notation>(), Ok(Notation::Yawl));
        assert_eq!("petri".parse::<Notation>(), Ok(Notation::Pnml));
        assert!("bpmn".parse::<Notation>().is_err());
        assert_eq!(Notation::Xpdl.to_string(), "XPDL");
    }

    #[test]
    fn test_capabilities_by_direction() {
        let capabilities = Capabilities {
            splits: &[Routing::And, Routing::Xor],
            joins: &[Routing::And],
            states: true,
            multi_instance: false,
            cancellation: false,
            subnets: false,
            intermediate_events: false,
        };
        assert!(capabilities.supports(Direction::Split, Routing::Xor));
        assert!(!capabilities.supports(Direction::Join, Routing::Xor));
        assert!(!capabilities.supports(Direction::Split, Routing::Or));
    }

    #[test]
    fn test_adapters_are_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<YawlAdapter>();
        assert_send_sync::<XpdlAdapter>();
        assert_send_sync::<PnmlAdapter>();
        assert_send_sync::<Net>();
    }
}
