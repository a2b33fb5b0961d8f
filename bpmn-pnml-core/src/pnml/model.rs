//! Typed PNML/WF-net entity tree (§3), extended with WoPeD-style
//! toolspecific annotations (§4.3).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorType {
    AndSplit,
    AndJoin,
    XorSplit,
    XorJoin,
    AndJoinSplit,
    XorJoinSplit,
    AndJoinXorSplit,
    XorJoinAndSplit,
    AndSplitJoin,
    XorSplitJoin,
}

impl OperatorType {
    /// Cluster size mandated by §4.3: AND pure splits/joins always collapse
    /// to a single transition carrying every branch arc; XOR pure
    /// splits/joins produce one transition per branch, so any count of two
    /// or more is valid; the combined join+split kinds are always exactly
    /// two transitions.
    pub fn cluster_size_is_valid(self, actual: usize) -> bool {
        use OperatorType::*;
        match self {
            AndSplit | AndJoin => actual == 1,
            XorSplit | XorJoin => actual >= 2,
            AndJoinSplit | XorJoinSplit | AndJoinXorSplit | XorJoinAndSplit | AndSplitJoin
            | XorSplitJoin => actual == 2,
        }
    }

    /// `true` for the AND family (maps to a BPMN `AndGateway`), `false` for
    /// the XOR family (maps to a BPMN `XorGateway`). Combined kinds are
    /// classified by their split side, matching §4.5 Stage B.
    pub fn is_and_family(self) -> bool {
        use OperatorType::*;
        matches!(
            self,
            AndSplit | AndJoin | AndJoinSplit | AndSplitJoin | AndJoinXorSplit
        )
    }

    pub fn as_str(self) -> &'static str {
        use OperatorType::*;
        match self {
            AndSplit => "AndSplit",
            AndJoin => "AndJoin",
            XorSplit => "XorSplit",
            XorJoin => "XorJoin",
            AndJoinSplit => "AndJoinSplit",
            XorJoinSplit => "XorJoinSplit",
            AndJoinXorSplit => "AndJoinXorSplit",
            XorJoinAndSplit => "XorJoinAndSplit",
            AndSplitJoin => "AndSplitJoin",
            XorSplitJoin => "XorSplitJoin",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        use OperatorType::*;
        Some(match s {
            "AndSplit" => AndSplit,
            "AndJoin" => AndJoin,
            "XorSplit" => XorSplit,
            "XorJoin" => XorJoin,
            "AndJoinSplit" => AndJoinSplit,
            "XorJoinSplit" => XorJoinSplit,
            "AndJoinXorSplit" => AndJoinXorSplit,
            "XorJoinAndSplit" => XorJoinAndSplit,
            "AndSplitJoin" => AndSplitJoin,
            "XorSplitJoin" => XorSplitJoin,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Message,
    Time,
    Resource,
}

#[derive(Debug, Clone)]
pub struct OperatorRef {
    pub id: String,
    pub kind: OperatorType,
    pub position: u32,
}

#[derive(Debug, Clone)]
pub struct ResourceRef {
    pub role: Option<String>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ToolSpecific {
    pub operator: Option<OperatorRef>,
    pub trigger: Option<TriggerKind>,
    pub resource: Option<ResourceRef>,
    pub subprocess: bool,
}

impl ToolSpecific {
    pub fn is_workflow_operator(&self) -> bool {
        self.operator.is_some()
    }

    pub fn is_workflow_trigger(&self) -> bool {
        self.trigger.is_some()
    }

    pub fn is_workflow_resource(&self) -> bool {
        self.resource.is_some()
    }

    pub fn is_workflow_subprocess(&self) -> bool {
        self.subprocess
    }
}

#[derive(Debug, Clone)]
pub struct Place {
    pub id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub id: String,
    pub name: Option<String>,
    pub tool: ToolSpecific,
}

/// PN nodes as seen by the shared graph substrate: places and transitions
/// share no fields worth hoisting (§3 invariant 1 forbids same-kind arcs,
/// so the variant itself is load-bearing), so the node payload is a small
/// enum rather than a common base record.
#[derive(Debug, Clone)]
pub enum PnNode {
    Place(Place),
    Transition(Transition),
}

impl PnNode {
    pub fn id(&self) -> &str {
        match self {
            PnNode::Place(p) => &p.id,
            PnNode::Transition(t) => &t.id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            PnNode::Place(p) => p.name.as_deref(),
            PnNode::Transition(t) => t.name.as_deref(),
        }
    }

    pub fn is_place(&self) -> bool {
        matches!(self, PnNode::Place(_))
    }

    pub fn is_transition(&self) -> bool {
        matches!(self, PnNode::Transition(_))
    }

    pub fn as_transition(&self) -> Option<&Transition> {
        match self {
            PnNode::Transition(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_transition_mut(&mut self) -> Option<&mut Transition> {
        match self {
            PnNode::Transition(t) => Some(t),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Arc {
    pub id: String,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Default)]
pub struct GlobalToolSpecific {
    pub roles: Vec<String>,
    pub org_units: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub id: String,
    pub net: Net,
}

#[derive(Debug, Clone, Default)]
pub struct Net {
    pub id: String,
    pub places: Vec<Place>,
    pub transitions: Vec<Transition>,
    pub arcs: Vec<Arc>,
    pub pages: Vec<Page>,
    pub tool: Option<GlobalToolSpecific>,
}

impl Net {
    pub fn get_page(&self, id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == id)
    }

    pub fn get_page_mut(&mut self, id: &str) -> Option<&mut Page> {
        self.pages.iter_mut().find(|p| p.id == id)
    }

    /// All nested nets, recursively, keyed by id — used by the equivalence
    /// checker (§4.6, `get_all_nets_by_id`).
    pub fn collect_all<'a>(&'a self, out: &mut std::collections::HashMap<&'a str, &'a Net>) {
        out.insert(self.id.as_str(), self);
        for page in &self.pages {
            page.net.collect_all(out);
        }
    }
}
