//! Typed BPMN entity tree (§3). Mirrors the shape of PNML's `Net` so the
//! two pipelines in `transform/` read symmetrically.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Message,
    Time,
    Resource,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Generic,
    User,
    Service,
}

impl TaskKind {
    /// The `[UserTask] `/`[ServiceTask] ` name prefix used by the BPMN→WF-net
    /// main translator (§4.4 Stage C). Generic tasks carry no prefix.
    pub fn name_prefix(self) -> Option<&'static str> {
        match self {
            TaskKind::Generic => None,
            TaskKind::User => Some("[UserTask] "),
            TaskKind::Service => Some("[ServiceTask] "),
        }
    }
}

#[derive(Debug, Clone)]
pub enum BpmnNode {
    StartEvent {
        id: String,
        name: Option<String>,
    },
    EndEvent {
        id: String,
        name: Option<String>,
    },
    IntermediateCatchEvent {
        id: String,
        name: Option<String>,
        trigger: TriggerKind,
    },
    Task {
        id: String,
        name: Option<String>,
        kind: TaskKind,
    },
    XorGateway {
        id: String,
        name: Option<String>,
    },
    AndGateway {
        id: String,
        name: Option<String>,
    },
    OrGateway {
        id: String,
        name: Option<String>,
    },
    EventGateway {
        id: String,
        name: Option<String>,
    },
    /// A subprocess is both a node in its enclosing process and the owner
    /// of a nested `Process`.
    SubProcess {
        id: String,
        name: Option<String>,
        process: Box<Process>,
    },
}

impl BpmnNode {
    pub fn id(&self) -> &str {
        match self {
            BpmnNode::StartEvent { id, .. }
            | BpmnNode::EndEvent { id, .. }
            | BpmnNode::IntermediateCatchEvent { id, .. }
            | BpmnNode::Task { id, .. }
            | BpmnNode::XorGateway { id, .. }
            | BpmnNode::AndGateway { id, .. }
            | BpmnNode::OrGateway { id, .. }
            | BpmnNode::EventGateway { id, .. }
            | BpmnNode::SubProcess { id, .. } => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            BpmnNode::StartEvent { name, .. }
            | BpmnNode::EndEvent { name, .. }
            | BpmnNode::IntermediateCatchEvent { name, .. }
            | BpmnNode::Task { name, .. }
            | BpmnNode::XorGateway { name, .. }
            | BpmnNode::AndGateway { name, .. }
            | BpmnNode::OrGateway { name, .. }
            | BpmnNode::EventGateway { name, .. }
            | BpmnNode::SubProcess { name, .. } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Flow {
    pub id: String,
    pub name: Option<String>,
    pub source_ref: String,
    pub target_ref: String,
}

#[derive(Debug, Clone)]
pub struct Lane {
    pub id: String,
    pub name: Option<String>,
    pub flow_node_refs: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct LaneSet {
    pub id: String,
    pub lanes: Vec<Lane>,
}

#[derive(Debug, Clone, Default)]
pub struct Process {
    pub id: String,
    pub nodes: Vec<BpmnNode>,
    pub flows: Vec<Flow>,
    pub lane_sets: Vec<LaneSet>,
    /// Derived by Stage A of the BPMN→WF-net pipeline (§4.4); empty until
    /// `crate::transform::bpmn_to_pnml::map_participants` runs.
    pub participant_mapping: HashMap<String, String>,
}

impl Process {
    pub fn node_by_id(&self, id: &str) -> Option<&BpmnNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// All nested processes, recursively, keyed by id — used by the
    /// equivalence checker (§4.6) and by Stage A lane propagation.
    pub fn collect_all<'a>(&'a self, out: &mut HashMap<&'a str, &'a Process>) {
        out.insert(self.id.as_str(), self);
        for node in &self.nodes {
            if let BpmnNode::SubProcess { process, .. } = node {
                process.collect_all(out);
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: String,
    /// The organization name (the "pool").
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BpmnModel {
    pub process: Process,
    pub participant: Option<Participant>,
}

impl BpmnModel {
    pub fn organization(&self) -> Option<&str> {
        self.participant.as_ref().and_then(|p| p.name.as_deref())
    }
}
