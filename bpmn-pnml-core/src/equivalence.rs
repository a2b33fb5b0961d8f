//! Structural equivalence checker (C6, §4.6).
//!
//! Ported from the comparison shape in
//! `transformer/equality/{bpmn,petrinet}.py`: collect every nested
//! container by id, bucket its elements by concrete type, canonicalize
//! each element to a comparison string, and compare the resulting
//! multisets per bucket. A mismatch never raises — it's returned as a
//! diagnostic, the same way `compare_pnml`/`compare_bpmn` do.

use crate::bpmn::{BpmnModel, BpmnNode, Process};
use crate::pnml::{Net, PnNode};
use std::collections::{HashMap, HashSet};

pub struct EquivalenceResult {
    pub equal: bool,
    pub diagnostic: Option<String>,
}

fn comp_string(parts: &[String]) -> String {
    parts.join("|")
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

fn bpmn_node_comp(node: &BpmnNode, process: &Process) -> String {
    let outgoing = sorted(
        process
            .flows
            .iter()
            .filter(|f| f.source_ref == node.id())
            .map(|f| f.id.clone())
            .collect(),
    );
    let incoming = sorted(
        process
            .flows
            .iter()
            .filter(|f| f.target_ref == node.id())
            .map(|f| f.id.clone())
            .collect(),
    );
    comp_string(&[
        node.id().to_string(),
        node.name().unwrap_or("").to_string(),
        outgoing.join(","),
        incoming.join(","),
    ])
}

fn bpmn_flow_comp(flow: &crate::bpmn::Flow) -> String {
    comp_string(&[
        flow.name.clone().unwrap_or_default(),
        flow.source_ref.clone(),
        flow.target_ref.clone(),
    ])
}

fn bpmn_lane_set_comp(lane_set: &crate::bpmn::LaneSet) -> String {
    let mut lanes = lane_set.lanes.clone();
    lanes.sort_by(|a, b| a.id.cmp(&b.id));
    let parts: Vec<String> = lanes
        .iter()
        .map(|l| {
            let refs = sorted(l.flow_node_refs.clone()).join(",");
            format!("{}:{}", l.name.clone().unwrap_or_default(), refs)
        })
        .collect();
    parts.join(";")
}

fn bpmn_type_map(process: &Process) -> HashMap<&'static str, HashSet<String>> {
    let mut map: HashMap<&'static str, HashSet<String>> = HashMap::new();
    for node in &process.nodes {
        let key = match node {
            BpmnNode::StartEvent { .. } => "StartEvent",
            BpmnNode::EndEvent { .. } => "EndEvent",
            BpmnNode::IntermediateCatchEvent { .. } => "IntermediateCatchEvent",
            BpmnNode::Task { .. } => "Task",
            BpmnNode::XorGateway { .. } => "XorGateway",
            BpmnNode::AndGateway { .. } => "AndGateway",
            BpmnNode::OrGateway { .. } => "OrGateway",
            BpmnNode::EventGateway { .. } => "EventGateway",
            BpmnNode::SubProcess { .. } => "SubProcess",
        };
        map.entry(key).or_default().insert(bpmn_node_comp(node, process));
    }
    for flow in &process.flows {
        map.entry("Flow").or_default().insert(bpmn_flow_comp(flow));
    }
    for ls in &process.lane_sets {
        map.entry("LaneSet").or_default().insert(bpmn_lane_set_comp(ls));
    }
    map
}

fn collect_bpmn_containers<'a>(process: &'a Process, out: &mut HashMap<&'a str, &'a Process>) {
    process.collect_all(out);
}

/// Compares two BPMN models for structural equivalence (§4.6).
pub fn compare_bpmn(a: &BpmnModel, b: &BpmnModel) -> EquivalenceResult {
    if a.organization() != b.organization() {
        return EquivalenceResult {
            equal: false,
            diagnostic: Some(format!(
                "different organizations: {:?} vs {:?}",
                a.organization(),
                b.organization()
            )),
        };
    }

    let mut a_containers = HashMap::new();
    collect_bpmn_containers(&a.process, &mut a_containers);
    let mut b_containers = HashMap::new();
    collect_bpmn_containers(&b.process, &mut b_containers);

    let a_ids: HashSet<&str> = a_containers.keys().copied().collect();
    let b_ids: HashSet<&str> = b_containers.keys().copied().collect();
    if a_ids != b_ids {
        return EquivalenceResult {
            equal: false,
            diagnostic: Some(format!(
                "different container ids: only in A: {:?}, only in B: {:?}",
                a_ids.difference(&b_ids).collect::<Vec<_>>(),
                b_ids.difference(&a_ids).collect::<Vec<_>>()
            )),
        };
    }

    let mut errors = Vec::new();
    for id in a_ids {
        let a_types = bpmn_type_map(a_containers[id]);
        let b_types = bpmn_type_map(b_containers[id]);
        diff_type_maps(id, &a_types, &b_types, &mut errors);
    }

    if errors.is_empty() {
        EquivalenceResult { equal: true, diagnostic: None }
    } else {
        EquivalenceResult { equal: false, diagnostic: Some(errors.join("\n")) }
    }
}

fn pn_node_comp(node: &PnNode) -> String {
    let tool = node.as_transition().map(toolspecific_comp).unwrap_or_default();
    comp_string(&[node.id().to_string(), node.name().unwrap_or("").to_string(), tool])
}

fn toolspecific_comp(t: &crate::pnml::Transition) -> String {
    let op = t
        .tool
        .operator
        .as_ref()
        .map(|o| format!("{}:{}:{}", o.id, o.kind.as_str(), o.position))
        .unwrap_or_default();
    let trigger = t
        .tool
        .trigger
        .map(|tr| match tr {
            crate::pnml::TriggerKind::Message => "message",
            crate::pnml::TriggerKind::Time => "time",
            crate::pnml::TriggerKind::Resource => "resource",
        })
        .unwrap_or("");
    let resource = t
        .tool
        .resource
        .as_ref()
        .map(|r| format!("{}:{}", r.role.clone().unwrap_or_default(), r.unit.clone().unwrap_or_default()))
        .unwrap_or_default();
    comp_string(&[op, trigger.to_string(), resource, t.tool.subprocess.to_string()])
}

fn pn_arc_comp(arc: &crate::pnml::Arc) -> String {
    comp_string(&[arc.source.clone(), arc.target.clone()])
}

fn pn_type_map(net: &Net) -> HashMap<&'static str, HashSet<String>> {
    let mut map: HashMap<&'static str, HashSet<String>> = HashMap::new();
    for p in &net.places {
        map.entry("Place")
            .or_default()
            .insert(pn_node_comp(&PnNode::Place(p.clone())));
    }
    for t in &net.transitions {
        map.entry("Transition")
            .or_default()
            .insert(pn_node_comp(&PnNode::Transition(t.clone())));
    }
    for a in &net.arcs {
        map.entry("Arc").or_default().insert(pn_arc_comp(a));
    }
    if let Some(tool) = &net.tool {
        let mut roles = tool.roles.clone();
        roles.sort();
        let mut units = tool.org_units.clone();
        units.sort();
        map.entry("GlobalToolSpecific")
            .or_default()
            .insert(format!("{}|{}", roles.join(","), units.join(",")));
    }
    map
}

/// Compares two PNML nets for structural equivalence (§4.6).
pub fn compare_pnml(a: &Net, b: &Net) -> EquivalenceResult {
    let mut a_nets = HashMap::new();
    a.collect_all(&mut a_nets);
    let mut b_nets = HashMap::new();
    b.collect_all(&mut b_nets);

    let a_ids: HashSet<&str> = a_nets.keys().copied().collect();
    let b_ids: HashSet<&str> = b_nets.keys().copied().collect();
    if a_ids != b_ids {
        return EquivalenceResult {
            equal: false,
            diagnostic: Some(format!(
                "different net ids: only in A: {:?}, only in B: {:?}",
                a_ids.difference(&b_ids).collect::<Vec<_>>(),
                b_ids.difference(&a_ids).collect::<Vec<_>>()
            )),
        };
    }

    let mut errors = Vec::new();
    for id in a_ids {
        let a_types = pn_type_map(a_nets[id]);
        let b_types = pn_type_map(b_nets[id]);
        diff_type_maps(id, &a_types, &b_types, &mut errors);
    }

    if errors.is_empty() {
        EquivalenceResult { equal: true, diagnostic: None }
    } else {
        EquivalenceResult { equal: false, diagnostic: Some(errors.join("\n")) }
    }
}

fn diff_type_maps(
    container_id: &str,
    a: &HashMap<&'static str, HashSet<String>>,
    b: &HashMap<&'static str, HashSet<String>>,
    errors: &mut Vec<String>,
) {
    let keys: HashSet<&&str> = a.keys().chain(b.keys()).collect();
    for key in keys {
        let empty = HashSet::new();
        let a_set = a.get(*key).unwrap_or(&empty);
        let b_set = b.get(*key).unwrap_or(&empty);
        if a_set != b_set {
            let a_to_b: Vec<&String> = a_set.difference(b_set).collect();
            let b_to_a: Vec<&String> = b_set.difference(a_set).collect();
            errors.push(format!(
                "{container_id}\n{key} difference | A-only: {a_to_b:?} | B-only: {b_to_a:?}"
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpmn::{Flow, Process};
    use std::collections::HashMap as Map;

    #[test]
    fn identical_processes_are_equal() {
        let process = Process {
            id: "P".into(),
            nodes: vec![
                BpmnNode::StartEvent { id: "s".into(), name: None },
                BpmnNode::EndEvent { id: "e".into(), name: None },
            ],
            flows: vec![Flow { id: "f1".into(), name: None, source_ref: "s".into(), target_ref: "e".into() }],
            lane_sets: vec![],
            participant_mapping: Map::new(),
        };
        let a = BpmnModel { process: process.clone(), participant: None };
        let b = BpmnModel { process, participant: None };
        assert!(compare_bpmn(&a, &b).equal);
    }

    #[test]
    fn different_node_name_is_not_equal() {
        let mut process_b = Process {
            id: "P".into(),
            nodes: vec![BpmnNode::StartEvent { id: "s".into(), name: Some("X".into()) }],
            flows: vec![],
            lane_sets: vec![],
            participant_mapping: Map::new(),
        };
        let process_a = Process {
            nodes: vec![BpmnNode::StartEvent { id: "s".into(), name: None }],
            ..process_b.clone()
        };
        process_b.id = "P".into();
        let a = BpmnModel { process: process_a, participant: None };
        let b = BpmnModel { process: process_b, participant: None };
        let result = compare_bpmn(&a, &b);
        assert!(!result.equal);
        assert!(result.diagnostic.is_some());
    }
}
