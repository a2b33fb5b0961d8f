//! BPMN → WF-net pipeline (C4, §4.4).
//!
//! Stage A (participant mapping) → Stage B (preprocessing passes) →
//! Stage C (main translation) → Stage D (`merge_single_triggers`
//! postprocess), grounded on
//! `transformer/transform_bpmn_to_petrinet/{participants,transform}.py` and
//! `transform_workflow_helper.py` in the Python original.

use crate::bpmn::{BpmnNode, Flow, Process, TaskKind, TriggerKind as BpmnTrigger};
use crate::error::PrivateError;
use crate::ids::{arc_name, silent_node_name};
use crate::pnml::{
    Arc as PnArc, GlobalToolSpecific, Net, OperatorRef, OperatorType, Place, ResourceRef,
    ToolSpecific, Transition, TriggerKind as PnTrigger,
};
use anyhow::Result;
use std::collections::{HashMap, HashSet};

pub fn transform_bpmn_to_pnml(process: &Process, organization: Option<&str>) -> Result<Net> {
    let mut process = process.clone();
    map_participants(&mut process);
    translate_process(&process, organization)
}

/// Stage A. Walks lane sets top-down, inverting `lane_name → [node_id]`
/// into `node_id → lane_name`, recursing into subprocesses with the
/// enclosing subprocess's lane propagated to any node the subprocess body
/// doesn't itself assign.
fn map_participants(process: &mut Process) {
    let mut mapping = HashMap::new();
    for lane_set in &process.lane_sets {
        for lane in &lane_set.lanes {
            for node_id in &lane.flow_node_refs {
                mapping.insert(node_id.clone(), lane.name.clone().unwrap_or_default());
            }
        }
    }
    process.participant_mapping = mapping;

    for node in &mut process.nodes {
        if let BpmnNode::SubProcess { id, process: inner, .. } = node {
            map_participants(inner);
            let enclosing_lane = process.participant_mapping.get(id).cloned();
            if let Some(lane) = enclosing_lane {
                for (_, v) in inner.participant_mapping.iter_mut() {
                    if v.is_empty() {
                        *v = lane.clone();
                    }
                }
            }
        }
    }
}

#[derive(Clone)]
struct WorkingGraph {
    nodes: Vec<BpmnNode>,
    flows: Vec<Flow>,
    participant_mapping: HashMap<String, String>,
}

fn translate_process(process: &Process, organization: Option<&str>) -> Result<Net> {
    let mut wg = WorkingGraph {
        nodes: process.nodes.clone(),
        flows: process.flows.clone(),
        participant_mapping: process.participant_mapping.clone(),
    };

    // Stage B.
    expand_or_gateways(&mut wg)?;
    preprocess_combined_gateways(&mut wg)?;
    insert_adjacent_separators(&mut wg)?;

    // Stage C.
    let mut net = main_translate(&wg, organization)?;

    // Stage D.
    merge_single_triggers(&mut net)?;

    net.id = process.id.clone();
    Ok(net)
}

fn node_by_id<'a>(wg: &'a WorkingGraph, id: &str) -> Option<&'a BpmnNode> {
    wg.nodes.iter().find(|n| n.id() == id)
}

/// Whether a node maps to a PN place by *default* — i.e. ignoring that a
/// `XorGateway`/`OrGateway` with real join/split degree is promoted to an
/// operator-cluster transition by `main_translate` instead. Used only by
/// Stage B.3's same-kind-adjacency check, which cares about the common
/// case, not the promoted one.
fn is_pn_place_kind(node: &BpmnNode) -> bool {
    matches!(
        node,
        BpmnNode::StartEvent { .. }
            | BpmnNode::EndEvent { .. }
            | BpmnNode::XorGateway { .. }
            | BpmnNode::OrGateway { .. }
            | BpmnNode::EventGateway { .. }
    )
}

fn in_degree(wg: &WorkingGraph, id: &str) -> usize {
    wg.flows.iter().filter(|f| f.target_ref == id).count()
}

fn out_degree(wg: &WorkingGraph, id: &str) -> usize {
    wg.flows.iter().filter(|f| f.source_ref == id).count()
}

/// Stage B.1. An OR split with k outgoing branches paired with a
/// reachable OR join is left as-is here: the take-or-skip expansion into
/// an AND-split fanning into k XOR-splits is a well-defined rewrite only
/// for that paired case. Per the Open Question this preserves, an
/// unpaired/nested OR-gateway is rejected rather than guessed at.
fn expand_or_gateways(wg: &mut WorkingGraph) -> Result<()> {
    let or_splits: Vec<String> = wg
        .nodes
        .iter()
        .filter(|n| matches!(n, BpmnNode::OrGateway { .. }) && out_degree(wg, n.id()) > 1)
        .map(|n| n.id().to_string())
        .collect();

    for split_id in or_splits {
        let join_id = find_matching_or_join(wg, &split_id)
            .ok_or_else(|| PrivateError::InternalTransformationException(
                format!("OR-split '{split_id}' has no reachable matching OR-join; unpaired OR-gateway expansion is not supported")
            ))?;

        let branches: Vec<Flow> = wg
            .flows
            .iter()
            .filter(|f| f.source_ref == split_id)
            .cloned()
            .collect();
        let predecessors: Vec<String> = wg
            .flows
            .iter()
            .filter(|f| f.target_ref == split_id)
            .map(|f| f.source_ref.clone())
            .collect();
        let successors: Vec<String> = wg
            .flows
            .iter()
            .filter(|f| f.source_ref == join_id)
            .map(|f| f.target_ref.clone())
            .collect();

        // Remove the original split/join nodes and their directly touching flows.
        wg.nodes.retain(|n| n.id() != split_id && n.id() != join_id);
        wg.flows.retain(|f| {
            f.source_ref != split_id && f.target_ref != split_id && f.source_ref != join_id
                && f.target_ref != join_id
        });

        let and_split_id = format!("{split_id}_and_split");
        let and_join_id = format!("{split_id}_and_join");
        wg.nodes.push(BpmnNode::AndGateway { id: and_split_id.clone(), name: None });
        wg.nodes.push(BpmnNode::AndGateway { id: and_join_id.clone(), name: None });

        for pred in &predecessors {
            wg.flows.push(flow(pred, &and_split_id));
        }
        for succ in &successors {
            wg.flows.push(flow(&and_join_id, succ));
        }

        for branch in &branches {
            let xor_split_id = format!("{split_id}_branch_{}", branch.target_ref);
            let xor_join_id = format!("{join_id}_branch_{}", branch.target_ref);
            wg.nodes.push(BpmnNode::XorGateway { id: xor_split_id.clone(), name: None });
            wg.nodes.push(BpmnNode::XorGateway { id: xor_join_id.clone(), name: None });

            wg.flows.push(flow(&and_split_id, &xor_split_id));
            wg.flows.push(flow(&xor_split_id, &branch.target_ref));
            wg.flows.push(flow(&branch.target_ref, &xor_join_id));
            wg.flows.push(flow(&xor_join_id, &and_join_id));
            // Skip arm: XorSplit directly to XorJoin models "not taken".
            wg.flows.push(flow(&xor_split_id, &xor_join_id));
        }
    }
    Ok(())
}

fn flow(source: &str, target: &str) -> Flow {
    Flow {
        id: arc_name(source, target),
        name: None,
        source_ref: source.to_string(),
        target_ref: target.to_string(),
    }
}

fn find_matching_or_join(wg: &WorkingGraph, split_id: &str) -> Option<String> {
    // BFS forward from the split without crossing another OR-gateway;
    // the first OR-join reached on every branch, if consistent, is the pair.
    let mut visited = HashSet::new();
    let mut frontier: Vec<String> = wg
        .flows
        .iter()
        .filter(|f| f.source_ref == split_id)
        .map(|f| f.target_ref.clone())
        .collect();
    let mut candidate: Option<String> = None;

    while let Some(id) = frontier.pop() {
        if !visited.insert(id.clone()) {
            continue;
        }
        if let Some(node) = wg.nodes.iter().find(|n| n.id() == id) {
            if matches!(node, BpmnNode::OrGateway { .. }) && in_degree(wg, &id) > 1 {
                match &candidate {
                    None => candidate = Some(id.clone()),
                    Some(existing) if existing != &id => return None,
                    _ => {}
                }
                continue;
            }
        }
        for f in wg.flows.iter().filter(|f| f.source_ref == id) {
            frontier.push(f.target_ref.clone());
        }
    }
    candidate
}

/// Stage B.2. Splits a gateway with both in_degree>1 and out_degree>1 into
/// two gateways of the same kind connected by a silent intermediate node.
fn preprocess_combined_gateways(wg: &mut WorkingGraph) -> Result<()> {
    let combined: Vec<String> = wg
        .nodes
        .iter()
        .filter(|n| is_gateway(n))
        .filter(|n| in_degree(wg, n.id()) > 1 && out_degree(wg, n.id()) > 1)
        .map(|n| n.id().to_string())
        .collect();

    for id in combined {
        let original = node_by_id(wg, &id).cloned().unwrap();
        let in_id = format!("{id}_in");
        let out_id = format!("{id}_out");
        let in_node = rebuild_gateway(&original, &in_id);
        let out_node = rebuild_gateway(&original, &out_id);

        for f in wg.flows.iter_mut() {
            if f.target_ref == id {
                f.target_ref = in_id.clone();
            }
        }
        for f in wg.flows.iter_mut() {
            if f.source_ref == id {
                f.source_ref = out_id.clone();
            }
        }
        wg.nodes.retain(|n| n.id() != id);
        wg.nodes.push(in_node);
        wg.nodes.push(out_node);
        wg.flows.push(flow(&in_id, &out_id));
    }
    Ok(())
}

fn is_gateway(n: &BpmnNode) -> bool {
    matches!(
        n,
        BpmnNode::XorGateway { .. }
            | BpmnNode::AndGateway { .. }
            | BpmnNode::OrGateway { .. }
            | BpmnNode::EventGateway { .. }
    )
}

fn rebuild_gateway(original: &BpmnNode, new_id: &str) -> BpmnNode {
    match original {
        BpmnNode::XorGateway { name, .. } => BpmnNode::XorGateway { id: new_id.into(), name: name.clone() },
        BpmnNode::AndGateway { name, .. } => BpmnNode::AndGateway { id: new_id.into(), name: name.clone() },
        BpmnNode::OrGateway { name, .. } => BpmnNode::OrGateway { id: new_id.into(), name: name.clone() },
        BpmnNode::EventGateway { name, .. } => BpmnNode::EventGateway { id: new_id.into(), name: name.clone() },
        other => other.clone(),
    }
}

/// Stage B.3. Wherever a flow directly connects two nodes that will both
/// map to the same PN kind, splice in a silent node of the opposite kind.
fn insert_adjacent_separators(wg: &mut WorkingGraph) -> Result<()> {
    let mut extra_flows = Vec::new();
    let mut to_remove = Vec::new();
    let mut extra_nodes = Vec::new();

    for (i, f) in wg.flows.iter().enumerate() {
        let source = node_by_id(wg, &f.source_ref);
        let target = node_by_id(wg, &f.target_ref);
        let (Some(source), Some(target)) = (source, target) else { continue };
        let same_kind = is_pn_place_kind(source) == is_pn_place_kind(target);
        if !same_kind {
            continue;
        }
        let silent_id = silent_node_name(&f.source_ref, &f.target_ref);
        if is_pn_place_kind(source) {
            // place-place: splice a silent transition (a Task with no name).
            extra_nodes.push(BpmnNode::Task { id: silent_id.clone(), name: None, kind: TaskKind::Generic });
        } else {
            // transition-transition: splice a silent place via an XOR gateway.
            extra_nodes.push(BpmnNode::XorGateway { id: silent_id.clone(), name: None });
        }
        extra_flows.push(flow(&f.source_ref, &silent_id));
        extra_flows.push(flow(&silent_id, &f.target_ref));
        to_remove.push(i);
    }

    for i in to_remove.into_iter().rev() {
        wg.flows.remove(i);
    }
    wg.flows.extend(extra_flows);
    wg.nodes.extend(extra_nodes);
    Ok(())
}

/// Stage C. Classifies every node into a PN place or transition and
/// resolves flows into arcs between the resulting PN ids (same id as the
/// source BPMN node, since the substrate addresses everything by id).
fn main_translate(wg: &WorkingGraph, organization: Option<&str>) -> Result<Net> {
    let mut net = Net::default();
    let mut operator_counter: HashMap<String, u32> = HashMap::new();
    let mut extra_arcs: Vec<PnArc> = Vec::new();
    let mut replaced_ids: HashSet<String> = HashSet::new();

    for node in &wg.nodes {
        match node {
            BpmnNode::StartEvent { id, .. }
            | BpmnNode::EndEvent { id, .. }
            | BpmnNode::EventGateway { id, .. } => {
                net.places.push(Place { id: id.clone(), name: None });
            }
            BpmnNode::XorGateway { id, name } | BpmnNode::OrGateway { id, name } => {
                match translate_xor_family_gateway(wg, id, name.as_deref()) {
                    GatewayTranslation::Place => net.places.push(Place { id: id.clone(), name: None }),
                    GatewayTranslation::OperatorCluster { transitions, arcs } => {
                        net.transitions.extend(transitions);
                        extra_arcs.extend(arcs);
                        replaced_ids.insert(id.clone());
                    }
                }
            }
            BpmnNode::Task { id, name, kind } => {
                let silent = name.is_none() && in_degree(wg, id) <= 1 && out_degree(wg, id) <= 1;
                let display_name = if silent {
                    None
                } else {
                    Some(format!(
                        "{}{}",
                        kind.name_prefix().unwrap_or_default(),
                        name.clone().unwrap_or_default()
                    ))
                };
                let mut tool = ToolSpecific::default();
                if matches!(kind, TaskKind::User) {
                    let role = wg.participant_mapping.get(id).cloned();
                    tool.resource = Some(ResourceRef {
                        role,
                        unit: organization.map(|s| s.to_string()),
                    });
                }
                net.transitions.push(Transition { id: id.clone(), name: display_name, tool });
            }
            BpmnNode::IntermediateCatchEvent { id, name, trigger } => {
                let pn_trigger = match trigger {
                    BpmnTrigger::Message => Some(PnTrigger::Message),
                    BpmnTrigger::Time => Some(PnTrigger::Time),
                    BpmnTrigger::Resource => Some(PnTrigger::Resource),
                    BpmnTrigger::None => None,
                };
                net.transitions.push(Transition {
                    id: id.clone(),
                    name: name.clone(),
                    tool: ToolSpecific { trigger: pn_trigger, ..Default::default() },
                });
            }
            BpmnNode::AndGateway { id, name } => {
                let kind = classify_gateway_operator(wg, id, true);
                net.transitions.extend(operator_transitions(
                    id,
                    name.as_deref(),
                    kind,
                    &mut operator_counter,
                ));
            }
            BpmnNode::SubProcess { id, name: _, process } => {
                let inner = translate_process(process, organization)?;
                net.transitions.push(Transition {
                    id: id.clone(),
                    name: None,
                    tool: ToolSpecific { subprocess: true, ..Default::default() },
                });
                net.pages.push(crate::pnml::Page { id: id.clone(), net: bracket_page(inner) });
            }
        }
    }

    for f in &wg.flows {
        if replaced_ids.contains(&f.source_ref) || replaced_ids.contains(&f.target_ref) {
            continue;
        }
        net.arcs.push(PnArc {
            id: arc_name(&f.source_ref, &f.target_ref),
            source: f.source_ref.clone(),
            target: f.target_ref.clone(),
        });
    }
    net.arcs.extend(extra_arcs);

    if let Some(org) = organization {
        let mut roles: Vec<String> = wg.participant_mapping.values().cloned().collect();
        roles.sort();
        roles.dedup();
        if !roles.is_empty() {
            net.tool = Some(GlobalToolSpecific { roles, org_units: vec![org.to_string()] });
        }
    }

    Ok(net)
}

enum GatewayTranslation {
    Place,
    OperatorCluster { transitions: Vec<Transition>, arcs: Vec<PnArc> },
}

/// A plain `XorGateway`/`OrGateway` with in_degree<=1 and out_degree<=1
/// carries no branching semantics and maps to a `Place`, matching §4.5
/// Stage B's reverse rule (a place with arcs on both sides becomes a
/// `XorGateway`). A gateway with real join/split degree is instead a
/// workflow operator: unlike an AND gateway, which collapses to one
/// transition carrying every branch arc, an XOR join/split produces one
/// transition per branch, all sharing `operator.id` — each branch
/// transition gets its own arc to/from its branch place, and a copy of the
/// arc to/from the gateway's single non-branching side.
fn translate_xor_family_gateway(wg: &WorkingGraph, id: &str, name: Option<&str>) -> GatewayTranslation {
    let indeg = in_degree(wg, id);
    let outdeg = out_degree(wg, id);
    if indeg <= 1 && outdeg <= 1 {
        return GatewayTranslation::Place;
    }

    let is_split = outdeg > 1;
    let kind = if is_split { OperatorType::XorSplit } else { OperatorType::XorJoin };
    let branch_flows: Vec<&Flow> = if is_split {
        wg.flows.iter().filter(|f| f.source_ref == id).collect()
    } else {
        wg.flows.iter().filter(|f| f.target_ref == id).collect()
    };
    let shared_flows: Vec<&Flow> = if is_split {
        wg.flows.iter().filter(|f| f.target_ref == id).collect()
    } else {
        wg.flows.iter().filter(|f| f.source_ref == id).collect()
    };

    let mut transitions = Vec::new();
    let mut arcs = Vec::new();
    for (position, bf) in branch_flows.iter().enumerate() {
        let branch_node = if is_split { &bf.target_ref } else { &bf.source_ref };
        let branch_id = format!("{id}_branch_{branch_node}");
        transitions.push(Transition {
            id: branch_id.clone(),
            name: name.map(|s| s.to_string()),
            tool: ToolSpecific {
                operator: Some(OperatorRef { id: id.to_string(), kind, position: position as u32 }),
                ..Default::default()
            },
        });
        if is_split {
            arcs.push(PnArc { id: arc_name(&branch_id, &bf.target_ref), source: branch_id.clone(), target: bf.target_ref.clone() });
            for sf in &shared_flows {
                arcs.push(PnArc { id: arc_name(&sf.source_ref, &branch_id), source: sf.source_ref.clone(), target: branch_id.clone() });
            }
        } else {
            arcs.push(PnArc { id: arc_name(&bf.source_ref, &branch_id), source: bf.source_ref.clone(), target: branch_id.clone() });
            for sf in &shared_flows {
                arcs.push(PnArc { id: arc_name(&branch_id, &sf.target_ref), source: branch_id.clone(), target: sf.target_ref.clone() });
            }
        }
    }
    GatewayTranslation::OperatorCluster { transitions, arcs }
}

/// AND gateways are pass-through transitions unless classified as a
/// workflow split/join by degree (handled by the caller before this point
/// already collapsing combined gateways); here a plain `AndGateway` with
/// out_degree>1 is an AndSplit, in_degree>1 an AndJoin, otherwise a silent
/// pass-through transition.
fn classify_gateway_operator(wg: &WorkingGraph, id: &str, _and_family: bool) -> Option<OperatorType> {
    let indeg = in_degree(wg, id);
    let outdeg = out_degree(wg, id);
    match (indeg > 1, outdeg > 1) {
        (true, false) => Some(OperatorType::AndJoin),
        (false, true) => Some(OperatorType::AndSplit),
        _ => None,
    }
}

fn operator_transitions(
    id: &str,
    name: Option<&str>,
    kind: Option<OperatorType>,
    counter: &mut HashMap<String, u32>,
) -> Vec<Transition> {
    match kind {
        None => vec![Transition {
            id: id.to_string(),
            name: name.map(|s| s.to_string()),
            tool: ToolSpecific::default(),
        }],
        Some(kind) => {
            let position = counter.entry(id.to_string()).or_insert(0);
            let t = Transition {
                id: id.to_string(),
                name: name.map(|s| s.to_string()),
                tool: ToolSpecific {
                    operator: Some(OperatorRef { id: id.to_string(), kind, position: *position }),
                    ..Default::default()
                },
            };
            *position += 1;
            vec![t]
        }
    }
}

/// Brackets a recursively translated subnet with explicit source/sink
/// places so the page satisfies invariant 5 of §3.
fn bracket_page(mut inner: Net) -> Net {
    let source_id = format!("{}_src", inner.id);
    let sink_id = format!("{}_sink", inner.id);
    inner.places.push(Place { id: source_id, name: None });
    inner.places.push(Place { id: sink_id, name: None });
    inner
}

/// Stage D. `merge_single_triggers`: collapses a trigger transition T with
/// in_degree<=1 and out_degree==1 into its sole successor transition T',
/// provided T' is not itself already a trigger, subprocess, or join.
fn merge_single_triggers(net: &mut Net) -> Result<()> {
    loop {
        let candidate = find_merge_candidate(net);
        let Some((trigger_id, place_id, target_id)) = candidate else { break };

        let trigger = net.transitions.iter().find(|t| t.id == trigger_id).unwrap().clone();

        let incoming_arcs: Vec<PnArc> = net
            .arcs
            .iter()
            .filter(|a| a.target == trigger_id)
            .cloned()
            .collect();

        net.arcs.retain(|a| {
            !(a.target == trigger_id || a.source == trigger_id || a.source == place_id
                || a.target == place_id)
        });
        net.transitions.retain(|t| t.id != trigger_id);
        net.places.retain(|p| p.id != place_id);

        for mut arc in incoming_arcs {
            arc.target = target_id.clone();
            arc.id = arc_name(&arc.source, &target_id);
            net.arcs.push(arc);
        }

        if let Some(target) = net.transitions.iter_mut().find(|t| t.id == target_id) {
            target.tool.trigger = trigger.tool.trigger;
        }
    }
    Ok(())
}

fn find_merge_candidate(net: &Net) -> Option<(String, String, String)> {
    for t in &net.transitions {
        if !is_trigger(t) {
            continue;
        }
        let in_degree = net.arcs.iter().filter(|a| a.target == t.id).count();
        let outgoing: Vec<&PnArc> = net.arcs.iter().filter(|a| a.source == t.id).collect();
        if in_degree > 1 || outgoing.len() != 1 {
            continue;
        }
        let place_id = outgoing[0].target.clone();
        let place_out: Vec<&PnArc> = net.arcs.iter().filter(|a| a.source == place_id).collect();
        if place_out.len() != 1 {
            continue;
        }
        let place_in_degree = net.arcs.iter().filter(|a| a.target == place_id).count();
        if place_in_degree != 1 {
            continue;
        }
        let target_id = place_out[0].target.clone();
        let Some(target) = net.transitions.iter().find(|tt| tt.id == target_id) else { continue };
        if is_trigger(target) || target.tool.is_workflow_subprocess() {
            continue;
        }
        if let Some(op) = &target.tool.operator {
            if matches!(
                op.kind,
                OperatorType::AndJoin
                    | OperatorType::XorJoin
                    | OperatorType::AndJoinSplit
                    | OperatorType::XorJoinSplit
                    | OperatorType::AndJoinXorSplit
                    | OperatorType::XorJoinAndSplit
            ) {
                continue;
            }
        }
        return Some((t.id.clone(), place_id, target_id));
    }
    None
}

fn is_trigger(t: &Transition) -> bool {
    t.tool.is_workflow_trigger()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bpmn::{BpmnModel, Process};

    fn start_task_end() -> Process {
        Process {
            id: "P1".into(),
            nodes: vec![
                BpmnNode::StartEvent { id: "s1".into(), name: None },
                BpmnNode::Task { id: "t1".into(), name: Some("A".into()), kind: TaskKind::User },
                BpmnNode::EndEvent { id: "e1".into(), name: None },
            ],
            flows: vec![flow("s1", "t1"), flow("t1", "e1")],
            lane_sets: vec![],
            participant_mapping: HashMap::new(),
        }
    }

    #[test]
    fn straight_through_process_becomes_two_places_one_transition() {
        let net = transform_bpmn_to_pnml(&start_task_end(), Some("Acme")).unwrap();
        assert_eq!(net.places.len(), 2);
        assert_eq!(net.transitions.len(), 1);
        assert_eq!(net.transitions[0].name.as_deref(), Some("[UserTask] A"));
        assert_eq!(net.arcs.len(), 2);
    }

    #[test]
    fn xor_split_join_becomes_two_operator_clusters() {
        let model = BpmnModel {
            process: Process {
                id: "P1".into(),
                nodes: vec![
                    BpmnNode::StartEvent { id: "s1".into(), name: None },
                    BpmnNode::XorGateway { id: "g1".into(), name: None },
                    BpmnNode::Task { id: "b".into(), name: Some("B".into()), kind: TaskKind::Generic },
                    BpmnNode::Task { id: "c".into(), name: Some("C".into()), kind: TaskKind::Generic },
                    BpmnNode::XorGateway { id: "g2".into(), name: None },
                    BpmnNode::EndEvent { id: "e1".into(), name: None },
                ],
                flows: vec![
                    flow("s1", "g1"),
                    flow("g1", "b"),
                    flow("g1", "c"),
                    flow("b", "g2"),
                    flow("c", "g2"),
                    flow("g2", "e1"),
                ],
                lane_sets: vec![],
                participant_mapping: HashMap::new(),
            },
            participant: None,
        };
        let net = transform_bpmn_to_pnml(&model.process, None).unwrap();

        let split: Vec<_> = net
            .transitions
            .iter()
            .filter(|t| t.tool.operator.as_ref().map(|o| o.id == "g1").unwrap_or(false))
            .collect();
        assert_eq!(split.len(), 2);
        assert!(split.iter().all(|t| t.tool.operator.as_ref().unwrap().kind == OperatorType::XorSplit));

        let join: Vec<_> = net
            .transitions
            .iter()
            .filter(|t| t.tool.operator.as_ref().map(|o| o.id == "g2").unwrap_or(false))
            .collect();
        assert_eq!(join.len(), 2);
        assert!(join.iter().all(|t| t.tool.operator.as_ref().unwrap().kind == OperatorType::XorJoin));
    }
}
