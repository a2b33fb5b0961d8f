//! Workflow-operator clustering and toolspecific predicates (C3, §4.3).
//!
//! A transition is a *workflow operator* iff its `toolspecific` carries an
//! operator reference. Clustering groups transitions sharing
//! `operator.id`, mirroring `find_workflow_operators` in this system's
//! Python lineage (`workflow_helper.py`): walk every transition once,
//! bucket by `operator.id`, then re-derive each cluster's incoming and
//! outgoing neighborhoods from the net's arc set.

use crate::error::PrivateError;
use crate::pnml::{Net, OperatorRef, OperatorType, Transition};
use anyhow::Result;
use std::collections::HashMap;

pub fn is_workflow_operator(t: &Transition) -> bool {
    t.tool.is_workflow_operator()
}

pub fn is_workflow_trigger(t: &Transition) -> bool {
    t.tool.is_workflow_trigger()
}

pub fn is_workflow_resource(t: &Transition) -> bool {
    t.tool.is_workflow_resource()
}

pub fn is_workflow_subprocess(t: &Transition) -> bool {
    t.tool.is_workflow_subprocess()
}

/// A workflow operator cluster: every transition sharing one `operator.id`,
/// plus the places immediately outside the cluster on either side.
#[derive(Debug, Clone)]
pub struct OperatorCluster {
    pub operator_id: String,
    pub kind: OperatorType,
    pub transition_ids: Vec<String>,
    pub incoming_place_ids: Vec<String>,
    pub outgoing_place_ids: Vec<String>,
}

/// Groups every workflow-operator transition in `net` (non-recursive — does
/// not descend into `net.pages`) into clusters by shared `operator.id`.
///
/// Fails with `InternalTransformationException` if a transition is marked
/// as a workflow operator but carries no operator reference, matching the
/// unconditional `raise Exception("invalid")` this behavior is grounded on.
pub fn find_workflow_operators(net: &Net) -> Result<Vec<OperatorCluster>> {
    let mut by_id: HashMap<String, (OperatorType, Vec<String>)> = HashMap::new();

    for t in &net.transitions {
        if !is_workflow_operator(t) {
            continue;
        }
        let op: &OperatorRef = t.tool.operator.as_ref().ok_or_else(|| {
            PrivateError::InternalTransformationException(format!(
                "transition '{}' marked as workflow operator but has no operator reference",
                t.id
            ))
        })?;
        let entry = by_id
            .entry(op.id.clone())
            .or_insert_with(|| (op.kind, Vec::new()));
        entry.1.push(t.id.clone());
    }

    let mut clusters = Vec::new();
    for (operator_id, (kind, mut transition_ids)) in by_id {
        transition_ids.sort();
        let member_set: std::collections::HashSet<&str> =
            transition_ids.iter().map(|s| s.as_str()).collect();

        let mut incoming = Vec::new();
        let mut outgoing = Vec::new();
        for arc in &net.arcs {
            let source_in_cluster = member_set.contains(arc.source.as_str());
            let target_in_cluster = member_set.contains(arc.target.as_str());
            if target_in_cluster && !source_in_cluster {
                incoming.push(arc.source.clone());
            }
            if source_in_cluster && !target_in_cluster {
                outgoing.push(arc.target.clone());
            }
        }
        incoming.sort();
        incoming.dedup();
        outgoing.sort();
        outgoing.dedup();

        clusters.push(OperatorCluster {
            operator_id,
            kind,
            transition_ids,
            incoming_place_ids: incoming,
            outgoing_place_ids: outgoing,
        });
    }
    clusters.sort_by(|a, b| a.operator_id.cmp(&b.operator_id));
    Ok(clusters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pnml::{Arc, Place, ToolSpecific};

    fn transition(id: &str, operator: Option<OperatorRef>) -> Transition {
        Transition {
            id: id.into(),
            name: None,
            tool: ToolSpecific { operator, ..Default::default() },
        }
    }

    #[test]
    fn clusters_two_transitions_sharing_an_operator_id() {
        let net = Net {
            id: "N".into(),
            places: vec![
                Place { id: "p_in".into(), name: None },
                Place { id: "p_b".into(), name: None },
                Place { id: "p_c".into(), name: None },
            ],
            transitions: vec![
                transition(
                    "b",
                    Some(OperatorRef { id: "op1".into(), kind: OperatorType::XorSplit, position: 0 }),
                ),
                transition(
                    "c",
                    Some(OperatorRef { id: "op1".into(), kind: OperatorType::XorSplit, position: 1 }),
                ),
            ],
            arcs: vec![
                Arc { id: "a1".into(), source: "p_in".into(), target: "b".into() },
                Arc { id: "a2".into(), source: "p_in".into(), target: "c".into() },
                Arc { id: "a3".into(), source: "b".into(), target: "p_b".into() },
                Arc { id: "a4".into(), source: "c".into(), target: "p_c".into() },
            ],
            pages: vec![],
            tool: None,
        };

        let clusters = find_workflow_operators(&net).unwrap();
        assert_eq!(clusters.len(), 1);
        let c = &clusters[0];
        assert_eq!(c.transition_ids, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(c.incoming_place_ids, vec!["p_in".to_string()]);
        assert_eq!(c.outgoing_place_ids, vec!["p_b".to_string(), "p_c".to_string()]);
    }

    #[test]
    fn rejects_operator_flag_without_operator_ref() {
        let net = Net {
            id: "N".into(),
            places: vec![],
            transitions: vec![Transition {
                id: "t".into(),
                name: None,
                tool: ToolSpecific { subprocess: false, ..Default::default() },
            }],
            arcs: vec![],
            pages: vec![],
            tool: None,
        };
        // Not actually a workflow operator (no operator ref), so this must
        // succeed with zero clusters rather than erroring.
        assert!(find_workflow_operators(&net).unwrap().is_empty());
    }
}
