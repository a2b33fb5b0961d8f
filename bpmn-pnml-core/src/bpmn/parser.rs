//! Streaming BPMN 2.0 XML reader.
//!
//! Hand-written over `quick_xml`'s pull cursor rather than a declarative
//! attribute-binding macro, in the style of this lineage's original BPMN
//! reader: a small explicit state machine keyed on the element's local
//! name (namespace-prefix stripped), pushing finished nodes/flows onto the
//! in-progress `Process` as each closing tag is seen.

use super::model::{BpmnModel, BpmnNode, Flow, Lane, LaneSet, Participant, Process, TaskKind, TriggerKind};
use crate::error::{KnownError, PrivateError};
use anyhow::Result;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// Which element is currently accumulating child state (trigger
/// definitions, lane member refs) between its start and end tag.
enum Open {
    IntermediateCatchEvent { id: String, name: Option<String> },
    Lane { id: String, name: Option<String>, refs: Vec<String> },
}

/// A nested `<subProcess>` body being accumulated. Mirrors
/// `pnml::parser`'s `page_stack`: the outermost frame (pushed once, never
/// popped) is the top-level `<process>`; each non-empty `<subProcess>`
/// pushes a fresh frame carrying the id/name it will be wrapped back into
/// a `BpmnNode::SubProcess` under once its closing tag is seen.
struct ProcessFrame {
    subprocess: Option<(String, Option<String>)>,
    process: Process,
}

pub fn parse_bpmn(xml: &str) -> Result<BpmnModel> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<ProcessFrame> = vec![ProcessFrame { subprocess: None, process: Process::default() }];
    let mut participant: Option<Participant> = None;
    let mut lane_set: Option<LaneSet> = None;
    let mut open: Option<Open> = None;
    let mut in_flow_node_ref = false;
    let mut saw_process = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                handle_open(
                    e,
                    false,
                    &mut stack,
                    &mut participant,
                    &mut lane_set,
                    &mut open,
                    &mut in_flow_node_ref,
                    &mut saw_process,
                )?
            }
            Ok(Event::Empty(ref e)) => {
                handle_open(
                    e,
                    true,
                    &mut stack,
                    &mut participant,
                    &mut lane_set,
                    &mut open,
                    &mut in_flow_node_ref,
                    &mut saw_process,
                )?
            }
            Ok(Event::End(ref e)) => {
                let local = local_name(e.name().as_ref());
                handle_close(&local, &mut stack, &mut lane_set, &mut open, &mut in_flow_node_ref)?
            }
            Ok(Event::Text(ref e)) => {
                if in_flow_node_ref {
                    if let Some(Open::Lane { refs, .. }) = open.as_mut() {
                        let text = e.unescape()?.trim().to_string();
                        if !text.is_empty() {
                            refs.push(text);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(KnownError::MalformedInput(format!("XML parse error: {e}")).into())
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_process {
        return Err(KnownError::MalformedInput("no <process> element found".into()).into());
    }
    if stack.len() != 1 {
        return Err(KnownError::MalformedInput("unclosed <subProcess> element".into()).into());
    }

    Ok(BpmnModel { process: stack.pop().expect("root frame always present").process, participant })
}

#[allow(clippy::too_many_arguments)]
fn handle_open(
    e: &BytesStart,
    is_empty: bool,
    stack: &mut Vec<ProcessFrame>,
    participant: &mut Option<Participant>,
    lane_set: &mut Option<LaneSet>,
    open: &mut Option<Open>,
    in_flow_node_ref: &mut bool,
    saw_process: &mut bool,
) -> Result<()> {
    let local = local_name(e.name().as_ref());

    if local == "subProcess" {
        let id = get_attr(e, "id")?;
        let name = get_attr_opt(e, "name");
        if is_empty {
            stack
                .last_mut()
                .expect("process stack never empty")
                .process
                .nodes
                .push(BpmnNode::SubProcess { id, name, process: Box::new(Process::default()) });
        } else {
            stack.push(ProcessFrame { subprocess: Some((id, name)), process: Process::default() });
        }
        return Ok(());
    }

    let process = &mut stack.last_mut().expect("process stack never empty").process;
    match local.as_str() {
        "process" => {
            *saw_process = true;
            process.id = get_attr_opt(e, "id").unwrap_or_default();
        }
        "participant" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            *participant = Some(Participant { id, name });
        }
        "startEvent" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::StartEvent { id, name });
        }
        "endEvent" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::EndEvent { id, name });
        }
        "intermediateCatchEvent" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            if is_empty {
                process.nodes.push(BpmnNode::IntermediateCatchEvent {
                    id,
                    name,
                    trigger: TriggerKind::None,
                });
            } else {
                *open = Some(Open::IntermediateCatchEvent { id, name });
            }
        }
        "timerEventDefinition" => {
            if let Some(Open::IntermediateCatchEvent { id, name }) = open.take() {
                process.nodes.push(BpmnNode::IntermediateCatchEvent {
                    id,
                    name,
                    trigger: TriggerKind::Time,
                });
            }
        }
        "messageEventDefinition" => {
            if let Some(Open::IntermediateCatchEvent { id, name }) = open.take() {
                process.nodes.push(BpmnNode::IntermediateCatchEvent {
                    id,
                    name,
                    trigger: TriggerKind::Message,
                });
            }
        }
        "task" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::Task { id, name, kind: TaskKind::Generic });
        }
        "userTask" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::Task { id, name, kind: TaskKind::User });
        }
        "serviceTask" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::Task { id, name, kind: TaskKind::Service });
        }
        "exclusiveGateway" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::XorGateway { id, name });
        }
        "parallelGateway" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::AndGateway { id, name });
        }
        "inclusiveGateway" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::OrGateway { id, name });
        }
        "eventBasedGateway" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            process.nodes.push(BpmnNode::EventGateway { id, name });
        }
        "sequenceFlow" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            let source_ref = get_attr(e, "sourceRef")?;
            let target_ref = get_attr(e, "targetRef")?;
            process.flows.push(Flow { id, name, source_ref, target_ref });
        }
        "laneSet" => {
            let id = get_attr_opt(e, "id").unwrap_or_else(|| format!("{}_laneSet", process.id));
            *lane_set = Some(LaneSet { id, lanes: Vec::new() });
        }
        "lane" => {
            let id = get_attr(e, "id")?;
            let name = get_attr_opt(e, "name");
            *open = Some(Open::Lane { id, name, refs: Vec::new() });
        }
        "flowNodeRef" => {
            *in_flow_node_ref = true;
        }
        _ => {}
    }
    Ok(())
}

fn handle_close(
    local: &str,
    stack: &mut Vec<ProcessFrame>,
    lane_set: &mut Option<LaneSet>,
    open: &mut Option<Open>,
    in_flow_node_ref: &mut bool,
) -> Result<()> {
    if local == "subProcess" && stack.len() > 1 {
        let frame = stack.pop().expect("checked len() > 1 above");
        if let Some((id, name)) = frame.subprocess {
            stack
                .last_mut()
                .expect("process stack never empty")
                .process
                .nodes
                .push(BpmnNode::SubProcess { id, name, process: Box::new(frame.process) });
        }
        return Ok(());
    }

    let process = &mut stack.last_mut().expect("process stack never empty").process;
    match local {
        "flowNodeRef" => *in_flow_node_ref = false,
        "lane" => {
            if let Some(Open::Lane { id, name, refs }) = open.take() {
                let name = match (name, refs.is_empty()) {
                    (None, false) => return Err(KnownError::UnnamedLane(id).into()),
                    (name, _) => name,
                };
                let lanes = &mut lane_set
                    .as_mut()
                    .ok_or_else(|| {
                        PrivateError::InternalTransformationException(
                            "</lane> outside <laneSet>".into(),
                        )
                    })?
                    .lanes;
                lanes.push(Lane { id, name, flow_node_refs: refs });
            }
        }
        "laneSet" => {
            if let Some(ls) = lane_set.take() {
                process.lane_sets.push(ls);
            }
        }
        _ => {}
    }
    Ok(())
}

fn local_name(name: &[u8]) -> String {
    let s = std::str::from_utf8(name).unwrap_or("");
    match s.rfind(':') {
        Some(pos) => s[pos + 1..].to_string(),
        None => s.to_string(),
    }
}

fn get_attr(e: &BytesStart, name: &str) -> Result<String> {
    get_attr_opt(e, name)
        .ok_or_else(|| KnownError::MalformedInput(format!("missing required attribute '{name}'")).into())
}

fn get_attr_opt(e: &BytesStart, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if local_name(attr.key.as_ref()) == name {
            attr.unescape_value().ok().map(|v| v.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_straight_through_process() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <process id="P1">
    <startEvent id="s1"/>
    <task id="t1" name="Do thing"/>
    <endEvent id="e1"/>
    <sequenceFlow id="f1" sourceRef="s1" targetRef="t1"/>
    <sequenceFlow id="f2" sourceRef="t1" targetRef="e1"/>
  </process>
</definitions>"#;
        let model = parse_bpmn(xml).unwrap();
        assert_eq!(model.process.nodes.len(), 3);
        assert_eq!(model.process.flows.len(), 2);
        assert!(matches!(
            model.process.node_by_id("t1"),
            Some(BpmnNode::Task { kind: TaskKind::Generic, .. })
        ));
    }

    #[test]
    fn rejects_missing_process_element() {
        let xml = r#"<?xml version="1.0"?><definitions/>"#;
        assert!(parse_bpmn(xml).is_err());
    }

    #[test]
    fn parses_a_nested_subprocess_body() {
        let xml = r#"<?xml version="1.0"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <process id="P1">
    <startEvent id="s1"/>
    <subProcess id="sub1" name="Inner work">
      <startEvent id="is1"/>
      <task id="it1" name="Inner task"/>
      <endEvent id="ie1"/>
      <sequenceFlow id="if1" sourceRef="is1" targetRef="it1"/>
      <sequenceFlow id="if2" sourceRef="it1" targetRef="ie1"/>
    </subProcess>
    <endEvent id="e1"/>
    <sequenceFlow id="f1" sourceRef="s1" targetRef="sub1"/>
    <sequenceFlow id="f2" sourceRef="sub1" targetRef="e1"/>
  </process>
</definitions>"#;
        let model = parse_bpmn(xml).unwrap();
        assert_eq!(model.process.nodes.len(), 3);
        let sub = model.process.node_by_id("sub1").expect("sub1 present");
        let BpmnNode::SubProcess { name, process: inner, .. } = sub else {
            panic!("expected a SubProcess node, got {sub:?}");
        };
        assert_eq!(name.as_deref(), Some("Inner work"));
        assert_eq!(inner.nodes.len(), 3);
        assert_eq!(inner.flows.len(), 2);
    }

    #[test]
    fn rejects_lane_with_members_but_no_name() {
        let xml = r#"<?xml version="1.0"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <process id="P1">
    <startEvent id="s1"/>
    <laneSet id="ls1">
      <lane id="l1"><flowNodeRef>s1</flowNodeRef></lane>
    </laneSet>
  </process>
</definitions>"#;
        let err = parse_bpmn(xml).unwrap_err();
        assert!(err.to_string().contains("has members but no name") || format!("{err:?}").contains("UnnamedLane"));
    }
}
