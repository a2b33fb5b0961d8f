//! BPMN 2.0 XML emission.
//!
//! Plain `writeln!` into a `String` accumulator, one match arm per node
//! kind, the same shape this lineage's DTO-to-BPMN exporter already used —
//! generalized from a fixed export DTO to the bidirectional `Process` tree.

use super::model::{BpmnModel, BpmnNode, Process, TriggerKind};
use anyhow::Result;
use std::fmt::Write;

pub fn write_bpmn(model: &BpmnModel) -> Result<String> {
    let mut xml = String::new();
    writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        xml,
        r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL" id="Definitions_1" targetNamespace="http://bpmn-pnml.local/schema">"#
    )?;

    if let Some(p) = &model.participant {
        writeln!(xml, r#"  <collaboration id="Collaboration_1">"#)?;
        let name_attr = p
            .name
            .as_deref()
            .map(|n| format!(r#" name="{}""#, xml_escape(n)))
            .unwrap_or_default();
        writeln!(
            xml,
            r#"    <participant id="{}"{} processRef="{}" />"#,
            xml_escape(&p.id),
            name_attr,
            xml_escape(&model.process.id)
        )?;
        writeln!(xml, r#"  </collaboration>"#)?;
    }

    write_process(&mut xml, &model.process, 2)?;

    writeln!(xml, "</definitions>")?;
    Ok(normalize(&xml))
}

fn write_process(xml: &mut String, process: &Process, indent: usize) -> Result<()> {
    let pad = " ".repeat(indent);
    writeln!(xml, r#"{pad}<process id="{}" isExecutable="true">"#, xml_escape(&process.id))?;

    for lane_set in &process.lane_sets {
        writeln!(xml, r#"{pad}  <laneSet id="{}">"#, xml_escape(&lane_set.id))?;
        for lane in &lane_set.lanes {
            let name_attr = lane
                .name
                .as_deref()
                .map(|n| format!(r#" name="{}""#, xml_escape(n)))
                .unwrap_or_default();
            writeln!(xml, r#"{pad}    <lane id="{}"{}>"#, xml_escape(&lane.id), name_attr)?;
            for r in &lane.flow_node_refs {
                writeln!(xml, r#"{pad}      <flowNodeRef>{}</flowNodeRef>"#, xml_escape(r))?;
            }
            writeln!(xml, r#"{pad}    </lane>"#)?;
        }
        writeln!(xml, r#"{pad}  </laneSet>"#)?;
    }

    for node in &process.nodes {
        write_node(xml, node, indent + 2)?;
    }
    for flow in &process.flows {
        let name_attr = flow
            .name
            .as_deref()
            .map(|n| format!(r#" name="{}""#, xml_escape(n)))
            .unwrap_or_default();
        writeln!(
            xml,
            r#"{pad}  <sequenceFlow id="{}"{} sourceRef="{}" targetRef="{}" />"#,
            xml_escape(&flow.id),
            name_attr,
            xml_escape(&flow.source_ref),
            xml_escape(&flow.target_ref)
        )?;
    }

    writeln!(xml, r#"{pad}</process>"#)?;
    Ok(())
}

fn write_node(xml: &mut String, node: &BpmnNode, indent: usize) -> Result<()> {
    let pad = " ".repeat(indent);
    let name_attr = |n: Option<&str>| {
        n.map(|n| format!(r#" name="{}""#, xml_escape(n))).unwrap_or_default()
    };
    match node {
        BpmnNode::StartEvent { id, name } => {
            writeln!(xml, r#"{pad}<startEvent id="{}"{} />"#, xml_escape(id), name_attr(name.as_deref()))?;
        }
        BpmnNode::EndEvent { id, name } => {
            writeln!(xml, r#"{pad}<endEvent id="{}"{} />"#, xml_escape(id), name_attr(name.as_deref()))?;
        }
        BpmnNode::IntermediateCatchEvent { id, name, trigger } => {
            let na = name_attr(name.as_deref());
            match trigger {
                TriggerKind::None => {
                    writeln!(xml, r#"{pad}<intermediateCatchEvent id="{}"{} />"#, xml_escape(id), na)?;
                }
                TriggerKind::Time => {
                    writeln!(xml, r#"{pad}<intermediateCatchEvent id="{}"{}>"#, xml_escape(id), na)?;
                    writeln!(xml, r#"{pad}  <timerEventDefinition />"#)?;
                    writeln!(xml, r#"{pad}</intermediateCatchEvent>"#)?;
                }
                TriggerKind::Message | TriggerKind::Resource => {
                    writeln!(xml, r#"{pad}<intermediateCatchEvent id="{}"{}>"#, xml_escape(id), na)?;
                    writeln!(xml, r#"{pad}  <messageEventDefinition />"#)?;
                    writeln!(xml, r#"{pad}</intermediateCatchEvent>"#)?;
                }
            }
        }
        BpmnNode::Task { id, name, kind } => {
            let tag = match kind {
                super::model::TaskKind::Generic => "task",
                super::model::TaskKind::User => "userTask",
                super::model::TaskKind::Service => "serviceTask",
            };
            writeln!(xml, r#"{pad}<{tag} id="{}"{} />"#, xml_escape(id), name_attr(name.as_deref()))?;
        }
        BpmnNode::XorGateway { id, name } => {
            writeln!(xml, r#"{pad}<exclusiveGateway id="{}"{} />"#, xml_escape(id), name_attr(name.as_deref()))?;
        }
        BpmnNode::AndGateway { id, name } => {
            writeln!(xml, r#"{pad}<parallelGateway id="{}"{} />"#, xml_escape(id), name_attr(name.as_deref()))?;
        }
        BpmnNode::OrGateway { id, name } => {
            writeln!(xml, r#"{pad}<inclusiveGateway id="{}"{} />"#, xml_escape(id), name_attr(name.as_deref()))?;
        }
        BpmnNode::EventGateway { id, name } => {
            writeln!(xml, r#"{pad}<eventBasedGateway id="{}"{} />"#, xml_escape(id), name_attr(name.as_deref()))?;
        }
        BpmnNode::SubProcess { id, name, process } => {
            writeln!(xml, r#"{pad}<subProcess id="{}"{}>"#, xml_escape(id), name_attr(name.as_deref()))?;
            write_process_body(xml, process, indent + 2)?;
            writeln!(xml, r#"{pad}</subProcess>"#)?;
        }
    }
    Ok(())
}

/// Like `write_process` but without the outer `<process>` wrapper — a
/// `<subProcess>` element supplies that wrapper itself.
fn write_process_body(xml: &mut String, process: &Process, indent: usize) -> Result<()> {
    let pad = " ".repeat(indent);
    for lane_set in &process.lane_sets {
        writeln!(xml, r#"{pad}<laneSet id="{}">"#, xml_escape(&lane_set.id))?;
        for lane in &lane_set.lanes {
            let name_attr = lane
                .name
                .as_deref()
                .map(|n| format!(r#" name="{}""#, xml_escape(n)))
                .unwrap_or_default();
            writeln!(xml, r#"{pad}  <lane id="{}"{}>"#, xml_escape(&lane.id), name_attr)?;
            for r in &lane.flow_node_refs {
                writeln!(xml, r#"{pad}    <flowNodeRef>{}</flowNodeRef>"#, xml_escape(r))?;
            }
            writeln!(xml, r#"{pad}  </lane>"#)?;
        }
        writeln!(xml, r#"{pad}</laneSet>"#)?;
    }
    for node in &process.nodes {
        write_node(xml, node, indent)?;
    }
    for flow in &process.flows {
        let name_attr = flow
            .name
            .as_deref()
            .map(|n| format!(r#" name="{}""#, xml_escape(n)))
            .unwrap_or_default();
        writeln!(
            xml,
            r#"{pad}<sequenceFlow id="{}"{} sourceRef="{}" targetRef="{}" />"#,
            xml_escape(&flow.id),
            name_attr,
            xml_escape(&flow.source_ref),
            xml_escape(&flow.target_ref)
        )?;
    }
    Ok(())
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Output normalization mandated by §4.1/§6: the `writeln!`-per-element
/// emission above leaves one line per tag; collapse those onto a single
/// line (text content never itself spans a line break, since every
/// element's body text is written in the same `writeln!` call as its
/// tags) and unescape any accidental double-escaping of quotes.
fn normalize(xml: &str) -> String {
    xml.replace("\r\n", "\n")
        .replace("\\\"", "\"")
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<String>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::model::{Flow, Process};

    #[test]
    fn writes_a_minimal_process() {
        let mut process = Process {
            id: "P1".into(),
            ..Default::default()
        };
        process.nodes.push(BpmnNode::StartEvent { id: "s1".into(), name: None });
        process.nodes.push(BpmnNode::EndEvent { id: "e1".into(), name: None });
        process.flows.push(Flow {
            id: "f1".into(),
            name: None,
            source_ref: "s1".into(),
            target_ref: "e1".into(),
        });
        let model = BpmnModel { process, participant: None };
        let xml = write_bpmn(&model).unwrap();
        assert!(xml.contains(r#"<process id="P1""#));
        assert!(xml.contains(r#"<startEvent id="s1""#));
        assert!(xml.contains(r#"sourceRef="s1" targetRef="e1""#));
    }
}
