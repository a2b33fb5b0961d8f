//! PNML XML emission, WoPeD `toolspecific` dialect.
//!
//! Same `writeln!`-into-`String` shape as `bpmn::writer`.

use super::model::{Net, Page, PnNode, ToolSpecific};
use anyhow::Result;
use std::fmt::Write;

pub fn write_pnml(net: &Net) -> Result<String> {
    let mut xml = String::new();
    writeln!(xml, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(xml, r#"<pnml>"#)?;
    write_net(&mut xml, net, 1)?;
    writeln!(xml, "</pnml>")?;
    Ok(normalize(&xml))
}

fn write_net(xml: &mut String, net: &Net, indent: usize) -> Result<()> {
    let pad = " ".repeat(indent * 2);
    writeln!(xml, r#"{pad}<net id="{}">"#, xml_escape(&net.id))?;

    for place in &net.places {
        write_node(xml, &PnNode::Place(place.clone()), indent + 1)?;
    }
    for transition in &net.transitions {
        write_node(xml, &PnNode::Transition(transition.clone()), indent + 1)?;
    }
    for arc in &net.arcs {
        writeln!(
            xml,
            r#"{pad}  <arc id="{}" source="{}" target="{}" />"#,
            xml_escape(&arc.id),
            xml_escape(&arc.source),
            xml_escape(&arc.target)
        )?;
    }
    if let Some(tool) = &net.tool {
        writeln!(xml, r#"{pad}  <toolspecific tool="WoPeD" version="1.0">"#)?;
        for role in &tool.roles {
            writeln!(xml, r#"{pad}    <role>{}</role>"#, xml_escape(role))?;
        }
        for unit in &tool.org_units {
            writeln!(xml, r#"{pad}    <orgunit>{}</orgunit>"#, xml_escape(unit))?;
        }
        writeln!(xml, r#"{pad}  </toolspecific>"#)?;
    }
    for page in &net.pages {
        write_page(xml, page, indent + 1)?;
    }

    writeln!(xml, r#"{pad}</net>"#)?;
    Ok(())
}

fn write_page(xml: &mut String, page: &Page, indent: usize) -> Result<()> {
    let pad = " ".repeat(indent * 2);
    writeln!(xml, r#"{pad}<page id="{}">"#, xml_escape(&page.id))?;
    write_net(xml, &page.net, indent + 1)?;
    writeln!(xml, r#"{pad}</page>"#)?;
    Ok(())
}

fn write_node(xml: &mut String, node: &PnNode, indent: usize) -> Result<()> {
    let pad = " ".repeat(indent * 2);
    let tag = if node.is_place() { "place" } else { "transition" };
    let has_body = node.name().is_some()
        || node
            .as_transition()
            .map(|t| has_toolspecific(&t.tool))
            .unwrap_or(false);

    if !has_body {
        writeln!(xml, r#"{pad}<{tag} id="{}" />"#, xml_escape(node.id()))?;
        return Ok(());
    }

    writeln!(xml, r#"{pad}<{tag} id="{}">"#, xml_escape(node.id()))?;
    if let Some(name) = node.name() {
        writeln!(xml, r#"{pad}  <name>{}</name>"#, xml_escape(name))?;
    }
    if let Some(t) = node.as_transition() {
        write_toolspecific(xml, &t.tool, indent + 1)?;
    }
    writeln!(xml, r#"{pad}</{tag}>"#)?;
    Ok(())
}

fn has_toolspecific(tool: &ToolSpecific) -> bool {
    tool.operator.is_some() || tool.trigger.is_some() || tool.resource.is_some() || tool.subprocess
}

fn write_toolspecific(xml: &mut String, tool: &ToolSpecific, indent: usize) -> Result<()> {
    if !has_toolspecific(tool) {
        return Ok(());
    }
    let pad = " ".repeat(indent * 2);
    writeln!(xml, r#"{pad}<toolspecific tool="WoPeD" version="1.0">"#)?;
    if let Some(op) = &tool.operator {
        writeln!(
            xml,
            r#"{pad}  <operator id="{}" type="{}" position="{}" />"#,
            xml_escape(&op.id),
            op.kind.as_str(),
            op.position
        )?;
    }
    if let Some(trigger) = &tool.trigger {
        let child = match trigger {
            super::model::TriggerKind::Message => "trigger_message",
            super::model::TriggerKind::Time => "trigger_time",
            super::model::TriggerKind::Resource => "trigger_resource",
        };
        writeln!(xml, r#"{pad}  <trigger><{child}/></trigger>"#)?;
    }
    if let Some(resource) = &tool.resource {
        writeln!(xml, r#"{pad}  <resource>"#)?;
        if let Some(role) = &resource.role {
            writeln!(xml, r#"{pad}    <role>{}</role>"#, xml_escape(role))?;
        }
        if let Some(unit) = &resource.unit {
            writeln!(xml, r#"{pad}    <orgunit>{}</orgunit>"#, xml_escape(unit))?;
        }
        writeln!(xml, r#"{pad}  </resource>"#)?;
    }
    if tool.subprocess {
        writeln!(xml, r#"{pad}  <subprocess />"#)?;
    }
    writeln!(xml, r#"{pad}</toolspecific>"#)?;
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
    use super::super::model::{Arc, Place, Transition};

    #[test]
    fn writes_places_transitions_and_arcs() {
        let net = Net {
            id: "N1".into(),
            places: vec![Place { id: "p1".into(), name: Some("start".into()) }],
            transitions: vec![Transition { id: "t1".into(), name: None, tool: ToolSpecific::default() }],
            arcs: vec![Arc { id: "a1".into(), source: "p1".into(), target: "t1".into() }],
            pages: vec![],
            tool: None,
        };
        let xml = write_pnml(&net).unwrap();
        assert!(xml.contains(r#"<place id="p1">"#));
        assert!(xml.contains(r#"<transition id="t1" />"#));
        assert!(xml.contains(r#"<arc id="a1" source="p1" target="t1" />"#));
    }
}
