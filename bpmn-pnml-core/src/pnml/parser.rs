//! Streaming PNML XML reader.
//!
//! Same cursor-driven, explicit-state-machine shape as `bpmn::parser` —
//! places, transitions and arcs are pushed onto the in-progress `Net` as
//! their closing tags are seen; WoPeD `toolspecific` blocks are decoded
//! inline while a `<transition>` is open.

use super::model::{
    Arc, GlobalToolSpecific, Net, OperatorRef, OperatorType, Page, Place, ResourceRef,
    ToolSpecific, Transition, TriggerKind,
};
use crate::error::KnownError;
use anyhow::{anyhow, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

#[derive(Default)]
struct OpenTransition {
    id: String,
    name: Option<String>,
    tool: ToolSpecific,
}

enum Text {
    Name,
    OperatorId,
    Role,
    Unit,
}

pub fn parse_pnml(xml: &str) -> Result<Net> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root_stack: Vec<Net> = vec![Net::default()];
    let mut page_stack: Vec<String> = Vec::new();
    let mut open_transition: Option<OpenTransition> = None;
    let mut open_place: Option<Place> = None;
    let mut pending_text: Option<Text> = None;
    let mut saw_net = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => handle_open(
                e,
                &mut root_stack,
                &mut page_stack,
                &mut open_transition,
                &mut open_place,
                &mut pending_text,
                &mut saw_net,
            )?,
            Ok(Event::Empty(ref e)) => {
                let local = local_name(e.name().as_ref());
                if local == "place" && open_transition.is_none() {
                    let id = get_attr(e, "id")?;
                    current_net(&mut root_stack, &page_stack)
                        .places
                        .push(Place { id, name: None });
                } else if local == "transition" {
                    let id = get_attr(e, "id")?;
                    current_net(&mut root_stack, &page_stack)
                        .transitions
                        .push(Transition { id, name: None, tool: ToolSpecific::default() });
                } else if local == "arc" {
                    push_arc(e, &mut root_stack, &page_stack)?;
                } else {
                    handle_open(
                        e,
                        &mut root_stack,
                        &mut page_stack,
                        &mut open_transition,
                        &mut open_place,
                        &mut pending_text,
                        &mut saw_net,
                    )?
                }
            }
            Ok(Event::End(ref e)) => {
                let local = local_name(e.name().as_ref());
                handle_close(
                    &local,
                    &mut root_stack,
                    &mut page_stack,
                    &mut open_transition,
                    &mut open_place,
                    &mut pending_text,
                )?
            }
            Ok(Event::Text(ref e)) => {
                if let Some(kind) = &pending_text {
                    let text = e.unescape()?.trim().to_string();
                    if !text.is_empty() {
                        apply_text(kind, text, &mut open_transition, &mut open_place, &mut root_stack, &page_stack);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(KnownError::MalformedInput(format!("XML parse error: {e}")).into()),
            _ => {}
        }
        buf.clear();
    }

    if !saw_net {
        return Err(KnownError::MalformedInput("no <net> element found".into()).into());
    }
    Ok(root_stack.pop().expect("root net always present"))
}

fn current_net<'a>(root_stack: &'a mut [Net], page_stack: &[String]) -> &'a mut Net {
    let mut net = &mut root_stack[0];
    for page_id in page_stack {
        net = &mut net
            .pages
            .iter_mut()
            .find(|p| &p.id == page_id)
            .expect("page pushed onto stack must exist in its parent net")
            .net;
    }
    net
}

#[allow(clippy::too_many_arguments)]
fn handle_open(
    e: &BytesStart,
    root_stack: &mut Vec<Net>,
    page_stack: &mut Vec<String>,
    open_transition: &mut Option<OpenTransition>,
    open_place: &mut Option<Place>,
    pending_text: &mut Option<Text>,
    saw_net: &mut bool,
) -> Result<()> {
    let local = local_name(e.name().as_ref());
    match local.as_str() {
        "net" => {
            *saw_net = true;
            root_stack[0].id = get_attr_opt(e, "id").unwrap_or_default();
        }
        "page" => {
            let id = get_attr(e, "id")?;
            let parent = current_net(root_stack, page_stack);
            parent.pages.push(Page { id: id.clone(), net: Net::default() });
            page_stack.push(id);
        }
        "place" => {
            let id = get_attr(e, "id")?;
            *open_place = Some(Place { id, name: None });
        }
        "transition" => {
            let id = get_attr(e, "id")?;
            *open_transition = Some(OpenTransition { id, name: None, tool: ToolSpecific::default() });
        }
        "arc" => push_arc(e, root_stack, page_stack)?,
        "name" => *pending_text = Some(Text::Name),
        "operator" if open_transition.is_some() => {
            let id = get_attr(e, "id")?;
            let kind = get_attr(e, "type")?;
            let kind = OperatorType::from_str(&kind)
                .ok_or_else(|| anyhow!("unknown workflow operator type '{kind}'"))?;
            let position = get_attr_opt(e, "position").and_then(|s| s.parse().ok()).unwrap_or(0);
            if let Some(t) = open_transition.as_mut() {
                t.tool.operator = Some(OperatorRef { id, kind, position });
            }
        }
        // WoPeD's wire form nests the trigger kind as a child element
        // (`<trigger><trigger_message/></trigger>`) rather than a `type`
        // attribute on `<trigger>` itself.
        "trigger" if open_transition.is_some() => {}
        "trigger_message" if open_transition.is_some() => {
            if let Some(t) = open_transition.as_mut() {
                t.tool.trigger = Some(TriggerKind::Message);
            }
        }
        "trigger_time" if open_transition.is_some() => {
            if let Some(t) = open_transition.as_mut() {
                t.tool.trigger = Some(TriggerKind::Time);
            }
        }
        "trigger_resource" if open_transition.is_some() => {
            if let Some(t) = open_transition.as_mut() {
                t.tool.trigger = Some(TriggerKind::Resource);
            }
        }
        "subprocess" if open_transition.is_some() => {
            if let Some(t) = open_transition.as_mut() {
                t.tool.subprocess = true;
            }
        }
        "role" if open_transition.is_some() => *pending_text = Some(Text::Role),
        "orgunit" if open_transition.is_some() => *pending_text = Some(Text::Unit),
        "resource" if open_transition.is_some() => {
            if let Some(t) = open_transition.as_mut() {
                t.tool.resource = Some(ResourceRef { role: None, unit: None });
            }
        }
        _ => {}
    }
    Ok(())
}

fn push_arc(e: &BytesStart, root_stack: &mut Vec<Net>, page_stack: &[String]) -> Result<()> {
    let id = get_attr(e, "id")?;
    let source = get_attr(e, "source")?;
    let target = get_attr(e, "target")?;
    current_net(root_stack, page_stack)
        .arcs
        .push(Arc { id, source, target });
    Ok(())
}

fn apply_text(
    kind: &Text,
    text: String,
    open_transition: &mut Option<OpenTransition>,
    open_place: &mut Option<Place>,
    root_stack: &mut [Net],
    page_stack: &[String],
) {
    match kind {
        Text::Name => {
            if let Some(t) = open_transition.as_mut() {
                t.name = Some(text);
            } else if let Some(p) = open_place.as_mut() {
                p.name = Some(text);
            }
        }
        Text::Role => {
            if let Some(t) = open_transition.as_mut() {
                let r = t.tool.resource.get_or_insert(ResourceRef { role: None, unit: None });
                r.role = Some(text.clone());
            }
            let net = current_net_mut_safe(root_stack, page_stack);
            net.tool.get_or_insert_with(GlobalToolSpecific::default).roles.push(text);
        }
        Text::Unit => {
            if let Some(t) = open_transition.as_mut() {
                let r = t.tool.resource.get_or_insert(ResourceRef { role: None, unit: None });
                r.unit = Some(text.clone());
            }
            let net = current_net_mut_safe(root_stack, page_stack);
            net.tool.get_or_insert_with(GlobalToolSpecific::default).org_units.push(text);
        }
        Text::OperatorId => {}
    }
}

fn current_net_mut_safe<'a>(root_stack: &'a mut [Net], page_stack: &[String]) -> &'a mut Net {
    current_net(root_stack, page_stack)
}

fn handle_close(
    local: &str,
    root_stack: &mut [Net],
    page_stack: &mut Vec<String>,
    open_transition: &mut Option<OpenTransition>,
    open_place: &mut Option<Place>,
    pending_text: &mut Option<Text>,
) -> Result<()> {
    match local {
        "name" | "role" | "orgunit" => *pending_text = None,
        "place" => {
            if let Some(p) = open_place.take() {
                current_net(root_stack, page_stack).places.push(p);
            }
        }
        "transition" => {
            if let Some(t) = open_transition.take() {
                current_net(root_stack, page_stack)
                    .transitions
                    .push(Transition { id: t.id, name: t.name, tool: t.tool });
            }
        }
        "page" => {
            page_stack.pop();
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
    fn parses_places_transitions_and_arcs() {
        let xml = r#"<?xml version="1.0"?>
<pnml>
  <net id="N1">
    <place id="p1"><name>start</name></place>
    <transition id="t1"><name>do thing</name></transition>
    <place id="p2"/>
    <arc id="a1" source="p1" target="t1"/>
    <arc id="a2" source="t1" target="p2"/>
  </net>
</pnml>"#;
        let net = parse_pnml(xml).unwrap();
        assert_eq!(net.places.len(), 2);
        assert_eq!(net.transitions.len(), 1);
        assert_eq!(net.arcs.len(), 2);
        assert_eq!(net.transitions[0].name.as_deref(), Some("do thing"));
    }

    #[test]
    fn decodes_workflow_operator_toolspecific() {
        let xml = r#"<?xml version="1.0"?>
<pnml>
  <net id="N1">
    <transition id="t1">
      <toolspecific tool="WoPeD" version="1.0">
        <operator id="op1" type="AndSplit" position="0"/>
      </toolspecific>
    </transition>
  </net>
</pnml>"#;
        let net = parse_pnml(xml).unwrap();
        let t = &net.transitions[0];
        assert!(t.tool.is_workflow_operator());
        assert_eq!(t.tool.operator.as_ref().unwrap().kind, OperatorType::AndSplit);
    }

    #[test]
    fn decodes_trigger_child_element() {
        let xml = r#"<?xml version="1.0"?>
<pnml>
  <net id="N1">
    <transition id="t1">
      <toolspecific tool="WoPeD" version="1.0">
        <trigger><trigger_message/></trigger>
      </toolspecific>
    </transition>
  </net>
</pnml>"#;
        let net = parse_pnml(xml).unwrap();
        let t = &net.transitions[0];
        assert!(t.tool.is_workflow_trigger());
        assert_eq!(t.tool.trigger, Some(TriggerKind::Message));
    }

    #[test]
    fn rejects_missing_net() {
        let xml = r#"<?xml version="1.0"?><pnml/>"#;
        assert!(parse_pnml(xml).is_err());
    }
}
