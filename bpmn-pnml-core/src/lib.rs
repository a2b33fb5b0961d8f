//! Bidirectional BPMN ↔ PNML/WF-net translation core.
//!
//! The public surface is exactly the two pure functions below plus the
//! equivalence predicate used by tests (§6): everything else — HTTP,
//! configuration, rate limiting, metrics — lives in the `bpmn-pnml-server`
//! binary crate and talks to this one only through these entry points.

pub mod annotations;
pub mod bpmn;
pub mod equivalence;
pub mod error;
pub mod ids;
pub mod pnml;
pub mod transform;

use error::{Result, TransformError};

/// `bpmn_xml_string → pnml_xml_string`.
pub fn transform_bpmn_to_pnml(bpmn_xml: &str) -> Result<String> {
    run(|| {
        let model = bpmn::parse_bpmn(bpmn_xml)?;
        let organization = model.organization().map(|s| s.to_string());
        let net = transform::transform_bpmn_to_pnml(&model.process, organization.as_deref())?;
        let xml = pnml::write_pnml(&net)?;
        Ok(xml)
    })
}

/// `pnml_xml_string → bpmn_xml_string`.
pub fn transform_pnml_to_bpmn(pnml_xml: &str) -> Result<String> {
    run(|| {
        let net = pnml::parse_pnml(pnml_xml)?;
        let process = transform::transform_pnml_to_bpmn(&net)?;
        let model = bpmn::BpmnModel { process, participant: None };
        let xml = bpmn::write_bpmn(&model)?;
        Ok(xml)
    })
}

fn run<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T> {
    f().map_err(TransformError::from_anyhow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_minimal_process_through_both_directions() {
        let bpmn_xml = r#"<?xml version="1.0"?>
<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <process id="P1">
    <startEvent id="s1"/>
    <userTask id="t1" name="Review"/>
    <endEvent id="e1"/>
    <sequenceFlow id="f1" sourceRef="s1" targetRef="t1"/>
    <sequenceFlow id="f2" sourceRef="t1" targetRef="e1"/>
  </process>
</definitions>"#;
        let pnml_xml = transform_bpmn_to_pnml(bpmn_xml).expect("bpmn -> pnml");
        assert!(pnml_xml.contains("<net"));
        assert!(pnml_xml.contains("[UserTask] Review"));

        let back = transform_pnml_to_bpmn(&pnml_xml).expect("pnml -> bpmn");
        assert!(back.contains("<startEvent"));
        assert!(back.contains("<endEvent"));
    }

    #[test]
    fn malformed_bpmn_is_a_known_error() {
        let err = transform_bpmn_to_pnml("not xml at all").unwrap_err();
        assert!(err.is_known(), "expected a Known error, got {err:?}");
    }
}
