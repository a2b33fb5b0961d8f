pub mod bpmn_to_pnml;
pub mod pnml_to_bpmn;

pub use bpmn_to_pnml::transform_bpmn_to_pnml;
pub use pnml_to_bpmn::transform_pnml_to_bpmn;
