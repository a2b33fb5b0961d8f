pub mod model;
pub mod parser;
pub mod writer;

pub use model::{BpmnModel, BpmnNode, Flow, Lane, LaneSet, Participant, Process, TaskKind, TriggerKind};
pub use parser::parse_bpmn;
pub use writer::write_bpmn;
