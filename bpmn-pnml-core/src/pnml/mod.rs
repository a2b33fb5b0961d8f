pub mod model;
pub mod parser;
pub mod writer;

pub use model::{
    Arc, GlobalToolSpecific, Net, OperatorRef, OperatorType, Page, Place, PnNode, ResourceRef,
    ToolSpecific, Transition, TriggerKind,
};
pub use parser::parse_pnml;
pub use writer::write_pnml;
