mod demo;
mod diagrams;

pub(crate) use demo::{
    connection_curve, Status, WorkflowDemo, CONNECTIONS, NODES, NODE_HALF_WIDTH, VIEW_HEIGHT, VIEW_WIDTH,
};
pub(crate) use diagrams::{Diagram, DiagramKind};
