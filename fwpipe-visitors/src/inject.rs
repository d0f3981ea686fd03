use std::fs;
use std::path::PathBuf;

use tracing::info;

use fwpipe_core::{
    Node, NodeKind, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorError,
    VisitorRegistry,
};

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "inject",
        VisitorEntry::new(1, |args| Ok(Box::new(InjectVisitor::new(&args[0])?)))
            .with_summary("<file>: append a payload file to the root"),
    )
}

/// Appends the payload as a new file node at the end of the root's children.
/// The payload is read when the visitor runs, not when it is constructed.
#[derive(Debug)]
pub struct InjectVisitor {
    payload: PathBuf,
}

impl InjectVisitor {
    pub fn new(payload: &str) -> VisitResult<Self> {
        if payload.is_empty() {
            return Err(VisitorError::invalid_argument(
                "inject",
                payload,
                "payload path must not be empty",
            ));
        }
        Ok(Self {
            payload: PathBuf::from(payload),
        })
    }
}

impl Visitor for InjectVisitor {
    fn name(&self) -> &str {
        "inject"
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        let data = fs::read(&self.payload).map_err(|e| VisitorError::io(&self.payload, e))?;
        let name = self
            .payload
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.payload.display().to_string());

        info!("inject: {} ({} bytes) into {}", name, data.len(), node.name);
        node.push_child(Node::new(NodeKind::File, name).with_data(data));
        Ok(())
    }
}
