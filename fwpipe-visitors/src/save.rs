use std::fs;
use std::path::PathBuf;

use tracing::info;

use fwpipe_core::{
    Node, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorError, VisitorRegistry,
};

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "save",
        VisitorEntry::new(1, |args| Ok(Box::new(SaveVisitor::new(&args[0])?)))
            .with_summary("<file>: write the document (.json keeps the tree, anything else is flattened)"),
    )
}

/// Persists the document at this point of the pipeline. A `.json` target
/// keeps the tree so it can be loaded again; other targets receive the
/// flattened image bytes.
#[derive(Debug)]
pub struct SaveVisitor {
    target: PathBuf,
}

impl SaveVisitor {
    pub fn new(target: &str) -> VisitResult<Self> {
        if target.is_empty() {
            return Err(VisitorError::invalid_argument(
                "save",
                target,
                "output path must not be empty",
            ));
        }
        Ok(Self {
            target: PathBuf::from(target),
        })
    }

    fn is_tree_target(&self) -> bool {
        self.target
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

impl Visitor for SaveVisitor {
    fn name(&self) -> &str {
        "save"
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        let bytes = if self.is_tree_target() {
            node.to_document_json()?.into_bytes()
        } else {
            node.flatten()
        };
        fs::write(&self.target, &bytes).map_err(|e| VisitorError::io(&self.target, e))?;
        info!("save: {} bytes to {}", bytes.len(), self.target.display());
        Ok(())
    }
}
