/*!
 * Structural removal: `remove <regex>` and `strip`
 */

use tracing::info;

use fwpipe_core::{
    Node, NodeKind, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorError,
    VisitorRegistry,
};

use crate::matcher::NameMatcher;

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "remove",
        VisitorEntry::new(1, |args| Ok(Box::new(RemoveVisitor::new(&args[0])?)))
            .with_summary("<regex>: remove matching nodes, fail if none match"),
    )?;
    registry.register_entry(
        "strip",
        VisitorEntry::new(0, |_| Ok(Box::new(StripVisitor::new())))
            .with_summary("remove every padding region"),
    )?;
    Ok(())
}

/// Removes every node (other than the root) whose name matches.
#[derive(Debug)]
pub struct RemoveVisitor {
    matcher: NameMatcher,
    removed: usize,
}

impl RemoveVisitor {
    pub fn new(pattern: &str) -> VisitResult<Self> {
        Ok(Self {
            matcher: NameMatcher::new("remove", pattern)?,
            removed: 0,
        })
    }

    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl Visitor for RemoveVisitor {
    fn name(&self) -> &str {
        "remove"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.removed = 0;
        self.visit(root)?;
        if self.removed == 0 {
            return Err(VisitorError::NoMatch {
                visitor: "remove".to_string(),
                pattern: self.matcher.pattern().to_string(),
            });
        }
        info!("remove '{}': {} nodes removed", self.matcher.pattern(), self.removed);
        Ok(())
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        let before = node.children.len();
        node.children.retain(|child| !self.matcher.is_match(&child.name));
        self.removed += before - node.children.len();
        node.apply_children(self)
    }
}

#[derive(Debug, Default)]
pub struct StripVisitor {
    removed: usize,
}

impl StripVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn removed(&self) -> usize {
        self.removed
    }
}

impl Visitor for StripVisitor {
    fn name(&self) -> &str {
        "strip"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.removed = 0;
        self.visit(root)?;
        info!("strip: {} padding regions removed", self.removed);
        Ok(())
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        let before = node.children.len();
        node.children.retain(|child| child.kind != NodeKind::Pad);
        self.removed += before - node.children.len();
        node.apply_children(self)
    }
}
