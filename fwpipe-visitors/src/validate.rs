use tracing::info;

use fwpipe_core::{
    Node, NodeKind, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorError,
    VisitorRegistry,
};

use crate::matcher::PathTracker;

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "validate",
        VisitorEntry::new(0, |_| Ok(Box::new(ValidateVisitor::new())))
            .with_summary("check structural rules, fail listing every problem"),
    )
}

/// Checks that leaf kinds have no children, that files are named and that
/// image nodes only appear at the root.
#[derive(Debug, Default)]
pub struct ValidateVisitor {
    path: PathTracker,
    depth: usize,
    problems: Vec<String>,
}

impl ValidateVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(&mut self, node: &Node) {
        let here = self.path.current();
        if node.kind.is_leaf_kind() && !node.children.is_empty() {
            self.problems
                .push(format!("{here}: {} nodes cannot have children", node.kind));
        }
        if node.kind == NodeKind::File && node.name.is_empty() {
            self.problems.push(format!("{here}: file has no name"));
        }
        if node.kind == NodeKind::Image && self.depth > 0 {
            self.problems.push(format!("{here}: nested image node"));
        }
    }
}

impl Visitor for ValidateVisitor {
    fn name(&self) -> &str {
        "validate"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.path.clear();
        self.depth = 0;
        self.problems.clear();
        self.visit(root)?;

        if self.problems.is_empty() {
            info!("validate: {} nodes ok", root.node_count());
            return Ok(());
        }
        Err(VisitorError::Invalid {
            visitor: "validate".to_string(),
            problems: std::mem::take(&mut self.problems),
        })
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        self.path.enter(&node.name);
        self.check(node);
        self.depth += 1;
        let result = node.apply_children(self);
        self.depth -= 1;
        self.path.leave();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fwpipe_core::{Document, Firmware};

    #[test]
    fn test_valid_tree_passes() {
        let mut fw = Firmware::new(Node::new(NodeKind::Image, "bios").with_children(vec![
            Node::new(NodeKind::File, "DxeCore")
                .with_children(vec![Node::new(NodeKind::Section, "pe32").with_data(vec![1])]),
        ]));
        assert!(fw.apply(&mut ValidateVisitor::new()).is_ok());
    }

    #[test]
    fn test_reports_every_problem() {
        let mut fw = Firmware::new(Node::new(NodeKind::Image, "bios").with_children(vec![
            Node::new(NodeKind::Pad, "pad").with_children(vec![Node::new(NodeKind::Raw, "x")]),
            Node::new(NodeKind::File, ""),
            Node::new(NodeKind::Image, "inner"),
        ]));

        let err = fw.apply(&mut ValidateVisitor::new()).unwrap_err();
        match err {
            VisitorError::Invalid { problems, .. } => {
                assert_eq!(
                    problems,
                    vec![
                        "bios/pad: pad nodes cannot have children".to_string(),
                        "bios/: file has no name".to_string(),
                        "bios/inner: nested image node".to_string(),
                    ]
                );
            }
            other => panic!("Expected Invalid, got {other:?}"),
        }
    }
}
