use serde::Serialize;
use tracing::info;

use fwpipe_core::{Node, NodeKind, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorRegistry};

use crate::matcher::{NameMatcher, PathTracker};

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "find",
        VisitorEntry::new(1, |args| Ok(Box::new(FindVisitor::new(&args[0])?)))
            .with_summary("<regex>: print nodes whose name matches"),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FoundNode {
    pub path: String,
    pub kind: NodeKind,
    pub size: usize,
}

#[derive(Debug)]
pub struct FindVisitor {
    matcher: NameMatcher,
    path: PathTracker,
    matches: Vec<FoundNode>,
}

impl FindVisitor {
    pub fn new(pattern: &str) -> VisitResult<Self> {
        Ok(Self {
            matcher: NameMatcher::new("find", pattern)?,
            path: PathTracker::default(),
            matches: Vec::new(),
        })
    }

    pub fn matches(&self) -> &[FoundNode] {
        &self.matches
    }
}

impl Visitor for FindVisitor {
    fn name(&self) -> &str {
        "find"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.path.clear();
        self.matches.clear();
        self.visit(root)?;
        info!("find '{}': {} matches", self.matcher.pattern(), self.matches.len());
        println!("{}", serde_json::to_string_pretty(&self.matches)?);
        Ok(())
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        self.path.enter(&node.name);
        if self.matcher.is_match(&node.name) {
            self.matches.push(FoundNode {
                path: self.path.current(),
                kind: node.kind,
                size: node.total_size(),
            });
        }
        let result = node.apply_children(self);
        self.path.leave();
        result
    }
}
