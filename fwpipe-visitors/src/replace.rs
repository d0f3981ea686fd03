use std::fs;
use std::path::PathBuf;

use tracing::info;

use fwpipe_core::{
    Node, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorError, VisitorRegistry,
};

use crate::matcher::NameMatcher;

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "replace",
        VisitorEntry::new(2, |args| Ok(Box::new(ReplaceVisitor::new(&args[0], &args[1])?)))
            .with_summary("<regex> <file>: replace the contents of the single matching node"),
    )
}

/// Replaces the bytes of exactly one matching node with a file's contents.
/// The node keeps its kind and name; its children are dropped since the new
/// bytes stand for the whole subtree.
#[derive(Debug)]
pub struct ReplaceVisitor {
    matcher: NameMatcher,
    source: PathBuf,
    data: Vec<u8>,
}

impl ReplaceVisitor {
    pub fn new(pattern: &str, source: &str) -> VisitResult<Self> {
        if source.is_empty() {
            return Err(VisitorError::invalid_argument(
                "replace",
                source,
                "replacement path must not be empty",
            ));
        }
        Ok(Self {
            matcher: NameMatcher::new("replace", pattern)?,
            source: PathBuf::from(source),
            data: Vec::new(),
        })
    }

    fn count_matches(&self, node: &Node) -> usize {
        let own = usize::from(self.matcher.is_match(&node.name));
        own + node
            .children
            .iter()
            .map(|c| self.count_matches(c))
            .sum::<usize>()
    }
}

impl Visitor for ReplaceVisitor {
    fn name(&self) -> &str {
        "replace"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        match self.count_matches(root) {
            0 => {
                return Err(VisitorError::NoMatch {
                    visitor: "replace".to_string(),
                    pattern: self.matcher.pattern().to_string(),
                })
            }
            1 => {}
            count => {
                return Err(VisitorError::AmbiguousMatch {
                    visitor: "replace".to_string(),
                    pattern: self.matcher.pattern().to_string(),
                    count,
                })
            }
        }

        self.data = fs::read(&self.source).map_err(|e| VisitorError::io(&self.source, e))?;
        self.visit(root)
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        if self.matcher.is_match(&node.name) {
            info!(
                "replace: {} ({} -> {} bytes)",
                node.name,
                node.total_size(),
                self.data.len()
            );
            node.data = self.data.clone();
            node.children.clear();
            return Ok(());
        }
        node.apply_children(self)
    }
}
