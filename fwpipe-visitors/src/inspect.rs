/*!
 * Read-only visitors: count, table, json, checksum
 *
 * None of these mutate the document. Each walks the tree, builds its report
 * and prints it to stdout once the walk is complete.
 */

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use fwpipe_core::{Node, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorRegistry};

use crate::matcher::PathTracker;

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "count",
        VisitorEntry::new(0, |_| Ok(Box::new(CountVisitor::new())))
            .with_summary("count nodes by kind"),
    )?;
    registry.register_entry(
        "table",
        VisitorEntry::new(0, |_| Ok(Box::new(TableVisitor::new())))
            .with_summary("print the tree as a table"),
    )?;
    registry.register_entry(
        "json",
        VisitorEntry::new(0, |_| Ok(Box::new(JsonVisitor)))
            .with_summary("print the tree as JSON"),
    )?;
    registry.register_entry(
        "checksum",
        VisitorEntry::new(0, |_| Ok(Box::new(ChecksumVisitor::new())))
            .with_summary("print the SHA-256 of every node"),
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct CountVisitor {
    counts: BTreeMap<&'static str, usize>,
}

impl CountVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> &BTreeMap<&'static str, usize> {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

impl Visitor for CountVisitor {
    fn name(&self) -> &str {
        "count"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.counts.clear();
        self.visit(root)?;
        println!("{}", serde_json::to_string_pretty(&self.counts)?);
        Ok(())
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        *self.counts.entry(node.kind.as_str()).or_insert(0) += 1;
        node.apply_children(self)
    }
}

#[derive(Debug, Default)]
pub struct TableVisitor {
    depth: usize,
    rows: String,
}

impl TableVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rendered(&self) -> &str {
        &self.rows
    }
}

impl Visitor for TableVisitor {
    fn name(&self) -> &str {
        "table"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.depth = 0;
        self.rows.clear();
        self.rows
            .push_str(&format!("{:<8} {:>10}  NAME\n", "KIND", "SIZE"));
        self.visit(root)?;
        print!("{}", self.rows);
        Ok(())
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        self.rows.push_str(&format!(
            "{:<8} {:>10}  {}{}\n",
            node.kind.as_str(),
            node.total_size(),
            "  ".repeat(self.depth),
            node.name
        ));
        self.depth += 1;
        let result = node.apply_children(self);
        self.depth -= 1;
        result
    }
}

#[derive(Debug)]
pub struct JsonVisitor;

impl Visitor for JsonVisitor {
    fn name(&self) -> &str {
        "json"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        println!("{}", root.to_document_json()?);
        Ok(())
    }

    fn visit(&mut self, _node: &mut Node) -> VisitResult<()> {
        Ok(())
    }
}

/// Digests cover a node's own bytes followed by its descendants', the same
/// bytes `Node::flatten` yields. One hasher per open ancestor is fed as the
/// walk goes, so no subtree is copied.
#[derive(Debug, Default)]
pub struct ChecksumVisitor {
    path: PathTracker,
    open: Vec<Sha256>,
    sums: Vec<(String, String)>,
}

impl ChecksumVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(path, hex digest)` pairs in traversal order.
    pub fn sums(&self) -> &[(String, String)] {
        &self.sums
    }
}

impl Visitor for ChecksumVisitor {
    fn name(&self) -> &str {
        "checksum"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.path.clear();
        self.open.clear();
        self.sums.clear();
        self.visit(root)?;
        for (path, digest) in &self.sums {
            println!("{digest}  {path}");
        }
        Ok(())
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        self.path.enter(&node.name);
        // reserve the slot so results stay in pre-order
        let slot = self.sums.len();
        self.sums.push((self.path.current(), String::new()));

        self.open.push(Sha256::new());
        for hasher in &mut self.open {
            hasher.update(&node.data);
        }
        let result = node.apply_children(self);

        if let Some(hasher) = self.open.pop() {
            let digest = hex::encode(hasher.finalize());
            debug!("checksum {} = {}", self.sums[slot].0, digest);
            self.sums[slot].1 = digest;
        }
        self.path.leave();
        result
    }
}
