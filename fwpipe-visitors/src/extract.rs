/*!
 * Extract visitor
 *
 * Writes the bytes of every leaf node with data into a directory, one file
 * per node, and a `summary.json` mapping each written file back to its path
 * in the tree.
 */

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use fwpipe_core::{
    Node, NodeKind, RegistryResult, VisitResult, Visitor, VisitorEntry, VisitorError,
    VisitorRegistry,
};

use crate::matcher::PathTracker;

pub const SUMMARY_FILE: &str = "summary.json";

pub fn register(registry: &mut VisitorRegistry) -> RegistryResult<()> {
    registry.register_entry(
        "extract",
        VisitorEntry::new(1, |args| Ok(Box::new(ExtractVisitor::new(&args[0])?)))
            .with_summary("<dir>: write every leaf node's bytes into a directory"),
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedEntry {
    pub file: String,
    pub path: String,
    pub kind: NodeKind,
    pub size: usize,
}

#[derive(Debug)]
pub struct ExtractVisitor {
    dir: PathBuf,
    path: PathTracker,
    entries: Vec<ExtractedEntry>,
}

impl ExtractVisitor {
    pub fn new(dir: &str) -> VisitResult<Self> {
        if dir.is_empty() {
            return Err(VisitorError::invalid_argument(
                "extract",
                dir,
                "output directory must not be empty",
            ));
        }
        Ok(Self {
            dir: PathBuf::from(dir),
            path: PathTracker::default(),
            entries: Vec::new(),
        })
    }

    pub fn entries(&self) -> &[ExtractedEntry] {
        &self.entries
    }

    fn write(&self, file: &Path, bytes: &[u8]) -> VisitResult<()> {
        fs::write(file, bytes).map_err(|e| VisitorError::io(file, e))
    }
}

/// Keep names filesystem-safe; anything outside `[A-Za-z0-9._-]` becomes `_`.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

impl Visitor for ExtractVisitor {
    fn name(&self) -> &str {
        "extract"
    }

    fn run(&mut self, root: &mut Node) -> VisitResult<()> {
        self.path.clear();
        self.entries.clear();
        fs::create_dir_all(&self.dir).map_err(|e| VisitorError::io(&self.dir, e))?;

        self.visit(root)?;

        let summary = serde_json::to_string_pretty(&self.entries)?;
        self.write(&self.dir.join(SUMMARY_FILE), summary.as_bytes())?;
        info!(
            "extract: {} files written to {}",
            self.entries.len(),
            self.dir.display()
        );
        Ok(())
    }

    fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
        self.path.enter(&node.name);
        if node.is_leaf() && !node.data.is_empty() {
            let file = format!("{:04}_{}.bin", self.entries.len(), sanitize(&node.name));
            self.write(&self.dir.join(&file), &node.data)?;
            debug!("extracted {} -> {}", self.path.current(), file);
            self.entries.push(ExtractedEntry {
                file,
                path: self.path.current(),
                kind: node.kind,
                size: node.data.len(),
            });
        }
        let result = node.apply_children(self);
        self.path.leave();
        result
    }
}
