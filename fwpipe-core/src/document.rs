/*!
 * Firmware document tree
 *
 * A deliberately small model of a firmware image: a tree of typed, named
 * nodes where each node may carry raw bytes and children. The flattened
 * image is each node's own bytes followed by its children's, depth first.
 */

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DocumentError, DocumentResult, VisitResult};
use crate::visitor::Visitor;

/// Anything a pipeline can be executed against.
pub trait Document {
    /// Apply `visitor` across the whole document, returning the first error
    /// the traversal hits.
    fn apply(&mut self, visitor: &mut dyn Visitor) -> VisitResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Image,
    Region,
    Volume,
    File,
    Section,
    Pad,
    Raw,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Image => "image",
            NodeKind::Region => "region",
            NodeKind::Volume => "volume",
            NodeKind::File => "file",
            NodeKind::Section => "section",
            NodeKind::Pad => "pad",
            NodeKind::Raw => "raw",
        }
    }

    /// Kinds that hold bytes only and must not have children.
    pub fn is_leaf_kind(&self) -> bool {
        matches!(self, NodeKind::Section | NodeKind::Pad | NodeKind::Raw)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub name: String,
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            data: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Visit every child in order, stopping at the first error.
    pub fn apply_children<V: Visitor + ?Sized>(&mut self, visitor: &mut V) -> VisitResult<()> {
        for child in self.children.iter_mut() {
            visitor.visit(child)?;
        }
        Ok(())
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Size in bytes of the flattened node.
    pub fn total_size(&self) -> usize {
        self.data.len() + self.children.iter().map(Node::total_size).sum::<usize>()
    }

    pub fn flatten(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.total_size());
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.data);
        for child in &self.children {
            child.flatten_into(out);
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Node::node_count).sum::<usize>()
    }

    /// Serialize this node as the root of a document, in the same format
    /// [`Firmware::load`] reads back.
    pub fn to_document_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&DocumentRef { root: self })
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    root: &'a Node,
}

/// The document a pipeline runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firmware {
    pub root: Node,
}

impl Firmware {
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// Load a firmware document from disk.
    ///
    /// JSON trees (as written by the `save` visitor) are parsed back into a
    /// tree; anything else, including binaries that merely start with `{`,
    /// becomes a single raw node named after the file.
    pub fn load(path: impl AsRef<Path>) -> DocumentResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if looks_like_json(&bytes) {
            match serde_json::from_slice::<Firmware>(&bytes) {
                Ok(firmware) => {
                    info!(
                        "loaded document tree from {} ({} nodes)",
                        path.display(),
                        firmware.root.node_count()
                    );
                    return Ok(firmware);
                }
                Err(e) => debug!(
                    "{} is not a document tree ({}), loading as raw image",
                    path.display(),
                    e
                ),
            }
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!("loaded raw image {} ({} bytes)", path.display(), bytes.len());
        Ok(Self::new(Node::new(NodeKind::Raw, name).with_data(bytes)))
    }

    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(self.root.to_document_json()?)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote document tree to {}", path.display());
        Ok(())
    }

    pub fn save_binary(&self, path: impl AsRef<Path>) -> DocumentResult<()> {
        let path = path.as_ref();
        fs::write(path, self.root.flatten()).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote flattened image to {}", path.display());
        Ok(())
    }
}

impl Document for Firmware {
    fn apply(&mut self, visitor: &mut dyn Visitor) -> VisitResult<()> {
        visitor.run(&mut self.root)
    }
}

fn looks_like_json(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{')
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisitorError;

    fn sample() -> Firmware {
        Firmware::new(
            Node::new(NodeKind::Image, "bios.rom").with_children(vec![
                Node::new(NodeKind::Volume, "FV_MAIN").with_children(vec![
                    Node::new(NodeKind::File, "DxeCore").with_data(vec![1, 2, 3]),
                    Node::new(NodeKind::Pad, "pad").with_data(vec![0xff; 4]),
                ]),
                Node::new(NodeKind::Raw, "tail").with_data(vec![9]),
            ]),
        )
    }

    struct NameCollector(Vec<String>);

    impl Visitor for NameCollector {
        fn name(&self) -> &str {
            "collect"
        }

        fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
            self.0.push(node.name.clone());
            node.apply_children(self)
        }
    }

    struct FailOn(&'static str, usize);

    impl Visitor for FailOn {
        fn name(&self) -> &str {
            "fail"
        }

        fn visit(&mut self, node: &mut Node) -> VisitResult<()> {
            self.1 += 1;
            if node.name == self.0 {
                return Err(VisitorError::Failed {
                    visitor: "fail".to_string(),
                    message: format!("hit {}", node.name),
                });
            }
            node.apply_children(self)
        }
    }

    #[test]
    fn test_apply_walks_depth_first() {
        let mut fw = sample();
        let mut collector = NameCollector(Vec::new());
        fw.apply(&mut collector).unwrap();
        assert_eq!(collector.0, vec!["bios.rom", "FV_MAIN", "DxeCore", "pad", "tail"]);
    }

    #[test]
    fn test_apply_stops_at_first_error() {
        let mut fw = sample();
        let mut visitor = FailOn("DxeCore", 0);
        let err = fw.apply(&mut visitor).unwrap_err();
        assert!(err.to_string().contains("hit DxeCore"));
        // bios.rom, FV_MAIN, DxeCore; "pad" and "tail" are never reached
        assert_eq!(visitor.1, 3);
    }

    #[test]
    fn test_sizes_and_flatten() {
        let fw = sample();
        assert_eq!(fw.root.total_size(), 8);
        assert_eq!(fw.root.flatten(), vec![1, 2, 3, 0xff, 0xff, 0xff, 0xff, 9]);
        assert_eq!(fw.root.node_count(), 5);
    }

    #[test]
    fn test_json_roundtrip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        let fw = sample();
        fw.save_json(&path).unwrap();

        let loaded = Firmware::load(&path).unwrap();
        assert_eq!(loaded, fw);
    }

    #[test]
    fn test_load_raw_binary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flash.bin");
        fs::write(&path, [0x5a, 0xa5, 0x00]).unwrap();

        let fw = Firmware::load(&path).unwrap();
        assert_eq!(fw.root.kind, NodeKind::Raw);
        assert_eq!(fw.root.name, "flash.bin");
        assert_eq!(fw.root.data, vec![0x5a, 0xa5, 0x00]);
    }

    #[test]
    fn test_load_truncated_json_falls_back_to_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"root\": ").unwrap();

        let fw = Firmware::load(&path).unwrap();
        assert_eq!(fw.root.kind, NodeKind::Raw);
        assert_eq!(fw.root.name, "broken.json");
        assert_eq!(fw.root.data, b"{ \"root\": ".to_vec());
    }

    #[test]
    fn test_load_brace_prefixed_binary() {
        let dir = tempfile::tempdir().unwrap();
        for (name, bytes) in [
            ("brace.bin", vec![b'{', 0x00, 0xff, 0x10]),
            ("padded.bin", vec![0x20, 0x0a, b'{', 0xde, 0xad]),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, &bytes).unwrap();

            let fw = Firmware::load(&path).unwrap();
            assert_eq!(fw.root.kind, NodeKind::Raw);
            assert_eq!(fw.root.name, name);
            assert_eq!(fw.root.data, bytes);
            assert!(fw.root.children.is_empty());
        }
    }

    #[test]
    fn test_save_binary_writes_flattened_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        sample().save_binary(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap().len(), 8);
    }
}
