//! Polymorphic node construction.
//!
//! A dispatch table keyed by content-type string decides which node
//! variant a directory becomes when it is read back from disk. Unknown
//! directories are not an error: a directory without a metadata sidecar,
//! or with a content type nobody registered, is simply not a node and is
//! skipped during child enumeration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::attrs::{AttrSchema, AttrValue};
use crate::error::Result;
use crate::meta;
use crate::node::{Node, NodeId, NodeKind};

/// Builds a node variant from its directory basename and parent.
pub type NodeCtor = fn(basename: PathBuf, parent: Option<NodeId>) -> Node;

fn make_folder(basename: PathBuf, parent: Option<NodeId>) -> Node {
    Node::new(NodeKind::Folder, basename, parent, "")
}

fn make_page(basename: PathBuf, parent: Option<NodeId>) -> Node {
    Node::new(NodeKind::Page, basename, parent, "")
}

fn make_trash(basename: PathBuf, parent: Option<NodeId>) -> Node {
    Node::new(NodeKind::Trash, basename, parent, crate::notebook::TRASH_TITLE)
}

/// Registry of node constructors, keyed by content type.
#[derive(Debug, Clone)]
pub struct NodeFactory {
    makers: HashMap<String, NodeCtor>,
}

impl NodeFactory {
    /// An empty factory with no registered types.
    pub fn empty() -> Self {
        Self { makers: HashMap::new() }
    }

    pub fn register(&mut self, content_type: &str, ctor: NodeCtor) {
        self.makers.insert(content_type.to_string(), ctor);
    }

    /// Reconstructs the node stored at `path`, if `path` is a node at all.
    ///
    /// Returns `Ok(None)` when the directory has no metadata sidecar or
    /// its content type has no registered constructor. A sidecar that
    /// exists but cannot be decoded is an error, left to the caller to
    /// skip or surface.
    pub fn read_node(
        &self,
        schema: &AttrSchema,
        parent: Option<NodeId>,
        path: &Path,
    ) -> Result<Option<Node>> {
        let metafile = meta::meta_file(path);
        if !metafile.exists() {
            return Ok(None);
        }

        let data = meta::read(&metafile, schema)?;
        let content_type = data
            .attrs
            .get("content_type")
            .and_then(AttrValue::as_text)
            .unwrap_or(NodeKind::Folder.content_type())
            .to_string();

        let Some(ctor) = self.makers.get(&content_type) else {
            debug!(
                path = %path.display(),
                %content_type,
                "skipping node with unregistered content type"
            );
            return Ok(None);
        };

        let Some(basename) = path.file_name().map(PathBuf::from) else {
            return Ok(None);
        };

        let mut node = ctor(basename, parent);
        node.apply_meta(data);
        Ok(Some(node))
    }
}

impl Default for NodeFactory {
    /// Factory with the three standard variants registered.
    fn default() -> Self {
        let mut factory = Self::empty();
        factory.register(NodeKind::Folder.content_type(), make_folder);
        factory.register(NodeKind::Page.content_type(), make_page);
        factory.register(NodeKind::Trash.content_type(), make_trash);
        factory
    }
}
