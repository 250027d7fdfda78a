//! In-memory node model.
//!
//! Nodes live in the notebook's arena and refer to each other by
//! [`NodeId`]. A node never stores its full path; the path is derived by
//! walking the parent chain, so a directory rename only has to touch one
//! basename. The children list is `None` until first accessed, which is
//! the unloaded/loaded sentinel driving lazy loading.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::attrs::{AttrValue, SORT_NONE};
use crate::meta::MetaData;

/// Fixed name of a page's content file inside its node directory.
pub const PAGE_DATA_FILE: &str = "page.html";

/// Stable identity of a node within one notebook.
///
/// Ids are never reused; a deleted node keeps its id and is permanently
/// marked invalid. Ids from one notebook are meaningless in another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Node variant, parsed from the persisted content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    Page,
    Trash,
}

impl NodeKind {
    /// Content-type identifier persisted in the metadata sidecar.
    pub fn content_type(&self) -> &'static str {
        match self {
            NodeKind::Folder => "folder",
            NodeKind::Page => "page",
            NodeKind::Trash => "trash",
        }
    }

    pub fn from_content_type(content_type: &str) -> Option<NodeKind> {
        match content_type {
            "folder" => Some(NodeKind::Folder),
            "page" => Some(NodeKind::Page),
            "trash" => Some(NodeKind::Trash),
            _ => None,
        }
    }

    /// The trash folder itself cannot be deleted.
    pub fn is_deletable(&self) -> bool {
        !matches!(self, NodeKind::Trash)
    }

    /// The trash folder may only ever sit directly under the root.
    pub fn must_stay_under_root(&self) -> bool {
        matches!(self, NodeKind::Trash)
    }
}

/// One entry in the notebook's node arena.
#[derive(Debug)]
pub struct Node {
    /// Directory basename; the root node stores the full root path here.
    pub(crate) basename: PathBuf,
    pub(crate) parent: Option<NodeId>,
    /// `None` until the directory has been listed.
    pub(crate) children: Option<Vec<NodeId>>,
    pub(crate) attrs: BTreeMap<String, AttrValue>,
    pub(crate) kind: NodeKind,
    pub(crate) version: u32,
    pub(crate) valid: bool,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, basename: PathBuf, parent: Option<NodeId>, title: &str) -> Self {
        let mut attrs = BTreeMap::new();
        attrs.insert("title".to_string(), AttrValue::Text(title.to_string()));
        attrs.insert(
            "content_type".to_string(),
            AttrValue::Text(kind.content_type().to_string()),
        );
        // unplaced nodes sort after every ordered sibling
        attrs.insert("order".to_string(), AttrValue::Int(i64::MAX));
        attrs.insert("expanded".to_string(), AttrValue::Bool(false));
        attrs.insert("expanded2".to_string(), AttrValue::Bool(false));
        attrs.insert("info_sort".to_string(), AttrValue::Int(SORT_NONE));
        attrs.insert("info_sort_dir".to_string(), AttrValue::Int(1));

        Self {
            basename,
            parent,
            children: None,
            attrs,
            kind,
            version: crate::FORMAT_VERSION,
            valid: true,
        }
    }

    pub fn title(&self) -> &str {
        self.attrs
            .get("title")
            .and_then(AttrValue::as_text)
            .unwrap_or("")
    }

    pub fn is_page(&self) -> bool {
        self.kind == NodeKind::Page
    }

    pub(crate) fn order(&self) -> i64 {
        self.attrs
            .get("order")
            .and_then(AttrValue::as_int)
            .unwrap_or(i64::MAX)
    }

    pub(crate) fn set_order(&mut self, order: i64) {
        self.attrs.insert("order".to_string(), AttrValue::Int(order));
    }

    /// Overlays decoded sidecar data onto the node's default attributes.
    pub(crate) fn apply_meta(&mut self, meta: MetaData) {
        self.version = meta.version;
        self.attrs.extend(meta.attrs);
    }
}

/// Returns the content-file path for a node directory.
pub fn data_file(node_dir: &Path) -> PathBuf {
    node_dir.join(PAGE_DATA_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_round_trip_through_kind() {
        for kind in [NodeKind::Folder, NodeKind::Page, NodeKind::Trash] {
            assert_eq!(NodeKind::from_content_type(kind.content_type()), Some(kind));
        }
        assert_eq!(NodeKind::from_content_type("application/x-unknown"), None);
    }

    #[test]
    fn trash_policy_flags() {
        assert!(!NodeKind::Trash.is_deletable());
        assert!(NodeKind::Trash.must_stay_under_root());
        assert!(NodeKind::Folder.is_deletable());
        assert!(!NodeKind::Page.must_stay_under_root());
    }

    #[test]
    fn new_node_seeds_default_attributes() {
        let node = Node::new(NodeKind::Page, PathBuf::from("draft"), None, "Draft");
        assert_eq!(node.title(), "Draft");
        assert_eq!(node.order(), i64::MAX);
        assert_eq!(
            node.attrs.get("content_type"),
            Some(&AttrValue::Text("page".into()))
        );
        assert_eq!(node.attrs.get("expanded"), Some(&AttrValue::Bool(false)));
        assert!(node.valid);
        assert!(node.children.is_none());
    }
}
