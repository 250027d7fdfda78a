//! The notebook store.
//!
//! A [`Notebook`] owns the whole node tree in an arena keyed by
//! [`NodeId`], together with the store-wide state: the attribute schema,
//! the node factory, the dirty set, the change-listener registry, and
//! the preferences record. All tree mutation goes through methods here
//! so that filesystem changes, in-memory changes, persistence, and
//! notification always happen in that order — an observer never sees a
//! notification for a change that failed to persist.
//!
//! Children are loaded lazily: the first access to a node's children
//! lists its directory and asks the factory to reconstruct each entry.
//! A child whose sidecar cannot be read is skipped with a warning so one
//! corrupt directory does not take its siblings down with it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::attrs::{timestamp_now, AttrSchema, AttrValue, SORT_NONE};
use crate::error::{BinderyError, Result};
use crate::factory::NodeFactory;
use crate::filename;
use crate::listen::Listeners;
use crate::meta::{self, write_atomic};
use crate::node::{self, Node, NodeId, NodeKind};
use crate::prefs::{self, Preferences};

/// Reserved trash directory name, directly under the root.
pub const TRASH_DIR: &str = "__trash__";

/// Display title of the trash folder.
pub const TRASH_TITLE: &str = "Trash";

pub const DEFAULT_PAGE_TITLE: &str = "New Page";
pub const DEFAULT_FOLDER_TITLE: &str = "New Folder";

/// Boilerplate body written when a page is created.
const BLANK_PAGE: &str = "\
<?xml version=\"1.0\" encoding=\"UTF-8\"?>
<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" \"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">
<html xmlns=\"http://www.w3.org/1999/xhtml\"><body></body></html>
";

/// A notebook: the root of the node tree plus all store-wide state.
pub struct Notebook {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
    root: NodeId,
    trash: Option<NodeId>,
    trash_path: PathBuf,
    dirty: HashSet<NodeId>,
    schema: AttrSchema,
    factory: NodeFactory,
    /// Broadcasts tree mutations to external observers.
    pub node_changed: Listeners,
    pub prefs: Preferences,
}

impl Notebook {
    /// Builds the in-memory store for `rootdir` without touching the
    /// filesystem. Use [`Notebook::create`] or [`Notebook::load`] to get
    /// a notebook backed by disk.
    pub fn new(rootdir: impl Into<PathBuf>) -> Self {
        let rootdir = rootdir.into();
        let title = rootdir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| rootdir.to_string_lossy().into_owned());
        let trash_path = rootdir.join(TRASH_DIR);

        let mut root_node = Node::new(NodeKind::Folder, rootdir, None, &title);
        root_node.set_order(0);

        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(root, root_node);

        Self {
            nodes,
            next_id: 1,
            root,
            trash: None,
            trash_path,
            dirty: HashSet::new(),
            schema: AttrSchema::default(),
            factory: NodeFactory::default(),
            node_changed: Listeners::new(),
            prefs: Preferences::default(),
        }
    }

    /// Initializes a new notebook on disk at `rootdir`.
    pub fn create(rootdir: impl Into<PathBuf>) -> Result<Notebook> {
        let mut nb = Notebook::new(rootdir);
        let root = nb.root;
        let dir = nb.path(root);
        debug!(path = %dir.display(), "creating notebook");

        fs::create_dir(&dir).map_err(|e| {
            BinderyError::io(format!("cannot create notebook '{}'", dir.display()), e)
        })?;

        let now = timestamp_now();
        let node = nb.node_mut(root);
        node.attrs.insert("created_time".into(), AttrValue::Int(now));
        node.attrs.insert("modified_time".into(), AttrValue::Int(now));

        let node = nb.node(root);
        meta::write(&meta::meta_file(&dir), node.version, &node.attrs, &nb.schema)?;
        nb.write_prefs()?;
        Ok(nb)
    }

    /// Opens an existing notebook at `rootdir`.
    pub fn load(rootdir: impl Into<PathBuf>) -> Result<Notebook> {
        let rootdir = rootdir.into();
        if !rootdir.is_dir() {
            return Err(BinderyError::io(
                format!("cannot find notebook '{}'", rootdir.display()),
                io::Error::new(io::ErrorKind::NotFound, "no such directory"),
            ));
        }

        let mut nb = Notebook::new(rootdir);
        let root = nb.root;
        let dir = nb.path(root);

        let data = meta::read(&meta::meta_file(&dir), &nb.schema)?;
        nb.node_mut(root).apply_meta(data);
        nb.prefs = Preferences::read(&prefs::pref_file(&dir))?;

        debug!(path = %dir.display(), "loaded notebook");
        nb.node_changed.notify(&[root], true);
        Ok(nb)
    }

    //===============================================
    // accessors

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The trash node, creating it on disk if the notebook has none yet.
    pub fn trash(&mut self) -> Result<NodeId> {
        if self.trash.is_none() {
            self.ensure_ready(self.root)?;
        }
        self.trash
            .ok_or_else(|| BinderyError::illegal("notebook has no trash folder"))
    }

    pub fn is_valid(&self, id: NodeId) -> bool {
        self.node(id).valid
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn is_page(&self, id: NodeId) -> bool {
        self.node(id).is_page()
    }

    pub fn version(&self, id: NodeId) -> u32 {
        self.node(id).version
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn title(&self, id: NodeId) -> &str {
        self.node(id).title()
    }

    /// The node's directory path, derived from the ownership chain.
    pub fn path(&self, id: NodeId) -> PathBuf {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let n = self.node(current);
            segments.push(n.basename.clone());
            cursor = n.parent;
        }
        let mut path = PathBuf::new();
        for segment in segments.into_iter().rev() {
            path.push(segment);
        }
        path
    }

    /// Path of the node's content file (pages only have one in practice).
    pub fn data_file(&self, id: NodeId) -> PathBuf {
        node::data_file(&self.path(id))
    }

    /// True if the node sits anywhere below the trash folder.
    pub fn in_trash(&self, id: NodeId) -> bool {
        let Some(trash) = self.trash else {
            return false;
        };
        let mut cursor = self.node(id).parent;
        while let Some(p) = cursor {
            if p == trash {
                return true;
            }
            cursor = self.node(p).parent;
        }
        false
    }

    pub fn schema_mut(&mut self) -> &mut AttrSchema {
        &mut self.schema
    }

    pub fn factory_mut(&mut self) -> &mut NodeFactory {
        &mut self.factory
    }

    //===============================================
    // attributes

    pub fn get_attr(&self, id: NodeId, key: &str) -> Option<&AttrValue> {
        self.node(id).attrs.get(key)
    }

    /// Sets an attribute and marks the node dirty. Deleted nodes are
    /// frozen: writes to them are ignored.
    pub fn set_attr(&mut self, id: NodeId, key: &str, value: AttrValue) {
        if !self.node(id).valid {
            return;
        }
        self.node_mut(id).attrs.insert(key.to_string(), value);
        self.set_dirty(id, true);
    }

    pub fn del_attr(&mut self, id: NodeId, key: &str) {
        if !self.node(id).valid {
            return;
        }
        self.node_mut(id).attrs.remove(key);
        self.set_dirty(id, true);
    }

    /// Stamps a timestamp attribute with the current time.
    pub fn set_attr_timestamp(&mut self, id: NodeId, key: &str) {
        self.set_attr(id, key, AttrValue::Int(timestamp_now()));
    }

    pub fn set_info_sort(&mut self, id: NodeId, sort: i64, direction: i64) {
        self.set_attr(id, "info_sort", AttrValue::Int(sort));
        self.set_attr(id, "info_sort_dir", AttrValue::Int(direction));
    }

    pub fn info_sort(&self, id: NodeId) -> (i64, i64) {
        let sort = self
            .get_attr(id, "info_sort")
            .and_then(AttrValue::as_int)
            .unwrap_or(SORT_NONE);
        let direction = self
            .get_attr(id, "info_sort_dir")
            .and_then(AttrValue::as_int)
            .unwrap_or(1);
        (sort, direction)
    }

    //===============================================
    // children

    /// The node's children, loading them from disk on first access.
    ///
    /// Loaded children are sorted by their stored `order` and renumbered
    /// into a contiguous 0-based sequence. Directory entries that are
    /// not nodes are skipped silently; entries whose sidecar cannot be
    /// decoded are skipped with a warning.
    pub fn children(&mut self, id: NodeId) -> Result<Vec<NodeId>> {
        self.ensure_ready(id)?;
        Ok(self.node(id).children.clone().unwrap_or_default())
    }

    fn ensure_ready(&mut self, id: NodeId) -> Result<()> {
        if self.node(id).children.is_none() {
            self.load_children(id)?;
        }
        if id == self.root && self.trash.is_none() {
            self.init_trash()?;
        }
        Ok(())
    }

    fn load_children(&mut self, id: NodeId) -> Result<()> {
        let dir = self.path(id);
        let entries = fs::read_dir(&dir).map_err(|e| {
            BinderyError::io(
                format!("cannot read folder contents '{}'", dir.display()),
                e,
            )
        })?;

        let mut loaded: Vec<NodeId> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                BinderyError::io(
                    format!("cannot read folder contents '{}'", dir.display()),
                    e,
                )
            })?;
            let child_path = entry.path();
            match self.factory.read_node(&self.schema, Some(id), &child_path) {
                Ok(Some(child)) => {
                    let cid = self.insert(child);
                    loaded.push(cid);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %child_path.display(), error = %e, "skipping unreadable child");
                }
            }
        }

        loaded.sort_by_key(|cid| self.node(*cid).order());
        self.node_mut(id).children = Some(loaded);
        self.renumber_children(id);
        Ok(())
    }

    fn init_trash(&mut self) -> Result<()> {
        let kids = self.node(self.root).children.clone().unwrap_or_default();
        for cid in kids {
            if self.path(cid) == self.trash_path {
                self.trash = Some(cid);
                return Ok(());
            }
        }

        // no trash on disk yet; create and append one
        let mut node = Node::new(
            NodeKind::Trash,
            PathBuf::from(TRASH_DIR),
            Some(self.root),
            TRASH_TITLE,
        );
        let dir = self.trash_path.clone();
        self.materialize(&mut node, &dir)
            .map_err(|e| match e {
                BinderyError::Io(_, source) => {
                    BinderyError::io("cannot create trash folder", source)
                }
                other => other,
            })?;
        let id = self.insert(node);
        self.attach_child(self.root, id, None)?;
        self.trash = Some(id);
        self.save_node(id, true)?;
        Ok(())
    }

    /// Re-stamps the `order` attribute of every loaded child to match
    /// its list position, dirtying only the ones that actually changed.
    fn renumber_children(&mut self, parent: NodeId) {
        let kids = self.node(parent).children.clone().unwrap_or_default();
        for (i, cid) in kids.into_iter().enumerate() {
            if self.node(cid).order() != i as i64 {
                self.node_mut(cid).set_order(i as i64);
                self.set_dirty(cid, true);
            }
        }
    }

    fn attach_child(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) -> Result<()> {
        if self.node(parent).children.is_none() {
            self.load_children(parent)?;
        }
        let len = self.node(parent).children.as_ref().map_or(0, Vec::len);

        match index {
            Some(i) => {
                let i = i.min(len);
                if let Some(kids) = self.node_mut(parent).children.as_mut() {
                    kids.insert(i, child);
                }
                self.renumber_children(parent);
            }
            None => {
                let last = self.node(parent).children.as_ref().and_then(|c| c.last().copied());
                if self.trash.is_some() && last == self.trash {
                    // keep the trash folder in the last slot
                    if let Some(kids) = self.node_mut(parent).children.as_mut() {
                        kids.insert(len - 1, child);
                    }
                    self.renumber_children(parent);
                } else {
                    self.node_mut(child).set_order(len as i64);
                    if let Some(kids) = self.node_mut(parent).children.as_mut() {
                        kids.push(child);
                    }
                }
            }
        }
        self.set_dirty(child, true);
        Ok(())
    }

    fn detach_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.node(parent).children.is_none() {
            self.load_children(parent)?;
        }
        if let Some(kids) = self.node_mut(parent).children.as_mut() {
            kids.retain(|c| *c != child);
        }
        Ok(())
    }

    //===============================================
    // lifecycle

    /// Creates a new page under `parent` and returns its id.
    pub fn new_page(&mut self, parent: NodeId, title: &str) -> Result<NodeId> {
        self.new_child(parent, NodeKind::Page, title)
    }

    /// Creates a new folder under `parent` and returns its id.
    pub fn new_folder(&mut self, parent: NodeId, title: &str) -> Result<NodeId> {
        self.new_child(parent, NodeKind::Folder, title)
    }

    fn new_child(&mut self, parent: NodeId, kind: NodeKind, title: &str) -> Result<NodeId> {
        if !self.node(parent).valid {
            return Err(BinderyError::illegal("cannot create a child under a deleted node"));
        }
        self.ensure_ready(parent)?;

        let parent_path = self.path(parent);
        let dir = filename::valid_unique_path(&parent_path, title, "");
        let basename = PathBuf::from(dir.file_name().unwrap_or(dir.as_os_str()));
        debug!(parent = %parent, title, path = %dir.display(), "creating node");

        let mut node = Node::new(kind, basename, Some(parent), title);
        self.materialize(&mut node, &dir)?;
        let id = self.insert(node);

        self.attach_child(parent, id, None)?;
        self.save_node(id, true)?;
        self.node_changed.notify(&[parent], true);
        Ok(id)
    }

    /// Creates the node's directory and initial files on disk.
    fn materialize(&self, node: &mut Node, dir: &Path) -> Result<()> {
        fs::create_dir(dir)
            .map_err(|e| BinderyError::io(format!("cannot create node '{}'", dir.display()), e))?;

        let now = timestamp_now();
        node.attrs.insert("created_time".into(), AttrValue::Int(now));
        node.attrs.insert("modified_time".into(), AttrValue::Int(now));
        meta::write(&meta::meta_file(dir), node.version, &node.attrs, &self.schema)?;

        if node.is_page() {
            let data = node::data_file(dir);
            write_atomic(&data, BLANK_PAGE.as_bytes()).map_err(|e| {
                BinderyError::io(format!("cannot initialize page file '{}'", data.display()), e)
            })?;
        }
        Ok(())
    }

    /// Renames the node's title, keeping the directory name in step.
    ///
    /// The root's directory is named externally, so renaming the root
    /// only updates its title attribute. A failed rename leaves the
    /// in-memory state untouched.
    pub fn rename(&mut self, id: NodeId, title: &str) -> Result<()> {
        if !self.node(id).valid {
            return Err(BinderyError::illegal("cannot rename a deleted node"));
        }
        if title == self.node(id).title() {
            return Ok(());
        }
        if self.node(id).parent.is_none() {
            self.node_mut(id)
                .attrs
                .insert("title".into(), AttrValue::Text(title.to_string()));
            self.set_dirty(id, true);
            return Ok(());
        }

        let path = self.path(id);
        let parent_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let dest = filename::valid_unique_path(&parent_dir, title, "");
        fs::rename(&path, &dest).map_err(|e| {
            BinderyError::io(
                format!("cannot rename '{}' to '{}'", path.display(), dest.display()),
                e,
            )
        })?;

        let old_title = self.node(id).title().to_string();
        let old_basename = self.node(id).basename.clone();
        let was_dirty = self.dirty.contains(&id);

        self.node_mut(id)
            .attrs
            .insert("title".into(), AttrValue::Text(title.to_string()));
        self.node_mut(id).basename = PathBuf::from(dest.file_name().unwrap_or(dest.as_os_str()));
        self.set_dirty(id, true);

        if let Err(e) = self.save_node(id, true) {
            // roll everything back so the caller sees the old state
            self.node_mut(id)
                .attrs
                .insert("title".into(), AttrValue::Text(old_title));
            self.node_mut(id).basename = old_basename;
            self.set_dirty(id, was_dirty);
            let _ = fs::rename(&dest, &path);
            return Err(e);
        }

        debug!(node = %id, title, "renamed node");
        self.node_changed.notify(&[id], false);
        Ok(())
    }

    /// Moves the node under `new_parent`, at `index` or appended.
    ///
    /// Within the same parent this is a pure reorder with no filesystem
    /// effect; a forward move has its target index pulled back by one
    /// because the removal shifts every later sibling down. Across
    /// parents the directory is renamed first, so a filesystem failure
    /// leaves the tree untouched.
    pub fn move_node(&mut self, id: NodeId, new_parent: NodeId, index: Option<usize>) -> Result<()> {
        if id == new_parent {
            return Err(BinderyError::illegal("cannot move a node into itself"));
        }
        if id == self.root {
            return Err(BinderyError::illegal("cannot move the notebook root"));
        }
        if !self.node(id).valid || !self.node(new_parent).valid {
            return Err(BinderyError::illegal("cannot move a deleted node"));
        }
        if self.node(id).kind.must_stay_under_root() && new_parent != self.root {
            return Err(BinderyError::illegal("the trash folder must be a top-level folder"));
        }
        if self.is_ancestor(id, new_parent) {
            return Err(BinderyError::illegal("cannot move a node into its own subtree"));
        }
        let Some(old_parent) = self.node(id).parent else {
            return Err(BinderyError::illegal("cannot move a node with no parent"));
        };

        self.ensure_ready(new_parent)?;
        let mut index = index;

        if old_parent != new_parent {
            let path = self.path(id);
            let title = self.node(id).title().to_string();
            let new_parent_path = self.path(new_parent);
            let dest = filename::valid_unique_path(&new_parent_path, &title, "");
            fs::rename(&path, &dest)
                .map_err(|e| BinderyError::io("do not have permission for move", e))?;
            self.node_mut(id).basename =
                PathBuf::from(dest.file_name().unwrap_or(dest.as_os_str()));

            self.detach_child(old_parent, id)?;
            self.renumber_children(old_parent);
            self.node_mut(id).parent = Some(new_parent);
            self.attach_child(new_parent, id, index)?;
        } else {
            self.detach_child(old_parent, id)?;
            if let Some(i) = index {
                let order = self.node(id).order();
                // removal shifted everything after the old slot down one
                if order >= 0 && (order as usize) < i {
                    index = Some(i - 1);
                }
            }
            self.attach_child(old_parent, id, index)?;
        }

        self.set_dirty(id, true);
        self.save_node(id, true)?;
        debug!(node = %id, from = %old_parent, to = %new_parent, "moved node");

        if old_parent != new_parent {
            self.node_changed.notify(&[old_parent, new_parent], true);
        } else {
            self.node_changed.notify(&[old_parent], true);
        }
        Ok(())
    }

    /// Permanently deletes the node and its whole subtree.
    pub fn delete(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(BinderyError::illegal("cannot delete the notebook root"));
        }
        if !self.node(id).kind.is_deletable() {
            return Err(BinderyError::illegal("the trash folder cannot be deleted"));
        }
        let Some(parent) = self.node(id).parent else {
            return Err(BinderyError::illegal("cannot delete a node with no parent"));
        };

        let path = self.path(id);
        fs::remove_dir_all(&path)
            .map_err(|e| BinderyError::io("do not have permission to delete", e))?;

        self.detach_child(parent, id)?;
        self.renumber_children(parent);
        self.set_dirty(id, false);
        self.invalidate_subtree(id);

        debug!(node = %id, path = %path.display(), "deleted node");
        self.node_changed.notify(&[parent], true);
        Ok(())
    }

    /// Marks a node and every already-loaded descendant permanently
    /// invalid. The subtree's directory is already gone, so the
    /// filesystem is not touched.
    fn invalidate_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            self.node_mut(current).valid = false;
            if let Some(kids) = &self.node(current).children {
                stack.extend(kids.iter().copied());
            }
        }
    }

    /// Soft-deletes the node: moves it into the trash folder, or deletes
    /// it outright if it is already inside the trash.
    pub fn trash_node(&mut self, id: NodeId) -> Result<()> {
        if self.in_trash(id) {
            self.delete(id)
        } else {
            let trash = self.trash()?;
            self.move_node(id, trash, None)
        }
    }

    /// Permanently deletes everything inside the trash folder.
    ///
    /// Children are processed in reverse so each deletion's renumbering
    /// cannot disturb the ones still pending.
    pub fn empty_trash(&mut self) -> Result<()> {
        let trash = self.trash()?;
        let kids = self.children(trash)?;
        debug!(count = kids.len(), "emptying trash");
        for id in kids.into_iter().rev() {
            self.delete(id)?;
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: NodeId, of: NodeId) -> bool {
        let mut cursor = self.node(of).parent;
        while let Some(p) = cursor {
            if p == ancestor {
                return true;
            }
            cursor = self.node(p).parent;
        }
        false
    }

    //===============================================
    // persistence

    pub fn is_dirty(&self, id: NodeId) -> bool {
        self.dirty.contains(&id)
    }

    /// True if any node is waiting to be saved.
    pub fn save_needed(&self) -> bool {
        !self.dirty.is_empty()
    }

    fn set_dirty(&mut self, id: NodeId, dirty: bool) {
        if dirty {
            self.dirty.insert(id);
        } else {
            self.dirty.remove(&id);
        }
    }

    /// Writes the node's sidecar if it is dirty (or `force`), then
    /// clears its dirty flag. Saving a deleted node is a no-op.
    pub fn save_node(&mut self, id: NodeId, force: bool) -> Result<()> {
        if (force || self.dirty.contains(&id)) && self.node(id).valid {
            let dir = self.path(id);
            let n = self.node(id);
            meta::write(&meta::meta_file(&dir), n.version, &n.attrs, &self.schema)?;
            self.set_dirty(id, false);
        }
        Ok(())
    }

    /// Saves the notebook.
    ///
    /// With `force`, rewrites the root metadata, the preferences file,
    /// and every loaded node whether dirty or not. Without it, saves
    /// exactly the nodes in the dirty set. The dirty set is cleared on
    /// success either way.
    pub fn save(&mut self, force: bool) -> Result<()> {
        if force || self.dirty.contains(&self.root) {
            let dir = self.path(self.root);
            let n = self.node(self.root);
            meta::write(&meta::meta_file(&dir), n.version, &n.attrs, &self.schema)?;
            self.write_prefs()?;
        }
        self.set_dirty(self.root, false);

        if force {
            let mut stack: Vec<NodeId> =
                self.node(self.root).children.clone().unwrap_or_default();
            while let Some(id) = stack.pop() {
                self.save_node(id, true)?;
                if let Some(kids) = &self.node(id).children {
                    stack.extend(kids.iter().copied());
                }
            }
        } else {
            // snapshot first: saving clears flags as it goes
            let pending: Vec<NodeId> = self.dirty.iter().copied().collect();
            for id in pending {
                self.save_node(id, false)?;
            }
        }

        self.dirty.clear();
        debug!(force, "saved notebook");
        Ok(())
    }

    fn write_prefs(&self) -> Result<()> {
        let root_path = self.path(self.root);
        let dir = prefs::pref_dir(&root_path);
        if !dir.exists() {
            fs::create_dir(&dir)
                .map_err(|e| BinderyError::io("cannot save notebook preferences", e))?;
        }
        self.prefs.write(&prefs::pref_file(&root_path))
    }

    //===============================================
    // arena plumbing

    fn insert(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        self.nodes.get(&id).expect("NodeId does not belong to this notebook")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(&id).expect("NodeId does not belong to this notebook")
    }
}

impl std::fmt::Debug for Notebook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notebook")
            .field("root", &self.root)
            .field("nodes", &self.nodes.len())
            .field("dirty", &self.dirty.len())
            .finish()
    }
}
