//! Change notification.
//!
//! The notebook broadcasts "nodes changed" events to registered
//! listeners after every tree mutation. The `recurse` flag tells a
//! listener whether descendants of the named nodes should be considered
//! changed as well (a UI would refresh the whole subtree). Suppression
//! drops notifications outright; nothing is queued for replay, so a
//! caller batching mutations emits its own summary notification after
//! resuming.

use std::collections::HashMap;

use crate::node::NodeId;

/// Handle for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Box<dyn FnMut(&[NodeId], bool)>;

/// Listener registry with per-listener and global suppression.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Callback)>,
    /// Per-listener suppression counts; absent means not suppressed.
    muted: HashMap<ListenerId, u32>,
    muted_all: u32,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked with the changed node ids and the
    /// recurse flag.
    pub fn add(&mut self, callback: impl FnMut(&[NodeId], bool) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    pub fn remove(&mut self, id: ListenerId) {
        self.entries.retain(|(lid, _)| *lid != id);
        self.muted.remove(&id);
    }

    /// Broadcasts a change to every non-suppressed listener.
    pub fn notify(&mut self, nodes: &[NodeId], recurse: bool) {
        if self.muted_all > 0 {
            return;
        }
        for (id, callback) in self.entries.iter_mut() {
            if self.muted.contains_key(id) {
                continue;
            }
            callback(nodes, recurse);
        }
    }

    /// Suppresses one listener, or all listeners when `listener` is
    /// `None`. Calls nest; each `suppress` needs a matching `resume`.
    pub fn suppress(&mut self, listener: Option<ListenerId>) {
        match listener {
            Some(id) => *self.muted.entry(id).or_insert(0) += 1,
            None => self.muted_all += 1,
        }
    }

    pub fn resume(&mut self, listener: Option<ListenerId>) {
        match listener {
            Some(id) => {
                if let Some(count) = self.muted.get_mut(&id) {
                    *count -= 1;
                    if *count == 0 {
                        self.muted.remove(&id);
                    }
                }
            }
            None => self.muted_all = self.muted_all.saturating_sub(1),
        }
    }
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("listeners", &self.entries.len())
            .field("muted", &self.muted.len())
            .field("muted_all", &self.muted_all)
            .finish()
    }
}
