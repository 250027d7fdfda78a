//! # Bindery Architecture
//!
//! Bindery is a **UI-agnostic notebook store**. It is the data layer of a
//! note-taking application: a tree of pages and folders where every node
//! is backed by one directory on disk, with the node's attributes kept in
//! a small XML sidecar file inside that directory.
//!
//! ```text
//! my-notebook/
//! ├── node.xml                  # root metadata sidecar
//! ├── __notebook__/prefs.xml    # store-wide preferences
//! ├── __trash__/                # soft-deleted nodes
//! │   └── node.xml
//! ├── ideas/                    # a folder node
//! │   ├── node.xml
//! │   └── first draft/          # a page node
//! │       ├── node.xml
//! │       └── page.html         # page body (managed, not interpreted)
//! └── ...
//! ```
//!
//! The in-memory tree mirrors the on-disk layout **lazily**: children are
//! read only when first asked for, and each lifecycle operation (create,
//! rename, move, delete, trash) mutates the filesystem first, then the
//! tree, then persists, then notifies observers — in that order, so a
//! listener never hears about a change that failed to land on disk.
//!
//! ## Module Overview
//!
//! - [`notebook`]: the store itself — tree ownership, lifecycle
//!   operations, dirty tracking, lazy child loading
//! - [`node`]: node model, ids, and the folder/page/trash variants
//! - [`meta`]: XML sidecar codec with atomic writes
//! - [`attrs`]: typed attributes and the per-notebook schema registry
//! - [`factory`]: content-type dispatch for reconstructing nodes
//! - [`filename`]: title-to-directory-name policy
//! - [`listen`]: change notification with suppress/resume
//! - [`prefs`]: notebook preferences and the format-version gate
//! - [`error`]: error types
//!
//! Page *content* is out of scope on purpose: bindery guarantees that a
//! page's content file exists and where it lives, but never interprets
//! it. Editors read and write [`Notebook::data_file`] directly.

pub mod attrs;
pub mod error;
pub mod factory;
pub mod filename;
pub mod listen;
pub mod meta;
pub mod node;
pub mod notebook;
pub mod prefs;

pub use attrs::{AttrDef, AttrKind, AttrSchema, AttrValue};
pub use error::{BinderyError, Result};
pub use listen::{ListenerId, Listeners};
pub use node::{NodeId, NodeKind};
pub use notebook::Notebook;
pub use prefs::Preferences;

/// On-disk format version this build reads and writes.
pub const FORMAT_VERSION: u32 = 2;
