//! Typed node attributes and the per-notebook attribute schema.
//!
//! Every node carries a flat map of named attributes. The schema declares
//! the known keys, their value types, and the string converters used by
//! the metadata codec. Keys the schema does not know about survive as
//! opaque text so third-party attributes round-trip unharmed.

use chrono::Utc;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Manual ordering (the default): siblings keep their stored `order`.
pub const SORT_NONE: i64 = 0;
pub const SORT_MANUAL: i64 = 1;
pub const SORT_TITLE: i64 = 2;
pub const SORT_CREATED_TIME: i64 = 3;
pub const SORT_MODIFIED_TIME: i64 = 4;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Text(String),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Text,
    Int,
    Bool,
    /// Integer epoch seconds. Stored as [`AttrValue::Int`].
    Timestamp,
}

/// Converts serialized text into a typed value. `None` means the text is
/// not parseable as the declared type.
pub type ReadFn = fn(&str) -> Option<AttrValue>;

/// Converts a typed value back into serialized text.
pub type WriteFn = fn(&AttrValue) -> String;

fn read_text(s: &str) -> Option<AttrValue> {
    Some(AttrValue::Text(s.to_string()))
}

fn read_int(s: &str) -> Option<AttrValue> {
    s.trim().parse::<i64>().ok().map(AttrValue::Int)
}

// Booleans are persisted as integers; any non-zero value is true.
fn read_bool(s: &str) -> Option<AttrValue> {
    s.trim().parse::<i64>().ok().map(|i| AttrValue::Bool(i != 0))
}

fn write_value(value: &AttrValue) -> String {
    match value {
        AttrValue::Text(s) => s.clone(),
        AttrValue::Int(i) => i.to_string(),
        AttrValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
    }
}

/// Declaration of one known attribute: display name, key, type, and the
/// reader/writer pair used by the codec.
#[derive(Clone)]
pub struct AttrDef {
    pub name: String,
    pub key: String,
    pub kind: AttrKind,
    read: ReadFn,
    write: WriteFn,
}

impl AttrDef {
    /// Creates a definition with the default converters for `kind`.
    pub fn new(name: &str, key: &str, kind: AttrKind) -> Self {
        let read = match kind {
            AttrKind::Text => read_text,
            AttrKind::Int | AttrKind::Timestamp => read_int,
            AttrKind::Bool => read_bool,
        };
        Self {
            name: name.to_string(),
            key: key.to_string(),
            kind,
            read,
            write: write_value,
        }
    }

    pub fn with_read(mut self, read: ReadFn) -> Self {
        self.read = read;
        self
    }

    pub fn with_write(mut self, write: WriteFn) -> Self {
        self.write = write;
        self
    }

    pub fn read(&self, text: &str) -> Option<AttrValue> {
        (self.read)(text)
    }

    pub fn write(&self, value: &AttrValue) -> String {
        (self.write)(value)
    }
}

impl std::fmt::Debug for AttrDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttrDef")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}

static DEFAULT_ATTRS: Lazy<Vec<AttrDef>> = Lazy::new(|| {
    vec![
        AttrDef::new("Title", "title", AttrKind::Text),
        AttrDef::new("Content type", "content_type", AttrKind::Text),
        AttrDef::new("Order", "order", AttrKind::Int),
        AttrDef::new("Created", "created_time", AttrKind::Timestamp),
        AttrDef::new("Modified", "modified_time", AttrKind::Timestamp),
        AttrDef::new("Expanded", "expanded", AttrKind::Bool),
        AttrDef::new("Expanded2", "expanded2", AttrKind::Bool),
        AttrDef::new("Folder Sort", "info_sort", AttrKind::Int),
        AttrDef::new("Folder Sort Direction", "info_sort_dir", AttrKind::Int),
    ]
});

/// Registry of attribute definitions, keyed by attribute key.
///
/// Each notebook owns its own schema so callers can register additional
/// attributes without affecting other open notebooks.
#[derive(Debug, Clone)]
pub struct AttrSchema {
    defs: HashMap<String, AttrDef>,
}

impl AttrSchema {
    /// An empty schema with no known attributes.
    pub fn empty() -> Self {
        Self { defs: HashMap::new() }
    }

    pub fn register(&mut self, def: AttrDef) {
        self.defs.insert(def.key.clone(), def);
    }

    pub fn get(&self, key: &str) -> Option<&AttrDef> {
        self.defs.get(key)
    }
}

impl Default for AttrSchema {
    /// Schema seeded with the store's standard attribute set.
    fn default() -> Self {
        let mut schema = Self::empty();
        for def in DEFAULT_ATTRS.iter() {
            schema.register(def.clone());
        }
        schema
    }
}

/// Current time as integer epoch seconds, the store's timestamp format.
pub fn timestamp_now() -> i64 {
    Utc::now().timestamp()
}
