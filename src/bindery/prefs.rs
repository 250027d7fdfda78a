//! Notebook-wide preferences.
//!
//! Unlike node attributes, preferences are stored once per notebook, in
//! `__notebook__/prefs.xml` under the root directory. The file carries
//! the on-disk format version; opening a notebook written by a newer
//! version of the format fails up front instead of quietly misreading it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{BinderyError, Result};
use crate::meta::write_atomic;

/// Hidden subdirectory under the root holding store-internal files.
pub const META_DIR: &str = "__notebook__";

/// Preferences file name inside [`META_DIR`].
pub const PREF_FILE: &str = "prefs.xml";

/// Font used when a notebook does not specify one (`"<family> <size>"`).
pub const DEFAULT_FONT: &str = "Sans 10";

const ROOT_TAG: &str = "notebook";

/// Returns the internal metadata directory for a notebook root.
pub fn pref_dir(root: &Path) -> PathBuf {
    root.join(META_DIR)
}

/// Returns the preferences file path for a notebook root.
pub fn pref_file(root: &Path) -> PathBuf {
    pref_dir(root).join(PREF_FILE)
}

/// Store-wide preference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub version: u32,
    pub default_font: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: crate::FORMAT_VERSION,
            default_font: DEFAULT_FONT.to_string(),
        }
    }
}

impl Preferences {
    /// Reads preferences and rejects files newer than the supported
    /// format version. Nothing is mutated on failure; the caller only
    /// sees a value on success.
    pub fn read(path: &Path) -> Result<Preferences> {
        let prefs = parse(path)?;
        if prefs.version > crate::FORMAT_VERSION {
            return Err(BinderyError::UnsupportedVersion {
                found: prefs.version,
                supported: crate::FORMAT_VERSION,
            });
        }
        Ok(prefs)
    }

    /// Serializes and atomically writes the preferences file.
    pub fn write(&self, path: &Path) -> Result<()> {
        let bytes = encode(self).map_err(|e| {
            BinderyError::io(
                "cannot encode notebook preferences",
                io::Error::new(io::ErrorKind::Other, e),
            )
        })?;
        write_atomic(path, &bytes)
            .map_err(|e| BinderyError::io("cannot save notebook preferences", e))
    }
}

/// Reads just the format version of a notebook without opening it.
///
/// Accepts either the notebook root directory or the preferences file
/// itself. Does not apply the version gate; this is how a caller finds
/// out that a notebook is too new in the first place.
pub fn notebook_version(path: &Path) -> Result<u32> {
    let file = if path.is_dir() { pref_file(path) } else { path.to_path_buf() };
    Ok(parse(&file)?.version)
}

fn parse(path: &Path) -> Result<Preferences> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::InvalidData {
            BinderyError::corrupt(path, "not valid UTF-8")
        } else {
            BinderyError::io(
                format!("cannot read notebook preferences '{}'", path.display()),
                e,
            )
        }
    })?;

    let mut prefs = Preferences::default();
    let mut reader = Reader::from_str(&text);
    let mut in_root = false;
    let mut saw_root = false;
    let mut root_closed = false;
    let mut pending: Option<(String, String)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if in_root {
                    if pending.is_some() {
                        return Err(BinderyError::corrupt(path, "nested element"));
                    }
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    pending = Some((tag, String::new()));
                } else if e.name().as_ref() == ROOT_TAG.as_bytes() {
                    in_root = true;
                    saw_root = true;
                }
            }
            Ok(Event::Text(t)) => {
                if let Some((_, data)) = pending.as_mut() {
                    let chunk = t
                        .unescape()
                        .map_err(|e| BinderyError::corrupt(path, e.to_string()))?;
                    data.push_str(&chunk);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == ROOT_TAG.as_bytes() {
                    in_root = false;
                    root_closed = true;
                    continue;
                }
                if !in_root {
                    continue;
                }
                if let Some((tag, data)) = pending.take() {
                    match tag.as_str() {
                        "version" => {
                            prefs.version = data.trim().parse::<u32>().map_err(|_| {
                                BinderyError::corrupt(path, format!("bad version '{}'", data))
                            })?;
                        }
                        "default_font" => prefs.default_font = data,
                        _ => {}
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(BinderyError::corrupt(path, e.to_string())),
        }
    }

    if !saw_root || !root_closed {
        return Err(BinderyError::corrupt(path, "missing or unterminated root element"));
    }

    Ok(prefs)
}

fn encode(prefs: &Preferences) -> std::result::Result<Vec<u8>, quick_xml::Error> {
    let mut w = Writer::new(Vec::new());
    let nl = |w: &mut Writer<Vec<u8>>| w.write_event(Event::Text(BytesText::from_escaped("\n")));

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    nl(&mut w)?;
    w.write_event(Event::Start(BytesStart::new(ROOT_TAG)))?;
    nl(&mut w)?;

    w.write_event(Event::Start(BytesStart::new("version")))?;
    w.write_event(Event::Text(BytesText::new(&prefs.version.to_string())))?;
    w.write_event(Event::End(BytesEnd::new("version")))?;
    nl(&mut w)?;

    w.write_event(Event::Start(BytesStart::new("default_font")))?;
    w.write_event(Event::Text(BytesText::new(&prefs.default_font)))?;
    w.write_event(Event::End(BytesEnd::new("default_font")))?;
    nl(&mut w)?;

    w.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;
    nl(&mut w)?;
    Ok(w.into_inner())
}
