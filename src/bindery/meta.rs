//! Metadata sidecar codec.
//!
//! Every node directory holds one `node.xml` describing the node's
//! attributes:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <node>
//! <version>2</version>
//! <attr key="title">My Page</attr>
//! </node>
//! ```
//!
//! The format is deliberately flat: exactly one level of children under
//! the root element. Reading is done with a streaming event parser and
//! anything deeper, unbalanced, or otherwise malformed surfaces as a
//! single corrupt-metadata error rather than partial state. Writes go
//! through a temp file and an atomic rename so a crash mid-write can
//! never clobber a previously valid sidecar.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use uuid::Uuid;

use crate::attrs::{timestamp_now, AttrSchema, AttrValue};
use crate::error::{BinderyError, Result};

/// Fixed name of the per-node metadata sidecar file.
pub const NODE_META_FILE: &str = "node.xml";

/// Root element of the sidecar document.
const ROOT_TAG: &str = "node";

/// Returns the sidecar path for a node directory.
pub fn meta_file(node_dir: &Path) -> PathBuf {
    node_dir.join(NODE_META_FILE)
}

/// Decoded sidecar contents: format version plus the attribute map.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaData {
    pub version: u32,
    pub attrs: BTreeMap<String, AttrValue>,
}

/// Element currently being read, when positioned inside the root.
struct Pending {
    tag: String,
    key: Option<String>,
    data: String,
}

/// Reads and decodes a sidecar file.
///
/// Known keys are converted through `schema`; unknown keys are kept as
/// opaque text. Missing `created_time`/`modified_time` are synthesized
/// from the current clock.
pub fn read(path: &Path, schema: &AttrSchema) -> Result<MetaData> {
    let text = fs::read_to_string(path).map_err(|e| {
        if e.kind() == io::ErrorKind::InvalidData {
            BinderyError::corrupt(path, "not valid UTF-8")
        } else {
            BinderyError::io(format!("cannot read node metadata '{}'", path.display()), e)
        }
    })?;

    let mut attrs: BTreeMap<String, AttrValue> = BTreeMap::new();
    let mut version: Option<u32> = None;

    let mut reader = Reader::from_str(&text);
    let mut in_root = false;
    let mut saw_root = false;
    let mut root_closed = false;
    let mut pending: Option<Pending> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if in_root {
                    if pending.is_some() {
                        return Err(BinderyError::corrupt(path, "nested element"));
                    }
                    pending = Some(Pending {
                        tag: String::from_utf8_lossy(e.name().as_ref()).into_owned(),
                        key: key_attribute(path, &e)?,
                        data: String::new(),
                    });
                } else if e.name().as_ref() == ROOT_TAG.as_bytes() {
                    in_root = true;
                    saw_root = true;
                }
            }
            Ok(Event::Empty(e)) => {
                if in_root {
                    if pending.is_some() {
                        return Err(BinderyError::corrupt(path, "nested element"));
                    }
                    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let key = key_attribute(path, &e)?;
                    finish_element(path, schema, &mut attrs, &mut version, &tag, key, String::new())?;
                } else if e.name().as_ref() == ROOT_TAG.as_bytes() {
                    saw_root = true;
                    root_closed = true;
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(p) = pending.as_mut() {
                    let chunk = t
                        .unescape()
                        .map_err(|e| BinderyError::corrupt(path, e.to_string()))?;
                    p.data.push_str(&chunk);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(p) = pending.as_mut() {
                    p.data.push_str(&String::from_utf8_lossy(&t.into_inner()));
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
                if let Some(p) = pending.take() {
                    finish_element(path, schema, &mut attrs, &mut version, &p.tag, p.key, p.data)?;
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

    // nodes written before timestamps existed get fresh ones
    attrs
        .entry("created_time".to_string())
        .or_insert_with(|| AttrValue::Int(timestamp_now()));
    attrs
        .entry("modified_time".to_string())
        .or_insert_with(|| AttrValue::Int(timestamp_now()));

    Ok(MetaData {
        version: version.unwrap_or(crate::FORMAT_VERSION),
        attrs,
    })
}

fn key_attribute(path: &Path, e: &BytesStart<'_>) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| BinderyError::corrupt(path, e.to_string()))?;
        if attr.key.as_ref() == b"key" {
            let value = attr
                .unescape_value()
                .map_err(|e| BinderyError::corrupt(path, e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn finish_element(
    path: &Path,
    schema: &AttrSchema,
    attrs: &mut BTreeMap<String, AttrValue>,
    version: &mut Option<u32>,
    tag: &str,
    key: Option<String>,
    data: String,
) -> Result<()> {
    match tag {
        "version" => {
            let v = data
                .trim()
                .parse::<u32>()
                .map_err(|_| BinderyError::corrupt(path, format!("bad version '{}'", data)))?;
            *version = Some(v);
        }
        "attr" => {
            // an attr element without a key carries nothing we can store
            if let Some(key) = key {
                let value = match schema.get(&key) {
                    Some(def) => def.read(&data).ok_or_else(|| {
                        BinderyError::corrupt(path, format!("bad value for attribute '{}'", key))
                    })?,
                    None => AttrValue::Text(data),
                };
                attrs.insert(key, value);
            }
        }
        _ => {}
    }
    Ok(())
}

/// Serializes and atomically writes a sidecar file.
///
/// Attributes are emitted in sorted key order so an unchanged node always
/// produces byte-identical output. Unknown keys holding text are written
/// verbatim; unknown keys holding non-text values are dropped.
pub fn write(
    path: &Path,
    version: u32,
    attrs: &BTreeMap<String, AttrValue>,
    schema: &AttrSchema,
) -> Result<()> {
    let bytes = encode(version, attrs, schema).map_err(|e| {
        BinderyError::io(
            format!("cannot encode node metadata '{}'", path.display()),
            io::Error::new(io::ErrorKind::Other, e),
        )
    })?;
    write_atomic(path, &bytes).map_err(|e| {
        BinderyError::io(format!("cannot write node metadata '{}'", path.display()), e)
    })
}

fn encode(
    version: u32,
    attrs: &BTreeMap<String, AttrValue>,
    schema: &AttrSchema,
) -> std::result::Result<Vec<u8>, quick_xml::Error> {
    let mut w = Writer::new(Vec::new());
    let nl = |w: &mut Writer<Vec<u8>>| w.write_event(Event::Text(BytesText::from_escaped("\n")));

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    nl(&mut w)?;
    w.write_event(Event::Start(BytesStart::new(ROOT_TAG)))?;
    nl(&mut w)?;

    w.write_event(Event::Start(BytesStart::new("version")))?;
    w.write_event(Event::Text(BytesText::new(&version.to_string())))?;
    w.write_event(Event::End(BytesEnd::new("version")))?;
    nl(&mut w)?;

    for (key, value) in attrs {
        let text = match schema.get(key) {
            Some(def) => def.write(value),
            None => match value {
                AttrValue::Text(s) => s.clone(),
                _ => continue,
            },
        };
        let mut start = BytesStart::new("attr");
        start.push_attribute(("key", key.as_str()));
        w.write_event(Event::Start(start))?;
        w.write_event(Event::Text(BytesText::new(&text)))?;
        w.write_event(Event::End(BytesEnd::new("attr")))?;
        nl(&mut w)?;
    }

    w.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;
    nl(&mut w)?;
    Ok(w.into_inner())
}

/// Writes `contents` to a temp file in the target's directory, then
/// renames it over the target.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let tmp = dir.join(format!(".{}-{}.tmp", name, Uuid::new_v4()));

    fs::write(&tmp, contents)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_attrs() -> BTreeMap<String, AttrValue> {
        let mut attrs = BTreeMap::new();
        attrs.insert("title".into(), AttrValue::Text("My Page".into()));
        attrs.insert("order".into(), AttrValue::Int(3));
        attrs.insert("expanded".into(), AttrValue::Bool(true));
        attrs.insert("created_time".into(), AttrValue::Int(1_200_000_000));
        attrs.insert("modified_time".into(), AttrValue::Int(1_200_000_500));
        attrs
    }

    #[test]
    fn round_trips_every_registered_type() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NODE_META_FILE);
        let schema = AttrSchema::default();

        write(&path, crate::FORMAT_VERSION, &sample_attrs(), &schema).unwrap();
        let meta = read(&path, &schema).unwrap();

        assert_eq!(meta.version, crate::FORMAT_VERSION);
        assert_eq!(meta.attrs, sample_attrs());
    }

    #[test]
    fn unchanged_attrs_write_identical_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NODE_META_FILE);
        let schema = AttrSchema::default();
        let attrs = sample_attrs();

        write(&path, 2, &attrs, &schema).unwrap();
        let first = fs::read(&path).unwrap();
        write(&path, 2, &attrs, &schema).unwrap();
        let second = fs::read(&path).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn unknown_text_attrs_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NODE_META_FILE);
        let schema = AttrSchema::default();

        let mut attrs = sample_attrs();
        attrs.insert("x_custom".into(), AttrValue::Text("plugin data".into()));
        write(&path, 2, &attrs, &schema).unwrap();

        let meta = read(&path, &schema).unwrap();
        assert_eq!(
            meta.attrs.get("x_custom"),
            Some(&AttrValue::Text("plugin data".into()))
        );
    }

    #[test]
    fn unknown_non_text_attrs_are_dropped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NODE_META_FILE);
        let schema = AttrSchema::default();

        let mut attrs = sample_attrs();
        attrs.insert("x_count".into(), AttrValue::Int(9));
        write(&path, 2, &attrs, &schema).unwrap();

        let meta = read(&path, &schema).unwrap();
        assert!(!meta.attrs.contains_key("x_count"));
    }

    #[test]
    fn special_characters_are_escaped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NODE_META_FILE);
        let schema = AttrSchema::default();

        let mut attrs = sample_attrs();
        attrs.insert("title".into(), AttrValue::Text("a < b & \"c\"".into()));
        write(&path, 2, &attrs, &schema).unwrap();

        let meta = read(&path, &schema).unwrap();
        assert_eq!(
            meta.attrs.get("title"),
            Some(&AttrValue::Text("a < b & \"c\"".into()))
        );
    }

    #[test]
    fn missing_timestamps_are_synthesized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NODE_META_FILE);
        fs::write(
            &path,
            "<?xml version=\"1.0\"?>\n<node>\n<version>2</version>\n\
             <attr key=\"title\">old</attr>\n</node>\n",
        )
        .unwrap();

        let meta = read(&path, &AttrSchema::default()).unwrap();
        assert!(meta.attrs.get("created_time").unwrap().as_int().is_some());
        assert!(meta.attrs.get("modified_time").unwrap().as_int().is_some());
    }

    #[test]
    fn nested_elements_are_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NODE_META_FILE);
        fs::write(
            &path,
            "<node><attr key=\"a\"><deep>x</deep></attr></node>",
        )
        .unwrap();

        let err = read(&path, &AttrSchema::default()).unwrap_err();
        assert!(matches!(err, BinderyError::Corrupt(..)), "got {:?}", err);
    }

    #[test]
    fn malformed_documents_are_corrupt() {
        let dir = tempdir().unwrap();
        let schema = AttrSchema::default();

        for (name, body) in [
            ("garbage", "this is not xml at all"),
            ("truncated", "<node><attr key=\"a\">abc"),
            ("mismatched", "<node><attr key=\"a\">x</node></attr>"),
            ("bad_version", "<node><version>two</version></node>"),
            ("bad_bool", "<node><attr key=\"expanded\">maybe</attr></node>"),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, body).unwrap();
            let err = read(&path, &schema).unwrap_err();
            assert!(matches!(err, BinderyError::Corrupt(..)), "{}: {:?}", name, err);
        }
    }

    #[test]
    fn empty_attr_value_reads_as_empty_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(NODE_META_FILE);
        fs::write(&path, "<node><attr key=\"x_note\"/></node>").unwrap();

        let meta = read(&path, &AttrSchema::default()).unwrap();
        assert_eq!(meta.attrs.get("x_note"), Some(&AttrValue::Text(String::new())));
    }

    #[test]
    fn write_atomic_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.xml");
        write_atomic(&path, b"payload").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["out.xml".to_string()]);
        assert_eq!(fs::read(&path).unwrap(), b"payload");
    }
}
