// src/dacpac/metadata.rs

//! Metadata document normalization.
//!
//! The build machine records absolute paths in certain `Metadata` elements
//! of `model.xml` (`<Metadata Name="FileName" Value="C:\ci\out\App.dacpac"/>`),
//! so byte-identical logical content hashes differently per build host. This
//! module rewrites those values to the bare filename, which makes the
//! fingerprint location-independent.
//!
//! Normalization is a pure transform over document bytes. Documents without
//! the marker attributes pass through untouched; everything else is rewritten
//! through an event pipeline that preserves all unrelated content.

use std::borrow::Cow;

use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Error, Result};

/// Metadata key whose value carries the package build path
pub const FILE_NAME_KEY: &str = "FileName";
/// Metadata key whose value carries the symbols file build path
pub const SYMBOLS_NAME_KEY: &str = "AssemblySymbolsName";

const METADATA_ELEMENT: &[u8] = b"Metadata";
const FILE_NAME_MARKER: &[u8] = br#"Name="FileName""#;
const SYMBOLS_NAME_MARKER: &[u8] = br#"Name="AssemblySymbolsName""#;

/// Rewrite path-bearing metadata values to the bare filename.
///
/// Idempotent: applying this to its own output returns the same bytes. A
/// document containing neither marker is returned unchanged without being
/// parsed.
pub fn normalize(document: &[u8]) -> Result<Cow<'_, [u8]>> {
    if !contains(document, FILE_NAME_MARKER) && !contains(document, SYMBOLS_NAME_MARKER) {
        return Ok(Cow::Borrowed(document));
    }

    let text = std::str::from_utf8(strip_bom(document))
        .map_err(|e| Error::Metadata(format!("document is not valid UTF-8: {}", e)))?;

    let mut reader = Reader::from_str(text);
    let mut writer = Writer::new(Vec::new());

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref() == METADATA_ELEMENT => {
                match rewrite_element(&e)? {
                    Some(rebuilt) => writer.write_event(Event::Start(rebuilt)),
                    None => writer.write_event(Event::Start(e)),
                }
                .map_err(|err| Error::Metadata(err.to_string()))?;
            }
            Event::Empty(e) if e.name().as_ref() == METADATA_ELEMENT => {
                match rewrite_element(&e)? {
                    Some(rebuilt) => writer.write_event(Event::Empty(rebuilt)),
                    None => writer.write_event(Event::Empty(e)),
                }
                .map_err(|err| Error::Metadata(err.to_string()))?;
            }
            event => {
                writer
                    .write_event(event)
                    .map_err(|err| Error::Metadata(err.to_string()))?;
            }
        }
    }

    Ok(Cow::Owned(writer.into_inner()))
}

/// Rebuild a `Metadata` element with its value attribute trimmed to the
/// final path segment. Returns `None` when the element does not have the
/// recognized shape (exactly two attributes, the first named `Name` with a
/// known key) or when the value is already bare.
fn rewrite_element(element: &BytesStart) -> Result<Option<BytesStart<'static>>> {
    let attrs: Vec<Attribute> = element
        .attributes()
        .collect::<std::result::Result<_, _>>()
        .map_err(|err| Error::Metadata(err.to_string()))?;

    if attrs.len() != 2 || attrs[0].key.as_ref() != b"Name" {
        return Ok(None);
    }

    let name_value = attrs[0]
        .unescape_value()
        .map_err(|err| Error::Metadata(err.to_string()))?;
    match name_value.as_ref() {
        FILE_NAME_KEY | SYMBOLS_NAME_KEY => {}
        _ => return Ok(None),
    }

    let value = attrs[1]
        .unescape_value()
        .map_err(|err| Error::Metadata(err.to_string()))?;
    let trimmed = final_path_segment(value.as_ref());
    if trimmed == value.as_ref() {
        return Ok(None);
    }

    let value_key = std::str::from_utf8(attrs[1].key.as_ref())
        .map_err(|e| Error::Metadata(format!("attribute name is not valid UTF-8: {}", e)))?;

    let mut rebuilt = BytesStart::new("Metadata");
    rebuilt.push_attribute(("Name", name_value.as_ref()));
    rebuilt.push_attribute((value_key, trimmed));
    Ok(Some(rebuilt.into_owned()))
}

/// Segment after the last `/` or `\`; build hosts emit either separator
fn final_path_segment(value: &str) -> &str {
    value.rsplit(['/', '\\']).next().unwrap_or(value)
}

fn strip_bom(document: &[u8]) -> &[u8] {
    document
        .strip_prefix(&[0xEF, 0xBB, 0xBF][..])
        .unwrap_or(document)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
