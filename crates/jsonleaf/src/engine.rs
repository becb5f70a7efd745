//! Stateless bridge to `serde_json`.
//!
//! Everything that knows JSON grammar lives behind these functions. The rest
//! of the crate only orchestrates them.

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::{Error, PrettyOptions, Result, Tree};

/// Parses `bytes` into a tree. Zero bytes parse to `null`, the missing tree.
pub(crate) fn parse_tree(bytes: &[u8]) -> Result<Tree> {
    if bytes.is_empty() {
        return Ok(Tree::Null);
    }
    serde_json::from_slice(bytes).map_err(Error::Malformed)
}

pub(crate) fn serialize_compact(tree: &Tree) -> String {
    tree.to_string()
}

pub(crate) fn serialize_pretty(tree: &Tree, options: &PrettyOptions) -> Result<String> {
    let mut out = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::new(options));
    tree.serialize(&mut ser).map_err(io::Error::from)?;
    String::from_utf8(out).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

pub(crate) fn resolve_pointer<'t>(tree: &'t Tree, pointer: &str) -> Option<&'t Tree> {
    tree.pointer(pointer)
}

pub(crate) fn resolve_field<'t>(tree: &'t Tree, name: &str) -> Option<&'t Tree> {
    if name.is_empty() {
        return None;
    }
    tree.as_object()?.get(name)
}

pub(crate) fn kind(tree: &Tree) -> &'static str {
    match tree {
        Tree::Null => "null",
        Tree::Bool(_) => "boolean",
        Tree::Number(_) => "number",
        Tree::String(_) => "string",
        Tree::Array(_) => "array",
        Tree::Object(_) => "object",
    }
}

/// Multi-line objects, inline arrays, `" : "` between keys and values.
///
/// `depth` counts open objects only; arrays never break lines.
struct PrettyFormatter<'a> {
    depth: usize,
    has_value: bool,
    indent: usize,
    newline: &'a [u8],
}

impl PrettyFormatter<'_> {
    fn new(options: &PrettyOptions) -> Self {
        Self {
            depth: 0,
            has_value: false,
            indent: options.indent,
            newline: options.line_ending.as_bytes(),
        }
    }

    fn write_line<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.newline)?;
        for _ in 0..self.depth * self.indent {
            writer.write_all(b" ")?;
        }
        Ok(())
    }
}

impl Formatter for PrettyFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.has_value = false;
        writer.write_all(b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" ]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        writer.write_all(if first { b" " } else { b", " })
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.depth -= 1;
        if self.has_value {
            self.write_line(writer)?;
        } else {
            writer.write_all(b" ")?;
        }
        writer.write_all(b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if !first {
            writer.write_all(b",")?;
        }
        self.write_line(writer)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}
