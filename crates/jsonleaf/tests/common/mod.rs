#![allow(dead_code)]

use std::path::PathBuf;

use jsonleaf::{Document, FileSource, LineEnding, PrettyOptions};

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn deep() -> Document<FileSource> {
    Document::new(FileSource::new(fixture("deep.json")))
}

pub const LF: PrettyOptions = PrettyOptions {
    indent: 2,
    line_ending: LineEnding::Lf,
};
