#![no_main]
use arbitrary::Arbitrary;
use jsonleaf::{Builder, ByteSource, Document, Literal};
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value};

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let node_type = u.choose_index(21)?;
        let value = match node_type {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => Value::from(u.arbitrary::<i64>()?),
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(String, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(m.into_iter().map(|(k, v)| (k, v.0))))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    raw: Vec<u8>,
    path: String,
    tree: ArbitraryValue,
}

/// Arbitrary bytes: raw access is lossless, structural access never panics.
fn raw_document(raw: &[u8], path: &str) {
    let doc = Document::new(Literal::from(raw));
    assert_eq!(doc.byte_array().unwrap(), raw);
    assert_eq!(
        doc.is_missing().unwrap(),
        raw.is_empty() || raw == b"null"
    );

    let _ = doc.opt_leaf(path);
    let _ = doc.opt_leaf_as_int(path);
    let _ = doc.opt_leaf_as_double(path);
    let _ = doc.opt_leaf_as_bool(path);
    if let Ok(nested) = doc.at(path) {
        let _ = nested.textual();
    }
    assert_eq!(doc.byte_array().unwrap(), raw);
}

/// Well-formed trees: navigation agrees with direct pointer lookup and the
/// tree survives both serializations.
fn tree_document(tree: &Value, path: &str) {
    let doc = Document::new(Literal::from(tree));
    let nested = doc.at(path).unwrap();
    match tree.pointer(path) {
        Some(node) => assert_eq!(nested.object_node().unwrap(), node),
        None => assert!(nested.is_missing().unwrap()),
    }
    let pretty = doc.pretty().unwrap();
    assert_eq!(&serde_json::from_str::<Value>(&pretty).unwrap(), tree);

    if tree.is_object() {
        let builder = Builder::from_source(&doc).unwrap();
        assert_eq!(&*builder.bytes().unwrap(), &*doc.bytes().unwrap());
    }
}

fuzz_target!(|input: Input| {
    raw_document(&input.raw, &input.path);
    tree_document(&input.tree.0, &input.path);
});
