//! Navigation and typed leaf extraction over a re-readable source.

use std::{
    borrow::Cow,
    fmt,
    sync::{Mutex, OnceLock, PoisonError},
};

use bstr::ByteSlice;
use tracing::debug;

use crate::{
    ByteSource, Literal, PrettyOptions, Result, Tree, engine,
    error::Error,
    leaf::Leaf,
    source::{NULL_BYTES, is_missing_bytes},
};

/// How a leaf path is resolved, chosen from its first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'p> {
    /// A path starting with `/`, walked segment by segment. Numeric segments
    /// index arrays; `~0` and `~1` escape `~` and `/`.
    Pointer(&'p str),
    /// Anything else: the name of a field at the top level, taken verbatim.
    /// The empty name never matches.
    Field(&'p str),
}

impl<'p> Lookup<'p> {
    /// Picks the resolution strategy for `path`.
    #[must_use]
    pub fn of(path: &'p str) -> Self {
        if path.starts_with('/') {
            Self::Pointer(path)
        } else {
            Self::Field(path)
        }
    }

    fn resolve(self, tree: &Tree) -> Option<&Tree> {
        match self {
            Self::Pointer(pointer) => engine::resolve_pointer(tree, pointer),
            Self::Field(name) => engine::resolve_field(tree, name),
        }
    }
}

/// A JSON document backed by a re-readable [`ByteSource`].
///
/// The source bytes are parsed the first time structure is needed and the
/// resulting tree is kept for the lifetime of the document. Operations that
/// only need the raw bytes ([`bytes`](Self::bytes), [`text`](Self::text),
/// [`is_missing`](Self::is_missing)) never parse, so they work on malformed
/// input too.
///
/// # Examples
///
/// ```rust
/// use jsonleaf::{Document, Literal};
///
/// let doc = Document::new(Literal::from(r#"{"xs":[{"n":"Jason"}],"b":5}"#));
/// assert_eq!(doc.leaf("/xs/0/n").unwrap(), "Jason");
/// assert_eq!(doc.leaf_as_int("b").unwrap(), 5);
/// assert!(doc.at("/not/here").unwrap().is_missing().unwrap());
/// ```
#[derive(Debug, Default)]
pub struct Document<S = Literal> {
    origin: S,
    tree: OnceLock<Tree>,
    parsing: Mutex<()>,
}

impl<S: ByteSource> Document<S> {
    /// Wraps `origin`. Nothing is read or parsed yet.
    pub fn new(origin: S) -> Self {
        Self {
            origin,
            tree: OnceLock::new(),
            parsing: Mutex::new(()),
        }
    }

    /// The source this document was built from.
    pub fn origin(&self) -> &S {
        &self.origin
    }

    /// Unwraps the source, dropping any parsed tree.
    pub fn into_origin(self) -> S {
        self.origin
    }

    /// The bytes of the origin, unchanged.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read.
    pub fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        self.origin.bytes()
    }

    /// An owned copy of the origin bytes.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read.
    pub fn byte_array(&self) -> Result<Vec<u8>> {
        Ok(self.bytes()?.into_owned())
    }

    /// The origin bytes as text, invalid UTF-8 replaced. Does not parse.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read.
    pub fn text(&self) -> Result<String> {
        Ok(self.bytes()?.to_str_lossy().into_owned())
    }

    /// The tree in compact form, without insignificant whitespace.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn textual(&self) -> Result<String> {
        Ok(engine::serialize_compact(self.tree()?))
    }

    /// The tree in multi-line form with the default [`PrettyOptions`].
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn pretty(&self) -> Result<String> {
        self.pretty_with(&PrettyOptions::default())
    }

    /// The tree in multi-line form laid out by `options`.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn pretty_with(&self, options: &PrettyOptions) -> Result<String> {
        engine::serialize_pretty(self.tree()?, options)
    }

    /// The document nested at the JSON Pointer `path`, e.g.
    /// `/path/to/nested/json`.
    ///
    /// A path that leads nowhere gives a document whose bytes are `null`, so
    /// [`is_missing`](Self::is_missing) holds on it.
    ///
    /// # Errors
    ///
    /// Fails if this document's origin cannot be read or is not well-formed
    /// JSON. A path that leads nowhere is not an error.
    pub fn at(&self, path: &str) -> Result<Document<Literal>> {
        let origin = match engine::resolve_pointer(self.tree()?, path) {
            Some(node) => Literal::from_tree(node),
            None => Literal::from(NULL_BYTES),
        };
        Ok(Document::new(origin))
    }

    /// Whether the origin bytes are empty or exactly `null`.
    ///
    /// Only the bytes are inspected; malformed input is simply not missing.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read.
    pub fn is_missing(&self) -> Result<bool> {
        Ok(is_missing_bytes(&self.bytes()?))
    }

    /// A text leaf, or `None` if there is no node at `path` or the node is
    /// not text. See [`Lookup`] for how `path` is resolved.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn opt_leaf(&self, path: &str) -> Result<Option<String>> {
        self.opt_leaf_as(path)
    }

    /// A text leaf.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchField`] if there is no node at `path` or it is not text,
    /// otherwise the errors of [`opt_leaf`](Self::opt_leaf).
    pub fn leaf(&self, path: &str) -> Result<String> {
        self.leaf_as(path)
    }

    /// An integer leaf. A number is truncated to its integral part, any
    /// other existing node reads as `0`.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn opt_leaf_as_int(&self, path: &str) -> Result<Option<i32>> {
        self.opt_leaf_as(path)
    }

    /// An integer leaf, coerced as in [`opt_leaf_as_int`](Self::opt_leaf_as_int).
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchField`] if there is no node at `path`.
    pub fn leaf_as_int(&self, path: &str) -> Result<i32> {
        self.leaf_as(path)
    }

    /// A floating point leaf. Any existing non-number reads as `0.0`.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn opt_leaf_as_double(&self, path: &str) -> Result<Option<f64>> {
        self.opt_leaf_as(path)
    }

    /// A floating point leaf, coerced as in
    /// [`opt_leaf_as_double`](Self::opt_leaf_as_double).
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchField`] if there is no node at `path`.
    pub fn leaf_as_double(&self, path: &str) -> Result<f64> {
        self.leaf_as(path)
    }

    /// A boolean leaf. Any existing non-boolean reads as `false`.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn opt_leaf_as_bool(&self, path: &str) -> Result<Option<bool>> {
        self.opt_leaf_as(path)
    }

    /// A boolean leaf, coerced as in [`opt_leaf_as_bool`](Self::opt_leaf_as_bool).
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchField`] if there is no node at `path`.
    pub fn leaf_as_bool(&self, path: &str) -> Result<bool> {
        self.leaf_as(path)
    }

    /// Reads any [`Leaf`] type at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn opt_leaf_as<T: Leaf>(&self, path: &str) -> Result<Option<T>> {
        let tree = self.tree()?;
        Ok(Lookup::of(path).resolve(tree).and_then(T::from_node))
    }

    /// Reads any [`Leaf`] type at `path`, failing when it is absent.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuchField`] when [`opt_leaf_as`](Self::opt_leaf_as) gives
    /// `None`, otherwise its errors.
    pub fn leaf_as<T: Leaf>(&self, path: &str) -> Result<T> {
        self.opt_leaf_as(path)?
            .ok_or_else(|| Error::no_such_field(path))
    }

    /// The parsed tree, for manipulation beyond what this type offers.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn object_node(&self) -> Result<&Tree> {
        self.tree()
    }

    /// Takes the parsed tree out of the document. Changes made to it are not
    /// reflected in the origin bytes.
    ///
    /// # Errors
    ///
    /// Fails if the origin cannot be read or is not well-formed JSON.
    pub fn into_object_node(self) -> Result<Tree> {
        match self.tree.into_inner() {
            Some(tree) => Ok(tree),
            None => engine::parse_tree(&self.origin.bytes()?),
        }
    }

    fn tree(&self) -> Result<&Tree> {
        if let Some(tree) = self.tree.get() {
            return Ok(tree);
        }
        let _parsing = self.parsing.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(tree) = self.tree.get() {
            return Ok(tree);
        }
        let bytes = self.origin.bytes()?;
        let tree = engine::parse_tree(&bytes).inspect_err(|error| {
            debug!(len = bytes.len(), %error, "document is not well-formed JSON");
        })?;
        debug!(len = bytes.len(), "parsed document tree");
        Ok(self.tree.get_or_init(|| tree))
    }
}

impl<S: Clone> Clone for Document<S> {
    fn clone(&self) -> Self {
        Self {
            origin: self.origin.clone(),
            tree: self.tree.clone(),
            parsing: Mutex::new(()),
        }
    }
}

/// Renders the origin bytes as text, invalid UTF-8 replaced. A source that
/// cannot be read is a formatting error.
impl<S: ByteSource> fmt::Display for Document<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.bytes().map_err(|_| fmt::Error)?;
        fmt::Display::fmt(bytes.as_bstr(), f)
    }
}

impl<S: ByteSource> ByteSource for Document<S> {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        self.origin.bytes()
    }
}

impl<S: ByteSource> From<S> for Document<S> {
    fn from(origin: S) -> Self {
        Self::new(origin)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc, Barrier,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    use serde_json::json;

    use super::*;
    use crate::{LineEnding, Missing};

    fn doc(text: &str) -> Document {
        Document::new(Literal::from(text))
    }

    #[test]
    fn lookup_dispatch() {
        assert_eq!(Lookup::of("/a/0"), Lookup::Pointer("/a/0"));
        assert_eq!(Lookup::of("a/0"), Lookup::Field("a/0"));
        assert_eq!(Lookup::of(""), Lookup::Field(""));
    }

    #[test]
    fn bytes_survive_structural_access() {
        let text = r#"{ "field1" : "value1", "n": [1, 2] }"#;
        let json = doc(text);
        assert_eq!(json.leaf("field1").unwrap(), "value1");
        assert_eq!(json.textual().unwrap(), r#"{"field1":"value1","n":[1,2]}"#);
        assert_eq!(&*json.bytes().unwrap(), text.as_bytes());
        assert_eq!(json.byte_array().unwrap(), text.as_bytes());
    }

    #[test]
    fn malformed_passes_raw_operations() {
        let json = doc("malformed");
        assert_eq!(json.text().unwrap(), "malformed");
        assert!(!json.is_missing().unwrap());
        assert!(matches!(json.textual(), Err(Error::Malformed(_))));
        assert!(matches!(json.leaf("a"), Err(Error::Malformed(_))));
        assert!(matches!(json.at("/a"), Err(Error::Malformed(_))));
        assert_eq!(&*json.bytes().unwrap(), b"malformed");
    }

    #[test]
    fn reads_twice() {
        let json = doc(r#"{"field1":"value1","field2":"value2"}"#);
        assert_eq!(json.leaf("field1").unwrap(), "value1");
        assert_eq!(json.leaf("field1").unwrap(), "value1");
    }

    #[test]
    fn at_returns_subtree() {
        let json = doc(r#"{"xs":[{"name":"Jason"},{"name":"Thetis"}]}"#);
        let first = json.at("/xs/0").unwrap();
        assert_eq!(first.textual().unwrap(), r#"{"name":"Jason"}"#);
        assert_eq!(first.leaf("name").unwrap(), "Jason");
        let array = json.at("/xs").unwrap();
        assert_eq!(array.at("/1").unwrap().leaf("name").unwrap(), "Thetis");
    }

    #[test]
    fn at_never_fails_on_absent_paths() {
        let json = doc(r#"{"a":{"b":1}}"#);
        for path in ["/not/here", "/a/b/c", "/a/0", "a", "/a/"] {
            let nested = json.at(path).unwrap();
            assert!(nested.is_missing().unwrap(), "{path}");
            assert_eq!(&*nested.bytes().unwrap(), b"null");
        }
        assert_eq!(json.at("").unwrap().textual().unwrap(), r#"{"a":{"b":1}}"#);
    }

    #[test]
    fn missing_documents_navigate_to_missing() {
        let empty = Document::new(Missing);
        assert!(empty.is_missing().unwrap());
        assert!(empty.at("/x").unwrap().is_missing().unwrap());
        assert_eq!(empty.opt_leaf("x").unwrap(), None);
        assert!(doc("null").is_missing().unwrap());
        assert!(!doc("{}").is_missing().unwrap());
    }

    #[test]
    fn null_leaf_exists() {
        let json = doc(r#"{"n":null}"#);
        assert_eq!(json.opt_leaf("n").unwrap(), None);
        assert_eq!(json.opt_leaf_as_int("n").unwrap(), Some(0));
        assert_eq!(json.opt_leaf_as_bool("n").unwrap(), Some(false));
        assert_eq!(json.opt_leaf_as_double("zzz").unwrap(), None);
    }

    #[test]
    fn empty_path_finds_nothing() {
        let json = doc(r#"{"":"x","field1":"value1"}"#);
        assert_eq!(json.opt_leaf("").unwrap(), None);
        assert!(matches!(json.leaf_as_int(""), Err(Error::NoSuchField { .. })));
    }

    #[test]
    fn field_names_are_not_split() {
        let json = doc(r#"{"a/b":"flat","a":{"b":"nested"}}"#);
        assert_eq!(json.leaf("a/b").unwrap(), "flat");
        assert_eq!(json.leaf("/a/b").unwrap(), "nested");
        assert_eq!(json.leaf("/a~1b").unwrap(), "flat");
    }

    #[test]
    fn no_such_field_carries_path() {
        let err = doc("{}").leaf("/nonexistent/path").unwrap_err();
        assert_eq!(
            err.to_string(),
            "No such field of specified type: /nonexistent/path"
        );
    }

    #[test]
    fn pretty_uses_options() {
        let json = doc(r#"{"field1":"value1","field2":"value2"}"#);
        let options = PrettyOptions {
            line_ending: LineEnding::Lf,
            ..Default::default()
        };
        assert_eq!(
            json.pretty_with(&options).unwrap(),
            "{\n  \"field1\" : \"value1\",\n  \"field2\" : \"value2\"\n}"
        );
        let native = String::from_utf8(LineEnding::Native.as_bytes().to_vec()).unwrap();
        assert_eq!(
            json.pretty().unwrap(),
            format!(
                "{{{native}  \"field1\" : \"value1\",{native}  \"field2\" : \"value2\"{native}}}"
            )
        );
    }

    #[test]
    fn object_node_escape_hatch() {
        let json = doc(r#"{"field1":"value1"}"#);
        assert_eq!(json.object_node().unwrap(), &json!({"field1": "value1"}));
        let mut tree = json.into_object_node().unwrap();
        tree["field2"] = json!(2);
        assert_eq!(tree, json!({"field1": "value1", "field2": 2}));
        assert_eq!(doc("[1]").into_object_node().unwrap(), json!([1]));
    }

    #[test]
    fn shared_first_parse() {
        let json = Arc::new(doc(r#"{"k":"v"}"#));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let json = Arc::clone(&json);
                thread::spawn(move || {
                    json.object_node()
                        .map(|tree| tree as *const Tree as usize)
                })
            })
            .collect();
        let addresses: Vec<usize> = handles
            .into_iter()
            .map(|handle| handle.join().unwrap().unwrap())
            .collect();
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[derive(Debug, Default)]
    struct CountingSource {
        reads: AtomicUsize,
    }

    impl ByteSource for CountingSource {
        fn bytes(&self) -> Result<Cow<'_, [u8]>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(20));
            Ok(Cow::Borrowed(br#"{"k":"v"}"#))
        }
    }

    #[test]
    fn concurrent_first_access_reads_origin_once() {
        const THREADS: usize = 8;
        let json = Arc::new(Document::new(CountingSource::default()));
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let json = Arc::clone(&json);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    json.leaf("k")
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), "v");
        }
        assert_eq!(json.origin().reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clone_keeps_parsed_tree() {
        let parsed = doc(r#"{"k":"v"}"#);
        assert_eq!(parsed.leaf("k").unwrap(), "v");
        let stale = Document {
            origin: Literal::from("malformed"),
            tree: parsed.tree.clone(),
            parsing: Mutex::new(()),
        };
        assert_eq!(stale.clone().leaf("k").unwrap(), "v");
        assert!(matches!(doc("malformed").clone().leaf("k"), Err(Error::Malformed(_))));
    }

    #[test]
    fn display_renders_origin_bytes() {
        let text = r#"{ "field1" : "value1" }"#;
        assert_eq!(doc(text).to_string(), text);
        assert_eq!(doc("malformed").to_string(), "malformed");
        assert_eq!(Document::new(Literal::from(vec![0xff, b'x'])).to_string(), "\u{fffd}x");
        assert_eq!(Document::new(Missing).to_string(), "");
    }

    #[test]
    fn documents_wrap_documents() {
        let inner = doc(r#"{"k":"v"}"#);
        let outer = Document::new(&inner);
        assert_eq!(outer.leaf("k").unwrap(), "v");
        assert_eq!(outer.bytes().unwrap(), inner.bytes().unwrap());
    }
}
