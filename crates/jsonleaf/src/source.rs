//! Re-readable producers of raw document bytes.
//!
//! Every [`ByteSource`] returns the same bytes no matter how often it is
//! asked. Backings that can only be consumed once, like a stream or a file
//! that may later change, are read a single time and kept in memory.

use std::{
    borrow::Cow,
    fmt, fs,
    io::{self, Read},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use bstr::ByteSlice;
use tracing::trace;

use crate::{Result, Tree, engine};

/// The bytes of the literal `null`.
pub(crate) const NULL_BYTES: &[u8] = b"null";

/// Returns `true` for the byte forms that stand for "no document": nothing
/// at all, or exactly `null`.
pub(crate) fn is_missing_bytes(bytes: &[u8]) -> bool {
    bytes.is_empty() || bytes == NULL_BYTES
}

/// A producer of the raw bytes of a JSON document.
///
/// Implementations must be re-readable: two calls to [`bytes`](Self::bytes)
/// yield identical content. The bytes are not required to be valid JSON.
pub trait ByteSource {
    /// Returns the document bytes.
    ///
    /// # Errors
    ///
    /// Fails only when a lazily read backing (stream, file) cannot be read.
    fn bytes(&self) -> Result<Cow<'_, [u8]>>;
}

impl<T: ByteSource + ?Sized> ByteSource for &T {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        (**self).bytes()
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        (**self).bytes()
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Arc<T> {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        (**self).bytes()
    }
}

impl ByteSource for [u8] {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self))
    }
}

impl ByteSource for Vec<u8> {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self))
    }
}

impl ByteSource for str {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

impl ByteSource for String {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(self.as_bytes()))
    }
}

/// Bytes held in memory.
///
/// # Examples
///
/// ```rust
/// use jsonleaf::{ByteSource, Literal};
///
/// let source = Literal::from("malformed");
/// assert_eq!(&*source.bytes().unwrap(), b"malformed");
/// assert_eq!(source.to_string(), "malformed");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Literal(Vec<u8>);

impl Literal {
    /// Serializes `tree` in its compact form.
    #[must_use]
    pub fn from_tree(tree: &Tree) -> Self {
        Self(engine::serialize_compact(tree).into_bytes())
    }

    /// The held bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Gives back the held bytes.
    #[must_use]
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

impl ByteSource for Literal {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.0))
    }
}

impl From<Vec<u8>> for Literal {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for Literal {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<String> for Literal {
    fn from(text: String) -> Self {
        Self(text.into_bytes())
    }
}

impl From<&str> for Literal {
    fn from(text: &str) -> Self {
        Self(text.as_bytes().to_vec())
    }
}

impl From<&Tree> for Literal {
    fn from(tree: &Tree) -> Self {
        Self::from_tree(tree)
    }
}

impl From<Tree> for Literal {
    fn from(tree: Tree) -> Self {
        Self::from_tree(&tree)
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Literal").field(&self.0.as_bstr()).finish()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0.as_bstr(), f)
    }
}

/// The absent document. Always yields zero bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Missing;

impl ByteSource for Missing {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&[]))
    }
}

/// Write-once byte cache. `state` is only touched by the call that fills it.
#[derive(Debug)]
struct Memo<S> {
    bytes: OnceLock<Vec<u8>>,
    state: Mutex<S>,
}

impl<S> Memo<S> {
    fn new(state: S) -> Self {
        Self {
            bytes: OnceLock::new(),
            state: Mutex::new(state),
        }
    }

    fn get_or_fill(&self, fill: impl FnOnce(&mut S) -> io::Result<Vec<u8>>) -> Result<&[u8]> {
        if let Some(bytes) = self.bytes.get() {
            return Ok(bytes);
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bytes) = self.bytes.get() {
            return Ok(bytes);
        }
        let filled = fill(&mut *state)?;
        Ok(self.bytes.get_or_init(|| filled))
    }
}

#[derive(Debug)]
struct Pending<R> {
    reader: Option<R>,
    buffered: Vec<u8>,
}

/// A one-shot reader, drained on first access and replayed from memory.
///
/// A read error leaves whatever was already read in place; the next access
/// resumes from there.
///
/// # Examples
///
/// ```rust
/// use jsonleaf::{ByteSource, StreamSource};
///
/// let source = StreamSource::new(&b"{\"number\": 12}"[..]);
/// assert_eq!(source.bytes().unwrap(), source.bytes().unwrap());
/// ```
#[derive(Debug)]
pub struct StreamSource<R> {
    memo: Memo<Pending<R>>,
}

impl<R: Read> StreamSource<R> {
    /// Wraps `reader` without reading from it yet.
    pub fn new(reader: R) -> Self {
        Self {
            memo: Memo::new(Pending {
                reader: Some(reader),
                buffered: Vec::new(),
            }),
        }
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        self.memo
            .get_or_fill(|Pending { reader, buffered }| {
                if let Some(stream) = reader.as_mut() {
                    stream.read_to_end(buffered)?;
                }
                // Dropping the reader closes it.
                *reader = None;
                trace!(len = buffered.len(), "buffered stream source");
                Ok(std::mem::take(buffered))
            })
            .map(Cow::Borrowed)
    }
}

/// A file read in full on first access.
///
/// Once read, later changes to the file, including its removal, are not
/// observed.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    memo: Memo<()>,
}

impl FileSource {
    /// Refers to the file at `path` without opening it.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            memo: Memo::new(()),
        }
    }

    /// The path the bytes are (or will be) read from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileSource {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        self.memo
            .get_or_fill(|_| {
                let bytes = fs::read(&self.path)?;
                trace!(path = %self.path.display(), len = bytes.len(), "read file source");
                Ok(bytes)
            })
            .map(Cow::Borrowed)
    }
}
