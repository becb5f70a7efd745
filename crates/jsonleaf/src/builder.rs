//! Fluent construction of JSON objects.

use std::{borrow::Cow, fmt, io};

use crate::{ByteSource, Document, Error, Map, Result, Tree, engine, source::is_missing_bytes};

/// A mutable JSON object assembled field by field.
///
/// Every `with*` call returns the same builder so calls can be chained, and
/// the builder is itself a [`ByteSource`] reflecting its state at the time
/// it is read.
///
/// # Examples
///
/// ```rust
/// use jsonleaf::{Builder, ByteSource};
///
/// let mut nereid = Builder::new();
/// nereid.with("hair", "red").with("age", 77.5);
///
/// let json = Builder::new()
///     .with("ocean", Builder::new().with("nereid", &nereid))
///     .with("calm", true)
///     .to_string();
/// assert_eq!(json, r#"{"ocean":{"nereid":{"hair":"red","age":77.5}},"calm":true}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Builder {
    base: Map,
}

impl Builder {
    /// Starts from an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an independent copy of the object held by `source`.
    ///
    /// # Errors
    ///
    /// Fails if `source` cannot be read, is not well-formed JSON, or its root
    /// is not an object.
    pub fn from_source(source: &(impl ByteSource + ?Sized)) -> Result<Self> {
        match engine::parse_tree(&source.bytes()?)? {
            Tree::Object(base) => Ok(Self { base }),
            other => Err(Error::NotAnObject {
                found: engine::kind(&other),
            }),
        }
    }

    /// Sets `key` to `value`, replacing any previous value.
    ///
    /// Scalars (`&str`, `String`, integers, `f64`, `bool`) and other builders
    /// are accepted. A builder is copied as it is now; changing it afterwards
    /// does not affect this one. A `Vec` of builders becomes an array.
    ///
    /// JSON has no NaN or infinity, so a non-finite `f64` is stored as
    /// `null`.
    pub fn with(&mut self, key: impl Into<String>, value: impl Into<Tree>) -> &mut Self {
        self.base.insert(key.into(), value.into());
        self
    }

    /// Sets `key` to an array holding a copy of each builder, in order.
    pub fn with_array<'b>(
        &mut self,
        key: impl Into<String>,
        items: impl IntoIterator<Item = &'b Builder>,
    ) -> &mut Self {
        let array = items.into_iter().map(Tree::from).collect();
        self.with(key, Tree::Array(array))
    }

    /// Sets `key` to the parsed content of `source`. A missing source sets
    /// `null`.
    ///
    /// # Errors
    ///
    /// Fails if `source` cannot be read or is not well-formed JSON. The
    /// builder is left unchanged in that case.
    pub fn with_source(
        &mut self,
        key: impl Into<String>,
        source: &(impl ByteSource + ?Sized),
    ) -> Result<&mut Self> {
        let bytes = source.bytes()?;
        let value = if is_missing_bytes(&bytes) {
            Tree::Null
        } else {
            engine::parse_tree(&bytes)?
        };
        Ok(self.with(key, value))
    }

    /// The fields set so far.
    #[must_use]
    pub fn fields(&self) -> &Map {
        &self.base
    }

    /// A snapshot of the current object.
    #[must_use]
    pub fn tree(&self) -> Tree {
        Tree::Object(self.base.clone())
    }

    /// Freezes the builder into a document.
    #[must_use]
    pub fn into_document(self) -> Document<Self> {
        Document::new(self)
    }
}

impl ByteSource for Builder {
    fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        let bytes = serde_json::to_vec(&self.base).map_err(io::Error::from)?;
        Ok(Cow::Owned(bytes))
    }
}

impl fmt::Display for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(&self.base).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl From<&Builder> for Tree {
    fn from(builder: &Builder) -> Self {
        builder.tree()
    }
}

impl From<&mut Builder> for Tree {
    fn from(builder: &mut Builder) -> Self {
        builder.tree()
    }
}

impl From<Builder> for Tree {
    fn from(builder: Builder) -> Self {
        Tree::Object(builder.base)
    }
}
