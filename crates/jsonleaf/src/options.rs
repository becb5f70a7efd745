use serde::{Deserialize, Serialize};

/// Line separator written between the lines of pretty output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineEnding {
    /// The separator of the platform the crate was compiled for.
    #[default]
    Native,
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
}

impl LineEnding {
    /// The separator as raw bytes.
    #[must_use]
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            Self::Native if cfg!(windows) => b"\r\n",
            Self::Native | Self::Lf => b"\n",
            Self::CrLf => b"\r\n",
        }
    }
}

/// Configuration for the multi-line rendering produced by
/// [`Document::pretty_with`](crate::Document::pretty_with).
///
/// Objects are written one entry per line with `" : "` between key and value.
/// Arrays stay on the line they start on, as `[ a, b ]`. Empty containers
/// are written as `{ }` and `[ ]`.
///
/// # Examples
///
/// ```rust
/// use jsonleaf::{Document, LineEnding, Literal, PrettyOptions};
///
/// let doc = Document::new(Literal::from(r#"{"a":[1,2]}"#));
/// let options = PrettyOptions {
///     line_ending: LineEnding::Lf,
///     ..Default::default()
/// };
/// assert_eq!(doc.pretty_with(&options).unwrap(), "{\n  \"a\" : [ 1, 2 ]\n}");
/// ```
///
/// # Default
///
/// Two spaces of indentation and the platform line separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrettyOptions {
    /// Number of spaces added for every enclosing object.
    ///
    /// Arrays are written inline and do not add indentation.
    ///
    /// # Default
    ///
    /// `2`
    pub indent: usize,

    /// Separator written before every object entry and before the closing
    /// brace of a non-empty object.
    ///
    /// # Default
    ///
    /// [`LineEnding::Native`]
    pub line_ending: LineEnding,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            line_ending: LineEnding::Native,
        }
    }
}
