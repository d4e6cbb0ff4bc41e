//! Options for decoding and encoding configuration text.
//!
//! - [`DecodeOptions`]: section hints that place keys in a fixed section
//! - [`EncodeOptions`]: an optional header comment block
//!
//! ## Examples
//!
//! ```rust
//! use lvmconf::{DecodeOptions, EncodeOptions};
//!
//! let decode = DecodeOptions::new().with_section_hint("use_lvmetad", "global");
//! assert_eq!(decode.section_hint("use_lvmetad"), Some("global"));
//!
//! let encode = EncodeOptions::new().with_header("Generated file, do not edit");
//! assert!(encode.header.is_some());
//! ```

use indexmap::IndexMap;

/// Configuration options for decoding.
///
/// # Examples
///
/// ```rust
/// use lvmconf::{from_str_into_with_options, schema, DecodeOptions};
///
/// #[derive(Default)]
/// struct Lvm { global: Global }
/// #[derive(Default)]
/// struct Global { use_lvmetad: i64 }
///
/// schema! { impl Schema for Lvm { "global" => global } }
/// schema! { impl Section for Global { "use_lvmetad" => use_lvmetad } }
///
/// let options = DecodeOptions::new().with_section_hint("use_lvmetad", "global");
/// let mut lvm = Lvm::default();
/// from_str_into_with_options("use_lvmetad = 1\n", &mut lvm, &options).unwrap();
/// assert_eq!(lvm.global.use_lvmetad, 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct DecodeOptions {
    /// Section to attribute a key to, wherever it is assigned.
    ///
    /// Hints are consulted by structured decode only. A hinted key belongs to
    /// the hinted section even when it is written inside another section or
    /// outside any section.
    pub section_hints: IndexMap<String, String>,
}

impl DecodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_section_hint(mut self, key: &str, section: &str) -> Self {
        self.section_hints
            .insert(key.to_string(), section.to_string());
        self
    }

    #[must_use]
    pub fn section_hint(&self, key: &str) -> Option<&str> {
        self.section_hints.get(key).map(String::as_str)
    }
}

/// Configuration options for encoding.
#[derive(Clone, Debug, Default)]
pub struct EncodeOptions {
    /// Comment block written before the first section, one `#` line per line.
    pub header: Option<String>,
}

impl EncodeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the header comment.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lvmconf::{config_map, to_string_map_with_options, EncodeOptions};
    ///
    /// let map = config_map! { "global/umask" => 63 };
    /// let options = EncodeOptions::new().with_header("lvm.conf");
    /// let text = to_string_map_with_options(&map, &options).unwrap();
    /// assert_eq!(text, "# lvm.conf\nglobal {\n\tumask = 63\n}\n");
    /// ```
    #[must_use]
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = Some(header.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_hint_replaces_earlier() {
        let options = DecodeOptions::new()
            .with_section_hint("a", "one")
            .with_section_hint("a", "two");
        assert_eq!(options.section_hint("a"), Some("two"));
        assert_eq!(options.section_hint("b"), None);
    }

    #[test]
    fn test_encode_defaults() {
        assert!(EncodeOptions::default().header.is_none());
    }
}
