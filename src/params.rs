//! Named substitution values and caller-supplied explicit messages.
//!
//! # Security
//!
//! Both types hold request-derived data (user ids, backend failure text).
//! Owned text is zeroized on drop. Borrowed `'static` text lives in program
//! memory and is left alone.
//!
//! # No Clone Policy
//!
//! Neither type implements `Clone`. The rendered message is the only copy
//! that outlives construction.

use crate::template::Lookup;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt::{self, Write as _};
use zeroize::Zeroize;

// ============================================================================
// Parameter Values
// ============================================================================

/// A single substitution value.
#[derive(Debug, PartialEq, Eq)]
pub enum ParamValue {
    /// Text, inserted verbatim.
    Text(Cow<'static, str>),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Boolean, rendered as `true`/`false`.
    Bool(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{}", value),
            Self::UInt(value) => write!(f, "{}", value),
            Self::Bool(value) => write!(f, "{}", value),
        }
    }
}

impl Zeroize for ParamValue {
    fn zeroize(&mut self) {
        if let Self::Text(Cow::Owned(text)) = self {
            text.zeroize();
        }
    }
}

impl Drop for ParamValue {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl From<&'static str> for ParamValue {
    fn from(value: &'static str) -> Self {
        Self::Text(Cow::Borrowed(value))
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(Cow::Owned(value))
    }
}

impl From<Cow<'static, str>> for ParamValue {
    fn from(value: Cow<'static, str>) -> Self {
        Self::Text(value)
    }
}

macro_rules! param_from_int {
    ($variant:ident, $target:ty => $($source:ty),+) => {
        $(
            impl From<$source> for ParamValue {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

param_from_int!(Int, i64 => i8, i16, i32, i64);
param_from_int!(UInt, u64 => u8, u16, u32, u64);

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::UInt(value as u64)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

// ============================================================================
// Parameter Set
// ============================================================================

/// Named substitution values for one error construction.
///
/// # Capacity Choice
///
/// Templates reference at most four names; `SmallVec<[_; 4]>` keeps the
/// common case off the heap.
#[derive(Debug, Default)]
pub struct Params {
    entries: SmallVec<[(&'static str, ParamValue); 4]>,
}

impl Params {
    /// Create an empty set.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }

    /// Set `name` to `value`, replacing any previous value.
    pub fn insert(&mut self, name: &'static str, value: impl Into<ParamValue>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[inline]
    pub fn with(mut self, name: &'static str, value: impl Into<ParamValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Value of `name`, if set.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Iterate over all entries in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> {
        self.entries.iter().map(|(key, value)| (*key, value))
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no values are set.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lookup for Params {
    fn write_param(&self, name: &str, out: &mut String) -> bool {
        match self.get(name) {
            Some(ParamValue::Text(text)) => {
                out.push_str(text);
                true
            }
            // Writing into a String cannot fail.
            Some(value) => write!(out, "{}", value).is_ok(),
            None => false,
        }
    }
}

// ============================================================================
// Explicit Message
// ============================================================================

/// Detail text a caller wants to attach instead of the kind's template.
///
/// Only the `Text` variant is ever rendered. Raw bytes and foreign error
/// values are accepted so that call sites can pass whatever they caught,
/// but the builder treats them as absent.
pub enum ExplicitMessage {
    /// Caller-supplied text; may contain placeholders.
    Text(Cow<'static, str>),
    /// Raw bytes of unknown encoding.
    Bytes(Vec<u8>),
    /// A failure value passed where a message was expected.
    Failure(Box<dyn StdError + Send + Sync>),
}

impl ExplicitMessage {
    /// Wrap a foreign error value.
    pub fn failure(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Failure(Box::new(err))
    }

    /// The text, if this is a text message.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Bytes(_) | Self::Failure(_) => None,
        }
    }

    /// Static label of the variant, for diagnostics.
    #[inline]
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Failure(_) => "failure",
        }
    }
}

impl fmt::Debug for ExplicitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Content stays out of Debug output.
        match self {
            Self::Text(text) => write!(f, "ExplicitMessage::Text(<{} bytes>)", text.len()),
            Self::Bytes(bytes) => write!(f, "ExplicitMessage::Bytes(<{} bytes>)", bytes.len()),
            Self::Failure(_) => f.write_str("ExplicitMessage::Failure(<opaque>)"),
        }
    }
}

impl Zeroize for ExplicitMessage {
    fn zeroize(&mut self) {
        match self {
            Self::Text(Cow::Owned(text)) => text.zeroize(),
            Self::Text(Cow::Borrowed(_)) | Self::Failure(_) => {}
            Self::Bytes(bytes) => bytes.zeroize(),
        }
    }
}

impl Drop for ExplicitMessage {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl From<&'static str> for ExplicitMessage {
    fn from(text: &'static str) -> Self {
        Self::Text(Cow::Borrowed(text))
    }
}

impl From<String> for ExplicitMessage {
    fn from(text: String) -> Self {
        Self::Text(Cow::Owned(text))
    }
}

impl From<Vec<u8>> for ExplicitMessage {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template;

    #[test]
    fn insert_replaces_existing_name() {
        let mut params = Params::new();
        params.insert("user_id", "a");
        params.insert("user_id", String::from("b"));
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("user_id"), Some(&ParamValue::from("b")));
    }

    #[test]
    fn non_text_values_render_with_display() {
        let params = Params::new()
            .with("size", 64u32)
            .with("delta", -3i32)
            .with("enabled", true);
        let out = template::render("{size}/{delta}/{enabled}", &params).unwrap();
        assert_eq!(out, "64/-3/true");
    }

    #[test]
    fn explicit_message_text_view() {
        assert_eq!(ExplicitMessage::from("boom").as_text(), Some("boom"));
        assert_eq!(ExplicitMessage::from(vec![0xff, 0x00]).as_text(), None);

        let io = std::io::Error::other("disk");
        let failure = ExplicitMessage::failure(io);
        assert_eq!(failure.as_text(), None);
        assert_eq!(failure.variant_name(), "failure");
    }

    #[test]
    fn debug_output_hides_content() {
        let msg = ExplicitMessage::from(String::from("secret-token-abc"));
        let rendered = format!("{:?}", msg);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("16 bytes"));
    }

    #[test]
    fn zeroize_clears_owned_text() {
        let mut msg = ExplicitMessage::from(String::from("sensitive"));
        msg.zeroize();
        assert_eq!(msg.as_text(), Some(""));

        let mut value = ParamValue::from(String::from("user-42"));
        value.zeroize();
        assert_eq!(value.to_string(), "");
    }
}
