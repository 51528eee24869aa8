//! Diagnostics: structured log views and the records this crate emits.
//!
//! # Records
//!
//! | Level | Target | When |
//! |-------|--------|------|
//! | `WARN` | `iam_errors::format` | a template referenced a missing parameter |
//! | `DEBUG` | `iam_errors::format` | a non-text explicit message was skipped |
//! | `ERROR` | `iam_errors::boundary` | an internal-only failure reached the boundary |
//!
//! The crate never installs a subscriber; the host application decides
//! where records go.
//!
//! # Borrowed Views
//!
//! [`InternalLog`] borrows from an [`ApiError`] and cannot outlive it. It is
//! meant to be consumed by the logging call that created it.

use crate::boundary::InternalError;
use crate::codes::StatusCode;
use crate::definitions::ErrorKind;
use crate::template::MissingParams;
use crate::ApiError;
use std::borrow::Cow;
use std::fmt;

/// Maximum length for any individual field in formatted output.
const MAX_FIELD_OUTPUT_LEN: usize = 1024;

/// Marker appended to truncated fields.
const TRUNCATION_INDICATOR: &str = "...[TRUNCATED]";

// ============================================================================
// Emitted Records
// ============================================================================

/// One warning per fallback, carrying kind, template and missing names.
pub(crate) fn format_mismatch(kind: ErrorKind, template: &str, missing: &MissingParams) {
    tracing::warn!(
        target: "iam_errors::format",
        kind = kind.name(),
        family = kind.family().display_name(),
        disclosure = kind.disclosure().as_str(),
        template = %truncate_with_indicator(template),
        missing = %missing,
        "missing message parameters (programmer error), using raw template"
    );
}

pub(crate) fn non_text_message_skipped(kind: ErrorKind, variant: &'static str) {
    tracing::debug!(
        target: "iam_errors::format",
        kind = kind.name(),
        variant,
        "explicit message is not text, ignoring it"
    );
}

pub(crate) fn internal_escape(err: &InternalError) {
    tracing::error!(
        target: "iam_errors::boundary",
        error = %err,
        status = StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        "internal-only failure reached the response boundary, replacing with generic 500"
    );
}

// ============================================================================
// Internal Log View
// ============================================================================

/// Structured log entry borrowed from an [`ApiError`].
///
/// # Example
///
/// ```rust
/// # use iam_errors::{ApiError, ErrorKind, Snapshot};
/// let err = ApiError::builder(ErrorKind::RoleNotFound)
///     .param("role_id", "admin")
///     .build_with(&Snapshot::redacted());
/// let mut line = String::new();
/// err.internal_log().write_to(&mut line).unwrap();
/// assert!(line.starts_with("[404 RoleNotFound]"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct InternalLog<'a> {
    error: &'a ApiError,
}

impl<'a> InternalLog<'a> {
    #[inline]
    pub(crate) fn new(error: &'a ApiError) -> Self {
        Self { error }
    }

    /// Kind of the logged error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }

    /// Status code.
    #[inline]
    pub fn status_code(&self) -> u16 {
        self.error.status_code()
    }

    /// Title.
    #[inline]
    pub fn title(&self) -> &'static str {
        self.error.title()
    }

    /// Message, untruncated.
    #[inline]
    pub fn message(&self) -> &'a str {
        self.error.message()
    }

    /// Whether secure detail was revealed.
    #[inline]
    pub fn disclosed(&self) -> bool {
        self.error.is_disclosed()
    }

    /// Whether a side payload is attached.
    #[inline]
    pub fn has_payload(&self) -> bool {
        self.error.side_payload().is_some()
    }

    /// Write one log line, truncating long fields.
    pub fn write_to(&self, f: &mut impl fmt::Write) -> fmt::Result {
        write!(
            f,
            "[{} {}] title='{}' message='{}'",
            self.status_code(),
            self.kind(),
            self.title(),
            truncate_with_indicator(self.message())
        )?;
        if self.disclosed() {
            f.write_str(" [DISCLOSED]")?;
        }
        if self.has_payload() {
            f.write_str(" payload=<PRESENT>")?;
        }
        Ok(())
    }

    /// Log line including the serialized side payload.
    ///
    /// Only available with the `trusted_debug` feature in debug builds.
    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    pub fn format_for_trusted_debug(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_to(&mut output);
        if let Some(payload) = self.error.side_payload() {
            let json = serde_json::to_string(payload).unwrap_or_default();
            output.push_str(&format!(" payload='{}'", truncate_with_indicator(&json)));
        }
        output
    }
}

impl fmt::Display for InternalLog<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

/// Bound a field to `MAX_FIELD_OUTPUT_LEN` bytes, cutting on a char boundary.
fn truncate_with_indicator(s: &str) -> Cow<'_, str> {
    if s.len() <= MAX_FIELD_OUTPUT_LEN {
        return Cow::Borrowed(s);
    }

    let budget = MAX_FIELD_OUTPUT_LEN - TRUNCATION_INDICATOR.len();
    let cut = s
        .char_indices()
        .map(|(index, _)| index)
        .take_while(|index| *index <= budget)
        .last()
        .unwrap_or(0);

    let mut result = String::with_capacity(cut + TRUNCATION_INDICATOR.len());
    result.push_str(&s[..cut]);
    result.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Snapshot;

    #[test]
    fn short_fields_are_borrowed() {
        let truncated = truncate_with_indicator("short string");
        assert!(matches!(truncated, Cow::Borrowed(_)));
    }

    #[test]
    fn long_ascii_is_bounded() {
        let s = "a".repeat(MAX_FIELD_OUTPUT_LEN + 1);
        let truncated = truncate_with_indicator(&s);
        assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
        assert!(truncated.ends_with(TRUNCATION_INDICATOR));
    }

    #[test]
    fn multibyte_cut_is_valid_utf8() {
        for unit in ["й", "🔥", "ü"] {
            let s = unit.repeat(MAX_FIELD_OUTPUT_LEN);
            let truncated = truncate_with_indicator(&s);
            assert!(truncated.len() <= MAX_FIELD_OUTPUT_LEN);
            assert!(truncated.ends_with(TRUNCATION_INDICATOR));
            let body = &truncated[..truncated.len() - TRUNCATION_INDICATOR.len()];
            assert!(body.chars().all(|c| c.to_string() == unit));
        }
    }

    #[test]
    fn log_line_marks_disclosure_and_payload() {
        let err = ApiError::builder(ErrorKind::AuthPlugin)
            .message("plugin totp crashed")
            .build_with(&Snapshot::revealing());
        let line = err.internal_log().to_string();
        assert!(line.starts_with("[401 AuthPlugin] title='Unauthorized'"));
        assert!(line.contains("plugin totp crashed"));
        assert!(line.ends_with("[DISCLOSED] payload=<PRESENT>"));
    }

    #[test]
    fn log_line_truncates_message() {
        let huge = "x".repeat(4 * MAX_FIELD_OUTPUT_LEN);
        let err = ApiError::builder(ErrorKind::SchemaValidation)
            .param("detail", huge)
            .build_with(&Snapshot::redacted());
        let mut line = String::new();
        err.internal_log().write_to(&mut line).unwrap();
        assert!(line.len() < 2 * MAX_FIELD_OUTPUT_LEN);
        assert!(line.contains(TRUNCATION_INDICATOR));
        assert_eq!(err.internal_log().message().len(), 4 * MAX_FIELD_OUTPUT_LEN);
    }

    #[cfg(all(feature = "trusted_debug", debug_assertions))]
    #[test]
    fn trusted_debug_includes_payload() {
        let snapshot = Snapshot::redacted().with_auth_methods(["password"]);
        let err = ApiError::builder(ErrorKind::AuthMethodNotSupported).build_with(&snapshot);
        let line = err.internal_log().format_for_trusted_debug();
        assert!(line.contains(r#"payload='{"methods":["password"]}'"#));
    }
}
