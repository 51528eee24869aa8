//! Taxonomy primitives - the fixed attributes every error kind resolves to.
//!
//! When a client triggers an error, it sees a status code, a title and a
//! message. Which message it sees is governed by the kind's [`DisclosureMode`].
//!
//! # Families
//!
//! - **Validation** (400): malformed requests, always safe to describe
//! - **ForbiddenNotSecurity** (403): forbidden-ness is not itself sensitive
//! - **Unauthorized** (401), **Forbidden** (403), **Unexpected** (500): security family
//! - **NotFound** (404), **Conflict** (409), **Gone** (410), **NotImplemented** (501)
//!
//! # Governance
//!
//! Status codes are validated at construction. `StatusCode::new` is a
//! `const fn` whose assertion fails the build when a kind declares a status
//! outside `400..=599`; `StatusCode::checked_new` is the fallible runtime path.
//!
//! # Copy Semantics
//!
//! Everything here is small classification metadata and is `Copy`. The
//! resolved [`KindSpec`] lives in a static table and is handed out by
//! reference only.

use std::fmt;

// ============================================================================
// Status Code (Validates Policy)
// ============================================================================

/// Validated HTTP-style status code for API-facing errors (400-599).
///
/// # Example
///
/// ```rust
/// # use iam_errors::StatusCode;
/// // Compile-time validation
/// const NOT_FOUND: StatusCode = StatusCode::new(404);
/// assert!(NOT_FOUND.is_client_error());
///
/// // Runtime validation
/// assert!(StatusCode::checked_new(200).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Status used by the boundary for anything without a public status.
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode::new(500);

    /// Create a status code with compile-time validation.
    ///
    /// # Panics
    ///
    /// Panics (at compile time in const contexts) if `code` is outside 400-599.
    #[inline]
    pub const fn new(code: u16) -> Self {
        assert!(code >= 400 && code <= 599, "Error status must be 400-599");
        Self(code)
    }

    /// Create a status code with runtime validation.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `code` is not an error status.
    #[inline]
    pub fn checked_new(code: u16) -> Result<Self, StatusCodeError> {
        if (400..=599).contains(&code) {
            Ok(Self(code))
        } else {
            Err(StatusCodeError::NotAnErrorStatus { value: code })
        }
    }

    /// Get the raw numeric value.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// True for 4xx statuses.
    #[inline]
    pub const fn is_client_error(self) -> bool {
        self.0 < 500
    }

    /// True for 5xx statuses.
    #[inline]
    pub const fn is_server_error(self) -> bool {
        self.0 >= 500
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> Self {
        status.0
    }
}

/// Error type for status code validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCodeError {
    /// Value is not in the 400-599 range.
    NotAnErrorStatus {
        /// The rejected value.
        value: u16,
    },
}

impl fmt::Display for StatusCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnErrorStatus { value } => {
                write!(f, "Status {} is not an error status (must be 400-599)", value)
            }
        }
    }
}

impl std::error::Error for StatusCodeError {}

// ============================================================================
// Disclosure Mode
// ============================================================================

/// How much caller-supplied detail a kind may reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisclosureMode {
    /// Caller-supplied detail is always rendered. The message describes the
    /// request, not internal state.
    Plain,
    /// Caller-supplied detail is rendered only while the insecure-debug
    /// override is active; otherwise the fixed template is used.
    Secure,
}

impl DisclosureMode {
    /// Static label for logs and metrics.
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Secure => "secure",
        }
    }
}

// ============================================================================
// Family Classification
// ============================================================================

/// Root family a kind belongs to.
///
/// Families are fixed by the root of each inheritance chain and are used for
/// coarse classification ("is this a not-found failure?") without walking
/// the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// 400: malformed request.
    Validation,
    /// 403 where the refusal itself reveals nothing.
    ForbiddenNotSecurity,
    /// 401: authentication required or rejected.
    Unauthorized,
    /// 403: authorization refused.
    Forbidden,
    /// 404: identified resource is missing.
    NotFound,
    /// 409: write would conflict with stored state.
    Conflict,
    /// 410: resource or service permanently removed.
    Gone,
    /// 501: action not implemented.
    NotImplemented,
    /// 500: unexpected internal failure.
    Unexpected,
}

impl Family {
    /// Human-readable name for display and logs.
    #[inline]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Validation => "Validation",
            Self::ForbiddenNotSecurity => "Forbidden (not security)",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::Conflict => "Conflict",
            Self::Gone => "Gone",
            Self::NotImplemented => "Not Implemented",
            Self::Unexpected => "Unexpected",
        }
    }

    /// True for the families whose kinds use [`DisclosureMode::Secure`].
    #[inline]
    pub const fn is_security(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden | Self::Unexpected)
    }
}

// ============================================================================
// Side Payload Shape
// ============================================================================

/// Which structured side payload, if any, a kind attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    /// No side payload.
    None,
    /// Empty authentication map.
    AuthPlugin,
    /// The list of acceptable authentication methods.
    AuthMethods,
    /// An opaque continuation blob supplied by the auth plugin.
    Continuation,
}

// ============================================================================
// Resolved Kind Specification
// ============================================================================

/// Fully resolved attributes of one error kind.
///
/// Produced once by flattening the kind's inheritance chain (see
/// `definitions`). Never recomputed at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSpec {
    /// Status code reported to the client.
    pub status: StatusCode,
    /// Short fixed phrase ("Not Found").
    pub title: &'static str,
    /// Public message template.
    pub message_template: Option<&'static str>,
    /// Detailed template used only while insecure-debug is active.
    pub debug_template: Option<&'static str>,
    /// Disclosure policy.
    pub disclosure: DisclosureMode,
    /// Root family.
    pub family: Family,
    /// Default values for placeholders the caller may omit.
    pub defaults: &'static [(&'static str, &'static str)],
    /// Side payload attached at construction.
    pub payload: PayloadShape,
}

impl KindSpec {
    /// Look up a default parameter value declared by the kind.
    #[inline]
    pub fn default_param(&self, name: &str) -> Option<&'static str> {
        self.defaults
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }
}

// ============================================================================
// Tests
// ============================================================================
