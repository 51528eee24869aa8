//! # IAM Errors
//!
//! Typed API errors for an identity service, with a message-disclosure
//! policy that decides how much internal detail a remote caller may see.
//!
//! ## Design Philosophy
//!
//! 1. **Every failure is a kind** with a fixed status code, title and message template
//! 2. **Messages are resolved once**, eagerly, at construction, and never recomputed
//! 3. **Security kinds reveal nothing** unless an operator turns on `insecure_debug`
//! 4. **Construction never fails**: a template/parameter mismatch logs and falls back
//! 5. **Internal-only failures never reach clients**: the boundary re-wraps them as 500s
//!
//! ## Threat Model
//!
//! We assume callers:
//! - Trigger errors intentionally to probe for internal state
//! - Pass backend failure text (LDAP errors, SQL errors, paths) as error detail
//!
//! Therefore:
//! - Secure kinds (401, 403, 500) discard caller detail in production
//! - Detail revealed in debug mode is always marked with a disclaimer
//! - Caller detail and parameters are zeroized once the message is built
//!
//! ## Quick Start
//!
//! ```rust
//! use iam_errors::{ApiError, ErrorKind, Snapshot};
//!
//! let err = ApiError::builder(ErrorKind::UserNotFound)
//!     .param("user_id", "42")
//!     .build_with(&Snapshot::redacted());
//!
//! assert_eq!(err.status_code(), 404);
//! assert_eq!(err.title(), "Not Found");
//! assert_eq!(err.message(), "Could not find user: 42");
//!
//! // Backend detail on a secure kind stays internal.
//! let err = ApiError::builder(ErrorKind::Unexpected)
//!     .message("disk read failed at sector 9")
//!     .build_with(&Snapshot::redacted());
//! assert_eq!(
//!     err.message(),
//!     "An unexpected error prevented the server from fulfilling your request."
//! );
//! ```
//!
//! ## Features
//!
//! - `trusted_debug`: Enable detailed debug formatting for trusted environments (debug builds only)

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::error::Error;
use std::fmt;
use std::result;
use std::sync::Arc;

pub mod boundary;
pub mod builder;
pub mod codes;
pub mod config;
pub mod convenience;
pub mod definitions;
pub mod logging;
pub mod message;
pub mod params;
pub mod payload;
pub mod template;

pub use boundary::{ErrorResponse, Failure, InternalError};
pub use builder::ErrorBuilder;
pub use codes::*;
pub use config::{ConfigError, Settings, Snapshot};
pub use definitions::*;
pub use logging::InternalLog;
pub use message::{Disclosure, FormatError, Strictness, DISCLAIMER};
pub use params::*;
pub use payload::AuthPayload;

/// Type alias for Results using our error type.
pub type Result<T> = result::Result<T, ApiError>;

// ============================================================================
// Error Instance
// ============================================================================

struct Inner {
    kind: ErrorKind,
    spec: &'static KindSpec,
    message: Box<str>,
    disclosed: bool,
    payload: Option<AuthPayload>,
}

/// One occurrence of an API-facing failure.
///
/// # Key Properties
///
/// - Status code, title and message are fixed at construction
/// - No method recomputes the message; there is no lazy path
/// - `Clone` shares the same instance (`Arc`), it never rebuilds it, so a
///   copied secure-kind error keeps its original text and logs nothing
/// - `Send + Sync`: safe to hand across request tasks
#[must_use = "errors should be returned or reported"]
#[derive(Clone)]
pub struct ApiError {
    inner: Arc<Inner>,
}

impl ApiError {
    /// Construct `kind` with no explicit message and no parameters,
    /// using the process-wide configuration.
    ///
    /// Kinds whose template needs parameters fall back to the raw template;
    /// use [`builder`](Self::builder) for those.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        ErrorBuilder::new(kind).build()
    }

    /// Start a builder for `kind`.
    #[inline]
    pub fn builder(kind: ErrorKind) -> ErrorBuilder {
        ErrorBuilder::new(kind)
    }

    pub(crate) fn from_parts(
        kind: ErrorKind,
        message: String,
        disclosed: bool,
        payload: Option<AuthPayload>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                kind,
                spec: kind.spec(),
                message: message.into_boxed_str(),
                disclosed,
                payload,
            }),
        }
    }

    /// The kind of failure.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    /// Numeric status code for the response.
    #[inline]
    pub fn status_code(&self) -> u16 {
        self.inner.spec.status.as_u16()
    }

    /// Validated status code.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.inner.spec.status
    }

    /// Fixed title ("Not Found").
    #[inline]
    pub fn title(&self) -> &'static str {
        self.inner.spec.title
    }

    /// Client-visible message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Structured authentication hint, for the kinds that carry one.
    #[inline]
    pub fn side_payload(&self) -> Option<&AuthPayload> {
        self.inner.payload.as_ref()
    }

    /// True if secure-kind detail was revealed under `insecure_debug`.
    #[inline]
    pub fn is_disclosed(&self) -> bool {
        self.inner.disclosed
    }

    /// True if this error's kind is `kind` or descends from it.
    #[inline]
    pub fn is_a(&self, kind: ErrorKind) -> bool {
        self.inner.kind.is_a(kind)
    }

    /// Root family of the kind.
    #[inline]
    pub fn family(&self) -> Family {
        self.inner.spec.family
    }

    /// Disclosure policy of the kind.
    #[inline]
    pub fn disclosure(&self) -> DisclosureMode {
        self.inner.spec.disclosure
    }

    /// Borrowed structured view for internal logging.
    #[inline]
    pub fn internal_log(&self) -> InternalLog<'_> {
        InternalLog::new(self)
    }

    /// True when `self` and `other` are the same instance.
    #[inline]
    pub fn ptr_eq(&self, other: &ApiError) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl fmt::Debug for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiError")
            .field("kind", &self.inner.kind)
            .field("status", &self.inner.spec.status.as_u16())
            .field("message", &self.inner.message)
            .field("disclosed", &self.inner.disclosed)
            .field("payload", &self.inner.payload.as_ref().map(|_| "<PRESENT>"))
            .finish()
    }
}

impl fmt::Display for ApiError {
    /// Client-visible message only; status and title travel separately.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.message)
    }
}

impl Error for ApiError {}
