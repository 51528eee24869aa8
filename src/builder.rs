//! Fluent construction of [`ApiError`] values.
//!
//! # Example
//!
//! ```rust
//! use iam_errors::{ApiError, ErrorKind};
//!
//! let err = ApiError::builder(ErrorKind::UserNotFound)
//!     .param("user_id", "42")
//!     .build();
//!
//! assert_eq!(err.status_code(), 404);
//! assert_eq!(err.message(), "Could not find user: 42");
//! ```

use crate::config::{self, Snapshot};
use crate::definitions::ErrorKind;
use crate::message::{self, Disclosure, FormatError, Rendered};
use crate::params::{ExplicitMessage, ParamValue, Params};
use crate::payload::AuthPayload;
use crate::ApiError;
use serde_json::Value;
use std::sync::Arc;

/// Builder for one error occurrence.
///
/// Holds the caller's inputs until [`build`](Self::build). The message is
/// resolved once, eagerly, and the inputs are dropped (and zeroized) right
/// after.
#[derive(Debug)]
pub struct ErrorBuilder {
    kind: ErrorKind,
    message: Option<ExplicitMessage>,
    params: Params,
    continuation: Option<Value>,
}

impl ErrorBuilder {
    /// Start building an error of `kind`.
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            params: Params::new(),
            continuation: None,
        }
    }

    /// Supply explicit detail in place of the kind's template.
    ///
    /// Secure kinds show it only while `insecure_debug` is on.
    ///
    /// # Panics (Debug Mode)
    ///
    /// Panics if a message was already set.
    #[inline]
    pub fn message(mut self, message: impl Into<ExplicitMessage>) -> Self {
        debug_assert!(
            self.message.is_none(),
            "ErrorBuilder: explicit message already set"
        );
        self.message = Some(message.into());
        self
    }

    /// Pass a caught failure as the explicit message.
    ///
    /// It is never rendered, only noted in the debug log.
    #[inline]
    pub fn failure(self, err: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.message(ExplicitMessage::failure(err))
    }

    /// Set a named substitution value.
    #[inline]
    pub fn param(mut self, name: &'static str, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    /// Attach the opaque next-step blob of a multi-step login.
    ///
    /// Ignored by kinds that do not carry a continuation payload.
    #[inline]
    pub fn continuation(mut self, blob: Value) -> Self {
        self.continuation = Some(blob);
        self
    }

    /// Kind being built.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Build against the process-wide configuration, read now.
    ///
    /// Only the override and strictness flags are loaded; the method list
    /// is read for the one kind that reports it.
    pub fn build(self) -> ApiError {
        let config = config::global();
        let rendered = message::build_reporting(
            self.kind,
            self.message.as_ref(),
            &self.params,
            Disclosure::from_override(config.insecure_debug()),
            config.strictness(),
        );
        self.finish(rendered, || config.auth_methods())
    }

    /// Build against an explicit configuration snapshot.
    ///
    /// # Panics
    ///
    /// Panics on a template/parameter mismatch only when the snapshot's
    /// strictness is [`Strictness::Fatal`](crate::Strictness::Fatal).
    pub fn build_with(self, snapshot: &Snapshot) -> ApiError {
        let rendered = message::build_reporting(
            self.kind,
            self.message.as_ref(),
            &self.params,
            snapshot.disclosure,
            snapshot.strictness,
        );
        self.finish(rendered, || Arc::clone(&snapshot.auth_methods))
    }

    /// Build against `snapshot`, failing on a template/parameter mismatch.
    ///
    /// # Errors
    ///
    /// [`FormatError::MissingParams`] when the selected template names a
    /// parameter that was not supplied.
    pub fn try_build_with(self, snapshot: &Snapshot) -> Result<ApiError, FormatError> {
        let rendered = message::try_render(
            self.kind,
            self.message.as_ref(),
            &self.params,
            snapshot.disclosure,
        )?;
        Ok(self.finish(rendered, || Arc::clone(&snapshot.auth_methods)))
    }

    fn finish(
        mut self,
        rendered: Rendered,
        auth_methods: impl FnOnce() -> Arc<[String]>,
    ) -> ApiError {
        let shape = self.kind.spec().payload;
        let payload = AuthPayload::for_shape(shape, auth_methods, self.continuation.take());
        ApiError::from_parts(self.kind, rendered.text, rendered.disclosed, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::DISCLAIMER;
    use serde_json::json;

    #[test]
    fn build_with_uses_snapshot_disclosure() {
        let redacted = ErrorBuilder::new(ErrorKind::Unexpected)
            .message("disk read failed at sector 9")
            .build_with(&Snapshot::redacted());
        assert!(!redacted.message().contains("sector"));
        assert!(!redacted.is_disclosed());

        let revealed = ErrorBuilder::new(ErrorKind::Unexpected)
            .message("disk read failed at sector 9")
            .build_with(&Snapshot::revealing());
        assert_eq!(
            revealed.message(),
            format!("disk read failed at sector 9 {}", DISCLAIMER)
        );
        assert!(revealed.is_disclosed());
    }

    #[test]
    fn auth_methods_come_from_snapshot() {
        let snapshot = Snapshot::redacted().with_auth_methods(["password", "totp"]);
        let err = ErrorBuilder::new(ErrorKind::AuthMethodNotSupported).build_with(&snapshot);
        let methods = err.side_payload().and_then(AuthPayload::methods).unwrap();
        assert_eq!(methods, ["password".to_string(), "totp".to_string()]);
    }

    #[test]
    fn continuation_is_attached_to_its_kind_only() {
        let blob = json!({"methods": ["totp"]});
        let err = ErrorBuilder::new(ErrorKind::AdditionalAuthRequired)
            .continuation(blob.clone())
            .build_with(&Snapshot::redacted());
        assert_eq!(err.side_payload(), Some(&AuthPayload::Continuation(blob.clone())));

        let err = ErrorBuilder::new(ErrorKind::Unauthorized)
            .continuation(blob)
            .build_with(&Snapshot::redacted());
        assert!(err.side_payload().is_none());
    }

    #[test]
    fn try_build_with_reports_mismatch() {
        let result = ErrorBuilder::new(ErrorKind::Conflict)
            .param("type", "user")
            .try_build_with(&Snapshot::redacted());
        assert!(matches!(result, Err(FormatError::MissingParams { .. })));

        let err = ErrorBuilder::new(ErrorKind::Conflict)
            .param("type", "user")
            .param("details", "duplicate name")
            .try_build_with(&Snapshot::redacted())
            .unwrap();
        assert_eq!(
            err.message(),
            "Conflict occurred attempting to store user - duplicate name"
        );
    }

    #[test]
    fn try_build_with_flags_disclosure() {
        let err = ErrorBuilder::new(ErrorKind::Forbidden)
            .message("policy rule admin_required failed")
            .try_build_with(&Snapshot::revealing())
            .unwrap();
        assert!(err.is_disclosed());
    }

    #[test]
    fn failure_message_is_never_rendered() {
        let err = ErrorBuilder::new(ErrorKind::Unauthorized)
            .failure(std::io::Error::other("ldap://10.0.0.1 unreachable"))
            .build_with(&Snapshot::revealing());
        assert_eq!(err.message(), "The request you have made requires authentication.");
    }

    #[test]
    fn build_reads_methods_from_process_config() {
        let err = ErrorBuilder::new(ErrorKind::AuthMethodNotSupported).build();
        let methods = err.side_payload().and_then(AuthPayload::methods).unwrap();
        assert_eq!(methods, &*config::global().auth_methods());

        let plain = ErrorBuilder::new(ErrorKind::Gone).build();
        assert!(plain.side_payload().is_none());
    }
}
