//! Response boundary: where failures become client-facing error bodies.
//!
//! Two kinds of failure reach a request handler:
//!
//! - [`ApiError`]: already resolved; serialized as-is, never rebuilt
//! - [`InternalError`]: cross-module signals with no public status or title
//!
//! An internal failure reaching the boundary is a bug. It is logged at
//! `ERROR` with full detail and replaced by a generic
//! [`ErrorKind::Unexpected`] error. Its text reaches the client only while
//! `insecure_debug` is on, like any other secure-kind detail.
//!
//! # Wire Shape
//!
//! ```json
//! {"error": {"code": 401, "title": "Unauthorized",
//!            "message": "...", "identity": {"methods": ["password"]}}}
//! ```

use crate::builder::ErrorBuilder;
use crate::codes::StatusCode;
use crate::config::{self, Snapshot};
use crate::definitions::ErrorKind;
use crate::logging;
use crate::payload::AuthPayload;
use crate::ApiError;
use serde::Serialize;

// ============================================================================
// Internal-Only Failures
// ============================================================================

/// Failures used for signaling between subsystems. Never sent to clients.
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    /// A module registered no database migrations.
    #[error(
        "{module} doesn't provide database migrations. The migration repository path at \
         {path} doesn't exist or isn't a directory."
    )]
    MigrationNotProvided {
        /// Module name.
        module: String,
        /// Expected repository path.
        path: String,
    },

    /// A domain configuration option was not registered with the manager.
    #[error("domain configuration registration not found")]
    ConfigRegistrationNotFound,

    /// Configuration is invalid and the service must not start.
    #[error("invalid service configuration: {0}")]
    Configuration(String),

    /// Stored credentials could not be encrypted or decrypted.
    #[error("An unexpected error prevented the server from accessing encrypted credentials.")]
    CredentialEncryption,
}

/// Anything a handler may return.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    /// A resolved API error.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// An internal-only failure that escaped its subsystem.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Failure {
    /// Convert to a client-safe [`ApiError`], re-wrapping internal failures.
    pub fn into_api_error(self, snapshot: &Snapshot) -> ApiError {
        match self {
            Self::Api(err) => err,
            Self::Internal(internal) => rewrap(&internal, snapshot),
        }
    }
}

/// Replace an escaped internal failure with a generic 500.
///
/// The failure text is passed as the `exception` parameter of the
/// unexpected-error debug template.
pub fn rewrap(internal: &InternalError, snapshot: &Snapshot) -> ApiError {
    logging::internal_escape(internal);
    let err = ErrorBuilder::new(ErrorKind::Unexpected)
        .param("exception", internal.to_string())
        .build_with(snapshot);
    debug_assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    err
}

// ============================================================================
// Response Body
// ============================================================================

/// Serializable error body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    error: ErrorBody,
}

/// The `error` member of [`ErrorResponse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    /// Status code.
    pub code: u16,
    /// Fixed title.
    pub title: &'static str,
    /// Client-visible message.
    pub message: String,
    /// Authentication hint, when the kind carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<AuthPayload>,
}

impl ErrorResponse {
    /// Body for an already-resolved error. Reads fields only.
    pub fn from_error(err: &ApiError) -> Self {
        Self {
            error: ErrorBody {
                code: err.status_code(),
                title: err.title(),
                message: err.message().to_owned(),
                identity: err.side_payload().cloned(),
            },
        }
    }

    /// Body for any failure, against an explicit snapshot.
    pub fn from_failure_with(failure: Failure, snapshot: &Snapshot) -> Self {
        Self::from_error(&failure.into_api_error(snapshot))
    }

    /// Body for any failure, against the process-wide configuration.
    pub fn from_failure(failure: Failure) -> Self {
        let snapshot = config::global().snapshot();
        Self::from_failure_with(failure, &snapshot)
    }

    /// Status code for the transport.
    #[inline]
    pub fn status(&self) -> u16 {
        self.error.code
    }

    /// The inner body.
    #[inline]
    pub fn body(&self) -> &ErrorBody {
        &self.error
    }

    /// Serialize to a JSON string.
    ///
    /// # Errors
    ///
    /// Propagates `serde_json` failures.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self::from_error(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::DISCLAIMER;
    use serde_json::json;

    const GENERIC: &str = "An unexpected error prevented the server from fulfilling your request.";

    #[test]
    fn api_errors_serialize_verbatim() {
        let err = ApiError::builder(ErrorKind::UserNotFound)
            .param("user_id", "42")
            .build_with(&Snapshot::redacted());
        let response = ErrorResponse::from_failure_with(err.into(), &Snapshot::revealing());
        assert_eq!(response.status(), 404);
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"error": {
                "code": 404,
                "title": "Not Found",
                "message": "Could not find user: 42"
            }})
        );
    }

    #[test]
    fn payload_is_serialized_as_identity() {
        let snapshot = Snapshot::redacted().with_auth_methods(["password"]);
        let err = ApiError::builder(ErrorKind::AuthMethodNotSupported).build_with(&snapshot);
        let value = serde_json::to_value(ErrorResponse::from_error(&err)).unwrap();
        assert_eq!(value["error"]["identity"], json!({"methods": ["password"]}));
        assert_eq!(value["error"]["code"], json!(401));
    }

    #[test]
    fn internal_failures_become_generic_500() {
        let failure = Failure::from(InternalError::MigrationNotProvided {
            module: "federation".into(),
            path: "/srv/migrate_repo".into(),
        });
        let response = ErrorResponse::from_failure_with(failure, &Snapshot::redacted());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR.as_u16());
        assert_eq!(response.body().title, "Internal Server Error");
        assert_eq!(response.body().message, GENERIC);
        assert!(!response.to_json().unwrap().contains("migrate_repo"));
    }

    #[test]
    fn internal_detail_revealed_only_under_override() {
        let failure = Failure::from(InternalError::Configuration("no signing key".into()));
        let err = failure.into_api_error(&Snapshot::revealing());
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("invalid service configuration: no signing key"));
        assert!(err.message().ends_with(DISCLAIMER));
    }

    #[test]
    fn internal_error_messages() {
        let err = InternalError::MigrationNotProvided {
            module: "oauth1".into(),
            path: "/x".into(),
        };
        assert!(err.to_string().starts_with("oauth1 doesn't provide database migrations"));
        assert_eq!(
            InternalError::CredentialEncryption.to_string(),
            "An unexpected error prevented the server from accessing encrypted credentials."
        );
    }
}
