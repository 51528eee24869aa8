//! Terse construction macros.
//!
//! ```rust
//! use iam_errors::{api_error, api_error_with, Snapshot};
//!
//! let err = api_error_with!(&Snapshot::redacted(), UserNotFound, user_id = "42");
//! assert_eq!(err.message(), "Could not find user: 42");
//!
//! // Against the process-wide configuration:
//! let err = api_error!(Gone);
//! assert_eq!(err.status_code(), 410);
//! ```

// ============================================================================
// Error Creation Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __api_error_builder {
    ($kind:ident, message = $msg:expr $(, $name:ident = $value:expr)* $(,)?) => {
        $crate::ErrorBuilder::new($crate::ErrorKind::$kind)
            .message($msg)
            $(.param(stringify!($name), $value))*
    };
    ($kind:ident $(, $name:ident = $value:expr)* $(,)?) => {
        $crate::ErrorBuilder::new($crate::ErrorKind::$kind)
            $(.param(stringify!($name), $value))*
    };
}

/// Build an [`ApiError`](crate::ApiError) against the process-wide
/// configuration.
///
/// # Arguments
/// - `$kind`: an [`ErrorKind`](crate::ErrorKind) variant name
/// - `message = ...`: optional explicit message (must come first)
/// - `name = value`: named parameters
///
/// # Example
///
/// ```rust
/// # use iam_errors::api_error;
/// let err = api_error!(Conflict, type = "project", details = "name already taken");
/// assert_eq!(err.status_code(), 409);
/// ```
#[macro_export]
macro_rules! api_error {
    ($($args:tt)+) => {
        $crate::__api_error_builder!($($args)+).build()
    };
}

/// Build an [`ApiError`](crate::ApiError) against an explicit
/// [`Snapshot`](crate::Snapshot).
///
/// # Example
///
/// ```rust
/// # use iam_errors::{api_error_with, Snapshot, DISCLAIMER};
/// let snapshot = Snapshot::revealing();
/// let err = api_error_with!(&snapshot, Forbidden, message = "rule admin_only failed");
/// assert!(err.message().ends_with(DISCLAIMER));
/// ```
#[macro_export]
macro_rules! api_error_with {
    ($snapshot:expr, $($args:tt)+) => {
        $crate::__api_error_builder!($($args)+).build_with($snapshot)
    };
}

#[cfg(test)]
mod tests {
    use crate::{ErrorKind, Snapshot};

    #[test]
    fn params_are_named_by_identifier() {
        let err = api_error_with!(
            &Snapshot::redacted(),
            FederatedProtocolNotFound,
            protocol_id = "saml2",
            idp_id = "acme",
        );
        assert_eq!(err.kind(), ErrorKind::FederatedProtocolNotFound);
        assert_eq!(
            err.message(),
            "Could not find federated protocol saml2 for Identity Provider: acme"
        );
    }

    #[test]
    fn message_arm_sets_explicit_text() {
        let err = api_error_with!(
            &Snapshot::redacted(),
            Validation,
            message = "Invalid {field}",
            field = "email"
        );
        assert_eq!(err.message(), "Invalid email");
    }

    #[test]
    fn keyword_names_are_accepted() {
        let err = api_error_with!(
            &Snapshot::redacted(),
            Conflict,
            type = "user",
            details = "duplicate"
        );
        assert_eq!(err.message(), "Conflict occurred attempting to store user - duplicate");
    }

    #[test]
    fn integer_params() {
        let err = api_error_with!(&Snapshot::redacted(), PasswordVerification, size = 128u32);
        assert!(err.message().contains("less than or equal to 128."));
    }
}
