//! Turning handler failures into JSON bodies.
//!
//! Run with: cargo run --example response_boundary

use iam_errors::{ApiError, ErrorKind, ErrorResponse, Failure, InternalError, Snapshot};
use serde_json::json;

fn authenticate(method: &str, snapshot: &Snapshot) -> Result<(), Failure> {
    match method {
        "password" => Ok(()),
        "totp" => Err(ApiError::builder(ErrorKind::AdditionalAuthRequired)
            .continuation(json!({"receipt": "r-81", "required": [["password", "totp"]]}))
            .build_with(snapshot)
            .into()),
        "kerberos" => Err(ApiError::builder(ErrorKind::AuthMethodNotSupported)
            .build_with(snapshot)
            .into()),
        _ => {
            let reason = format!("no plugin registered for {}", method);
            Err(InternalError::Configuration(reason).into())
        }
    }
}

fn main() -> Result<(), serde_json::Error> {
    tracing_subscriber::fmt().init();

    let snapshot = Snapshot::redacted().with_auth_methods(["password", "token"]);

    for method in ["password", "totp", "kerberos", "saml"] {
        match authenticate(method, &snapshot) {
            Ok(()) => println!("{:<9} 200", method),
            Err(failure) => {
                let response = ErrorResponse::from_failure_with(failure, &snapshot);
                println!("{:<9} {} {}", method, response.status(), response.to_json()?);
            }
        }
    }

    Ok(())
}
