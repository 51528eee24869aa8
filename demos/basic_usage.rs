use iam_errors::{api_error_with, ApiError, ErrorKind, Result, Snapshot};

fn find_user(snapshot: &Snapshot, user_id: &str) -> Result<String> {
    if user_id == "admin" {
        return Ok("Administrator".to_string());
    }
    Err(ApiError::builder(ErrorKind::UserNotFound)
        .param("user_id", user_id.to_string())
        .build_with(snapshot))
}

fn main() {
    let snapshot = Snapshot::redacted();

    println!("--- Basic Usage Example ---\n");

    match find_user(&snapshot, "3f2a9c") {
        Ok(name) => println!("Found {}", name),
        Err(err) => {
            // What the client receives.
            println!("1. [CLIENT] {} {}: {}", err.status_code(), err.title(), err);

            // What the operator logs.
            println!("2. [LOG]    {}", err.internal_log());
        }
    }

    // The kind hierarchy lets handlers match on a family.
    let err = api_error_with!(&snapshot, ProjectNotFound, project_id = "p-1");
    println!("\n3. [FAMILY] is_a(NotFound) = {}", err.is_a(ErrorKind::NotFound));

    // A secure kind discards the detail it was given.
    let err = ApiError::builder(ErrorKind::Unexpected)
        .message("connection to db-7 refused")
        .build_with(&snapshot);
    println!("4. [SECURE] {}", err);
}
