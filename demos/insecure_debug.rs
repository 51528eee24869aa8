//! Toggle `insecure_debug` at runtime and watch secure kinds change.
//!
//! Run with: cargo run --example insecure_debug

use iam_errors::config::Config;
use iam_errors::{ApiError, ErrorKind};

const SETTINGS: &str = r#"
insecure_debug = false

[auth]
methods = ["password", "token"]
"#;

fn show(config: &Config, label: &str) {
    let err = ApiError::builder(ErrorKind::Forbidden)
        .message("rule identity:delete_user requires role admin")
        .build_with(&config.snapshot());
    println!("[{}] {} -> {}", label, err.status_code(), err);
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_target(true).init();

    let config = Config::from_toml_str(SETTINGS)?;
    show(&config, "production");

    // Emits a WARN record: detail will now leak to clients.
    config.set_insecure_debug(true);
    show(&config, "debugging ");

    config.set_insecure_debug(false);
    show(&config, "restored  ");

    // Missing parameters fall back to the raw template and warn.
    let err = ApiError::builder(ErrorKind::Validation)
        .param("attribute", "password")
        .build_with(&config.snapshot());
    println!("[fallback  ] {}", err);

    Ok(())
}
