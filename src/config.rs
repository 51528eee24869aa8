//! Runtime knobs read by error construction.
//!
//! The configuration subsystem owns these values; this crate only reads
//! them. Every construction takes a fresh [`Snapshot`] so that toggling
//! `insecure_debug` takes effect on the next error without restarts.
//!
//! # File Format
//!
//! ```toml
//! insecure_debug = false
//!
//! [auth]
//! methods = ["password", "token"]
//! ```
//!
//! Missing keys take their defaults.

use crate::message::{Disclosure, Strictness};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, RwLock};

/// Authentication methods enabled when none are configured.
pub const DEFAULT_AUTH_METHODS: &[&str] = &[
    "external",
    "password",
    "token",
    "oauth1",
    "mapped",
    "application_credential",
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was requested.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid TOML for [`Settings`].
    #[error("failed to parse config: {reason}")]
    Parse {
        /// Parser detail.
        reason: String,
    },

    /// The content parsed but holds an unusable value.
    #[error("invalid config: {reason}")]
    Invalid {
        /// What was wrong.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Settings (file representation)
// ---------------------------------------------------------------------------

/// Declarative settings, as loaded from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Reveal secure-kind detail to clients. Never enable in production.
    pub insecure_debug: bool,
    /// Authentication section.
    pub auth: AuthSettings,
}

/// `[auth]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Acceptable authentication method names, in preference order.
    pub methods: Vec<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            methods: DEFAULT_AUTH_METHODS.iter().map(|m| (*m).to_owned()).collect(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            insecure_debug: false,
            auth: AuthSettings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML, [`ConfigError::Invalid`] on
    /// a blank auth method name.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings = toml::from_str::<Settings>(content).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(index) = self.auth.methods.iter().position(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                reason: format!("auth.methods[{}] is blank", index),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Live configuration
// ---------------------------------------------------------------------------

/// Live, process-wide configuration.
///
/// Scalar flags are atomics; the method list is swapped whole behind a
/// `RwLock`, so readers never observe a partial update.
#[derive(Debug)]
pub struct Config {
    insecure_debug: AtomicBool,
    fatal_format_errors: AtomicBool,
    auth_methods: RwLock<Arc<[String]>>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(Settings::default())
    }
}

impl Config {
    /// Build a live configuration from settings.
    pub fn from_settings(settings: Settings) -> Self {
        Self {
            insecure_debug: AtomicBool::new(settings.insecure_debug),
            fatal_format_errors: AtomicBool::new(false),
            auth_methods: RwLock::new(settings.auth.methods.into()),
        }
    }

    /// Parse TOML into a live configuration.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_toml_str`].
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Settings::from_toml_str(content).map(Self::from_settings)
    }

    /// Load a TOML file into a live configuration.
    ///
    /// # Errors
    ///
    /// See [`Settings::from_file`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Settings::from_file(path).map(Self::from_settings)
    }

    /// Replace the current values with `settings`. Strictness is untouched.
    pub fn apply(&self, settings: Settings) {
        self.set_insecure_debug(settings.insecure_debug);
        self.set_auth_methods(settings.auth.methods);
    }

    /// Toggle the disclosure override.
    pub fn set_insecure_debug(&self, enabled: bool) {
        let previous = self.insecure_debug.swap(enabled, Ordering::SeqCst);
        if enabled && !previous {
            tracing::warn!(
                target: "iam_errors::config",
                "insecure_debug enabled: secure error detail will be sent to clients"
            );
        }
    }

    /// Current disclosure override.
    #[inline]
    pub fn insecure_debug(&self) -> bool {
        self.insecure_debug.load(Ordering::SeqCst)
    }

    /// Choose what happens on a template/parameter mismatch.
    pub fn set_strictness(&self, strictness: Strictness) {
        self.fatal_format_errors
            .store(strictness == Strictness::Fatal, Ordering::SeqCst);
    }

    /// Current mismatch policy.
    #[inline]
    pub fn strictness(&self) -> Strictness {
        if self.fatal_format_errors.load(Ordering::SeqCst) {
            Strictness::Fatal
        } else {
            Strictness::Lenient
        }
    }

    /// Replace the acceptable authentication methods.
    pub fn set_auth_methods<I, S>(&self, methods: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let methods: Arc<[String]> = methods.into_iter().map(Into::into).collect();
        let mut guard = match self.auth_methods.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = methods;
    }

    /// Current acceptable authentication methods.
    pub fn auth_methods(&self) -> Arc<[String]> {
        let guard = match self.auth_methods.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&guard)
    }

    /// Capture every value needed for one construction.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            disclosure: Disclosure::from_override(self.insecure_debug()),
            strictness: self.strictness(),
            auth_methods: self.auth_methods(),
        }
    }
}

static GLOBAL: LazyLock<Config> = LazyLock::new(Config::default);

/// The process-wide configuration.
#[inline]
pub fn global() -> &'static Config {
    &GLOBAL
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Configuration values captured for a single construction.
///
/// Passing a snapshot explicitly keeps message building free of hidden
/// global reads; [`ErrorBuilder::build`](crate::ErrorBuilder::build) takes
/// one from [`global`] each time it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Disclosure override state.
    pub disclosure: Disclosure,
    /// Mismatch policy.
    pub strictness: Strictness,
    /// Acceptable authentication methods.
    pub auth_methods: Arc<[String]>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::redacted()
    }
}

impl Snapshot {
    /// Production defaults: override off, lenient, default methods.
    pub fn redacted() -> Self {
        Self {
            disclosure: Disclosure::Redacted,
            strictness: Strictness::Lenient,
            auth_methods: DEFAULT_AUTH_METHODS.iter().map(|m| (*m).to_owned()).collect(),
        }
    }

    /// As [`redacted`](Self::redacted) with the override on.
    pub fn revealing() -> Self {
        Self {
            disclosure: Disclosure::Revealed,
            ..Self::redacted()
        }
    }

    /// Replace the mismatch policy.
    #[must_use]
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Replace the acceptable authentication methods.
    #[must_use]
    pub fn with_auth_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.auth_methods = methods.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_production_safe() {
        let settings = Settings::default();
        assert!(!settings.insecure_debug);
        assert_eq!(settings.auth.methods.len(), DEFAULT_AUTH_METHODS.len());

        let snapshot = Config::default().snapshot();
        assert_eq!(snapshot.disclosure, Disclosure::Redacted);
        assert_eq!(snapshot.strictness, Strictness::Lenient);
        assert_eq!(snapshot, Snapshot::redacted());
    }

    #[test]
    fn parse_partial_toml() {
        let settings = Settings::from_toml_str("insecure_debug = true").unwrap();
        assert!(settings.insecure_debug);
        assert_eq!(settings.auth, AuthSettings::default());

        let settings = Settings::from_toml_str("[auth]\nmethods = [\"password\"]").unwrap();
        assert!(!settings.insecure_debug);
        assert_eq!(settings.auth.methods, vec!["password".to_string()]);
    }

    #[test]
    fn parse_errors_are_typed() {
        let err = Settings::from_toml_str("insecure_debug = \"yes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = Settings::from_toml_str("[auth]\nmethods = [\"token\", \" \"]").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(err.to_string().contains("auth.methods[1]"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "insecure_debug = true\n[auth]\nmethods = [\"totp\"]").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert!(config.insecure_debug());
        assert_eq!(&*config.auth_methods(), ["totp".to_string()].as_slice());
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.toml"));
    }

    #[test]
    fn snapshots_are_taken_fresh() {
        let config = Config::default();
        let before = config.snapshot();
        config.set_insecure_debug(true);
        config.set_strictness(Strictness::Fatal);
        config.set_auth_methods(["password"]);
        let after = config.snapshot();

        assert_eq!(before.disclosure, Disclosure::Redacted);
        assert_eq!(after.disclosure, Disclosure::Revealed);
        assert_eq!(after.strictness, Strictness::Fatal);
        assert_eq!(&*after.auth_methods, ["password".to_string()].as_slice());
        assert_eq!(before.auth_methods.len(), DEFAULT_AUTH_METHODS.len());
    }

    #[test]
    fn apply_keeps_strictness() {
        let config = Config::default();
        config.set_strictness(Strictness::Fatal);
        config.apply(Settings {
            insecure_debug: true,
            auth: AuthSettings {
                methods: vec!["token".into()],
            },
        });
        assert!(config.insecure_debug());
        assert_eq!(config.strictness(), Strictness::Fatal);
    }

    #[test]
    fn snapshot_builders() {
        let snapshot = Snapshot::revealing()
            .with_strictness(Strictness::Fatal)
            .with_auth_methods(vec![String::from("mapped")]);
        assert!(snapshot.disclosure.is_revealed());
        assert_eq!(snapshot.auth_methods.len(), 1);
    }
}
