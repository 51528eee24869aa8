//! Message Builder and disclosure policy.
//!
//! Turns (kind, optional explicit message, named parameters, disclosure
//! override) into the final client-visible text. Policy is data driven:
//! the only branch on kind is its [`DisclosureMode`].
//!
//! # Rules
//!
//! | Mode | Override | Explicit text | Result |
//! |------|----------|---------------|--------|
//! | plain | any | present | explicit text, substituted if it has placeholders |
//! | plain | any | absent | kind template |
//! | secure | revealed | present | explicit text + disclaimer |
//! | secure | revealed | absent | debug template + disclaimer, else kind template |
//! | secure | redacted | any | kind template, explicit text discarded |
//!
//! # Totality
//!
//! [`build`] never fails. A template/parameter mismatch is a programmer
//! error: one warning is logged and the raw, unsubstituted template is used.
//! A kind with no template at all reports its title. [`try_build`] surfaces
//! the mismatch instead, and [`Strictness::Fatal`] turns it into a panic for
//! test runs.

use crate::codes::{DisclosureMode, KindSpec, PayloadShape};
use crate::definitions::ErrorKind;
use crate::params::{ExplicitMessage, Params};
use crate::logging;
use crate::template::{self, MissingParams, WithDefaults};
use std::fmt;

/// Suffix appended when secure-kind detail is revealed.
pub const DISCLAIMER: &str = "(Disable insecure_debug mode to suppress these details.)";

// ============================================================================
// Policy Inputs
// ============================================================================

/// State of the insecure-debug disclosure override at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Disclosure {
    /// Secure kinds render only their fixed template.
    #[default]
    Redacted,
    /// Secure kinds may render caller detail, followed by [`DISCLAIMER`].
    Revealed,
}

impl Disclosure {
    /// Map the boolean `insecure_debug` flag.
    #[inline]
    pub const fn from_override(insecure_debug: bool) -> Self {
        if insecure_debug {
            Self::Revealed
        } else {
            Self::Redacted
        }
    }

    /// True when detail may be revealed.
    #[inline]
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

/// What to do on a template/parameter mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strictness {
    /// Log one warning and fall back to the raw template.
    #[default]
    Lenient,
    /// Panic. Development and test runs only.
    Fatal,
}

// ============================================================================
// Format Error
// ============================================================================

/// A message could not be fully substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The template referenced names the parameters did not supply.
    MissingParams {
        /// Kind being constructed.
        kind: ErrorKind,
        /// Raw template that failed.
        template: String,
        /// Names that were missing.
        missing: MissingParams,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingParams { kind, missing, .. } => {
                write!(f, "missing message parameters for {}: {}", kind, missing)
            }
        }
    }
}

impl std::error::Error for FormatError {}

// ============================================================================
// Planning
// ============================================================================

/// Message produced for one construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rendered {
    pub(crate) text: String,
    pub(crate) disclosed: bool,
}

/// Which text to render and what to fall back to.
struct Plan<'a> {
    source: &'a str,
    substitute: bool,
    fallback: &'a str,
    disclose: bool,
}

fn fixed_template(spec: &'static KindSpec) -> &'static str {
    spec.message_template.unwrap_or(spec.title)
}

/// Caller-supplied message, as far as the policy is concerned.
enum Explicit<'a> {
    Absent,
    Text(&'a str),
    /// Present but not text; never rendered.
    Skipped,
}

fn explicit_text<'a>(kind: ErrorKind, explicit: Option<&'a ExplicitMessage>) -> Explicit<'a> {
    let Some(explicit) = explicit else {
        return Explicit::Absent;
    };
    if kind.spec().payload == PayloadShape::Continuation {
        return Explicit::Absent;
    }
    match explicit.as_text() {
        Some("") => Explicit::Absent,
        Some(text) => Explicit::Text(text),
        None => {
            logging::non_text_message_skipped(kind, explicit.variant_name());
            Explicit::Skipped
        }
    }
}

fn plan<'a>(
    kind: ErrorKind,
    explicit: Option<&'a ExplicitMessage>,
    disclosure: Disclosure,
) -> Plan<'a> {
    let spec = kind.spec();
    let fixed = fixed_template(spec);
    let template_plan = Plan {
        source: fixed,
        substitute: true,
        fallback: fixed,
        disclose: false,
    };

    match spec.disclosure {
        DisclosureMode::Plain => match explicit_text(kind, explicit) {
            Explicit::Text(text) => Plan {
                source: text,
                substitute: template::has_placeholders(text),
                fallback: text,
                disclose: false,
            },
            Explicit::Absent | Explicit::Skipped => template_plan,
        },
        DisclosureMode::Secure if disclosure.is_revealed() => {
            match explicit_text(kind, explicit) {
                Explicit::Text(text) => Plan {
                    source: text,
                    substitute: template::has_placeholders(text),
                    fallback: fixed,
                    disclose: true,
                },
                Explicit::Absent => match spec.debug_template {
                    Some(debug) => Plan {
                        source: debug,
                        substitute: true,
                        fallback: fixed,
                        disclose: true,
                    },
                    None => template_plan,
                },
                // Unusable detail: the fixed template, as if redacted.
                Explicit::Skipped => template_plan,
            }
        }
        // Explicit text is never inspected here.
        DisclosureMode::Secure => template_plan,
    }
}

fn execute(
    spec: &'static KindSpec,
    plan: &Plan<'_>,
    params: &Params,
) -> Result<Rendered, MissingParams> {
    let body = if plan.substitute {
        template::render(plan.source, &WithDefaults::new(params, spec.defaults))?
    } else {
        plan.source.to_owned()
    };

    if body.is_empty() {
        if plan.disclose {
            // Detail rendered to nothing: report the fixed template instead.
            let fixed = Plan {
                source: plan.fallback,
                substitute: true,
                fallback: plan.fallback,
                disclose: false,
            };
            return execute(spec, &fixed, params);
        }
        return Ok(Rendered {
            text: spec.title.to_owned(),
            disclosed: false,
        });
    }

    if plan.disclose {
        Ok(Rendered {
            text: format!("{} {}", body, DISCLAIMER),
            disclosed: true,
        })
    } else {
        Ok(Rendered {
            text: body,
            disclosed: false,
        })
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Build the final message for `kind`. Total: never fails, never panics.
///
/// # Example
///
/// ```rust
/// use iam_errors::{message, ErrorKind, ExplicitMessage, Params};
/// use iam_errors::message::Disclosure;
///
/// let params = Params::new().with("user_id", "42");
/// let text = message::build(ErrorKind::UserNotFound, None, &params, Disclosure::Redacted);
/// assert_eq!(text, "Could not find user: 42");
///
/// let secret = ExplicitMessage::from("disk read failed at sector 9");
/// let params = Params::new();
/// let text = message::build(ErrorKind::Unexpected, Some(&secret), &params, Disclosure::Redacted);
/// assert!(!text.contains("sector"));
/// ```
pub fn build(
    kind: ErrorKind,
    explicit: Option<&ExplicitMessage>,
    params: &Params,
    disclosure: Disclosure,
) -> String {
    build_reporting(kind, explicit, params, disclosure, Strictness::Lenient).text
}

/// Build the final message, reporting a template/parameter mismatch
/// instead of falling back.
///
/// # Errors
///
/// Returns [`FormatError::MissingParams`] when the selected template names
/// a parameter that `params` (and the kind's defaults) do not supply.
pub fn try_build(
    kind: ErrorKind,
    explicit: Option<&ExplicitMessage>,
    params: &Params,
    disclosure: Disclosure,
) -> Result<String, FormatError> {
    try_render(kind, explicit, params, disclosure).map(|rendered| rendered.text)
}

pub(crate) fn try_render(
    kind: ErrorKind,
    explicit: Option<&ExplicitMessage>,
    params: &Params,
    disclosure: Disclosure,
) -> Result<Rendered, FormatError> {
    let plan = plan(kind, explicit, disclosure);
    execute(kind.spec(), &plan, params).map_err(|missing| FormatError::MissingParams {
        kind,
        template: plan.source.to_owned(),
        missing,
    })
}

/// Build with fallback, honoring `strictness`.
///
/// # Panics
///
/// Panics on a mismatch when `strictness` is [`Strictness::Fatal`].
pub(crate) fn build_reporting(
    kind: ErrorKind,
    explicit: Option<&ExplicitMessage>,
    params: &Params,
    disclosure: Disclosure,
    strictness: Strictness,
) -> Rendered {
    let spec = kind.spec();
    let plan = plan(kind, explicit, disclosure);

    match execute(spec, &plan, params) {
        Ok(rendered) => rendered,
        Err(missing) => {
            if strictness == Strictness::Fatal {
                panic!("missing message parameters for {}: {}", kind, missing);
            }
            logging::format_mismatch(kind, plan.source, &missing);
            let text = if plan.fallback.is_empty() {
                spec.title.to_owned()
            } else {
                plan.fallback.to_owned()
            };
            Rendered {
                text,
                disclosed: false,
            }
        }
    }
}
