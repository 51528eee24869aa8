//! The error kind catalogue for the identity service.
//!
//! # Taxonomy & Inheritance
//!
//! Every concrete failure the API can report is one [`ErrorKind`] variant.
//! Kinds form a strict single-parent tree. A kind declares only the
//! attributes it overrides; everything else is inherited from the nearest
//! ancestor that declares it.
//!
//! The tree is flattened exactly once, during constant evaluation, into a
//! static table of [`KindSpec`] values indexed by kind. Construction of an
//! error never walks the parent chain.
//!
//! # Roots
//!
//! | Root | Status | Disclosure |
//! |------|--------|------------|
//! | `Validation` (+ timestamp, expiration, size, region roots) | 400 | plain |
//! | `ForbiddenNotSecurity` | 403 | plain |
//! | `Unauthorized` | 401 | secure |
//! | `Forbidden` | 403 | secure |
//! | `NotFound` | 404 | plain |
//! | `Conflict` | 409 | plain |
//! | `Gone` | 410 | plain |
//! | `NotImplemented` | 501 | plain |
//! | `Unexpected` | 500 | secure |
//!
//! # Governance
//!
//! A root that fails to declare status, title, disclosure or family does
//! not compile: `resolve` panics during constant evaluation of the table.
//! Status codes outside 400-599 fail the same way through [`StatusCode::new`].

use crate::codes::{DisclosureMode, Family, KindSpec, PayloadShape, StatusCode};
use std::fmt;

// ============================================================================
// Kind Enumeration
// ============================================================================

macro_rules! error_kinds {
    ($( $(#[$meta:meta])* $name:ident ),+ $(,)?) => {
        /// One tag per concrete API error condition.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ErrorKind {
            $( $(#[$meta])* $name, )+
        }

        impl ErrorKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [ErrorKind] = &[ $( ErrorKind::$name, )+ ];

            /// Number of kinds in the catalogue.
            pub const COUNT: usize = Self::ALL.len();

            /// Stable identifier of the kind (its variant name).
            pub const fn name(self) -> &'static str {
                match self {
                    $( ErrorKind::$name => stringify!($name), )+
                }
            }
        }
    };
}

error_kinds! {
    // Validation (400)
    /// Required attribute missing or malformed.
    Validation,
    /// Endpoint URL is invalid.
    UrlValidation,
    /// Password rejected by policy.
    PasswordValidation,
    /// Password changed too recently.
    PasswordAgeValidation,
    /// Request body failed schema validation.
    SchemaValidation,
    /// String longer than its storage column.
    StringLengthExceeded,
    /// Tokenless auth could not find the issuer attribute.
    TokenlessAuthConfig,
    /// Timestamp not in the expected format.
    ValidationTimeStamp,
    /// Expiry lies in the past.
    ValidationExpiration,
    /// Request attribute too large.
    ValidationSize,
    /// Parent region would create a cycle.
    CircularRegionHierarchy,

    // Forbidden, not security sensitive (403)
    /// Refusal that reveals nothing sensitive.
    ForbiddenNotSecurity,
    /// Password too long to verify.
    PasswordVerification,
    /// Region still has endpoints.
    RegionDeletion,
    /// PKI certificates requested from a non-PKI deployment.
    PkiTokenExpected,

    // Unauthorized (401)
    /// Authentication required or rejected.
    Unauthorized,
    /// Password expired and must be reset by an administrator.
    PasswordExpired,
    /// Mapping yielded no valid groups.
    MissingGroups,
    /// User account disabled.
    UserDisabled,
    /// User account locked.
    AccountLocked,
    /// Authentication plugin failure.
    AuthPlugin,
    /// Authentication method not enabled.
    AuthMethodNotSupported,
    /// Further authentication steps are required.
    AdditionalAuthRequired,

    // Forbidden (403)
    /// Authorization refused.
    Forbidden,
    /// Named action refused.
    ForbiddenAction,
    /// Attempt to change an immutable attribute.
    ImmutableAttribute,
    /// Group membership spans identity backends.
    CrossBackendNotAllowed,
    /// Invalid entity mix for a policy association.
    InvalidPolicyAssociation,
    /// Invalid domain specific configuration.
    InvalidDomainConfig,
    /// Role cannot be implied.
    InvalidImpliedRole,
    /// Trust has no remaining uses.
    TrustUseLimitReached,

    // Not found (404)
    /// Identified resource is missing.
    NotFound,
    /// Endpoint missing.
    EndpointNotFound,
    /// Metadata missing (never user facing).
    MetadataNotFound,
    /// Policy missing.
    PolicyNotFound,
    /// Policy association missing.
    PolicyAssociationNotFound,
    /// Role missing.
    RoleNotFound,
    /// Implied role relation missing.
    ImpliedRoleNotFound,
    /// Role assignment missing.
    RoleAssignmentNotFound,
    /// Region missing.
    RegionNotFound,
    /// Service missing.
    ServiceNotFound,
    /// Domain missing.
    DomainNotFound,
    /// Project missing.
    ProjectNotFound,
    /// Parent project invalid.
    InvalidParentProject,
    /// Token missing.
    TokenNotFound,
    /// User missing.
    UserNotFound,
    /// Group missing.
    GroupNotFound,
    /// Mapping missing.
    MappingNotFound,
    /// Trust missing.
    TrustNotFound,
    /// Credential missing.
    CredentialNotFound,
    /// API version missing.
    VersionNotFound,
    /// Endpoint group missing.
    EndpointGroupNotFound,
    /// Identity provider missing.
    IdentityProviderNotFound,
    /// Service provider missing.
    ServiceProviderNotFound,
    /// Federation protocol missing.
    FederatedProtocolNotFound,
    /// Public identifier missing; remapped before leaving the service.
    PublicIdNotFound,
    /// Domain configuration option missing.
    DomainConfigNotFound,

    // Conflict / Gone / Not implemented
    /// Write conflicts with stored state.
    Conflict,
    /// Service permanently removed.
    Gone,
    /// Action not implemented.
    NotImplemented,

    // Unexpected (500)
    /// Unexpected internal failure.
    Unexpected,
    /// Trust lock could not be acquired.
    TrustConsumeMaximumAttempt,
    /// Signing certificates unavailable.
    CertificateFilesUnavailable,
    /// Endpoint URL could not be formatted.
    MalformedEndpoint,
    /// Mapped group absent from the backend.
    MappedGroupNotFound,
    /// Federation metadata file unreadable.
    MetadataFileError,
    /// Mapping local section refers to a missing remote match.
    DirectMapping,
    /// Grant attributes form an impossible combination.
    AssignmentTypeCalculation,
    /// Configuration file missing.
    ConfigFileNotFound,
    /// Encryption key repository empty.
    KeysNotFound,
    /// Domain configuration names several SQL drivers.
    MultipleSqlDriversInConfig,
    /// Token version unrecognized.
    UnsupportedTokenVersion,
    /// SAML assertion could not be signed.
    SamlSigning,
    /// OAuth call made without authorization headers.
    OAuthHeadersMissing,
    /// Driver version not supported.
    UnsupportedDriverVersion,
}

// ============================================================================
// Declarations
// ============================================================================

/// Attributes a single kind declares. `None` means "inherit".
#[derive(Clone, Copy)]
struct KindDecl {
    parent: Option<ErrorKind>,
    status: Option<u16>,
    title: Option<&'static str>,
    message: Option<&'static str>,
    debug: Option<&'static str>,
    disclosure: Option<DisclosureMode>,
    family: Option<Family>,
    defaults: Option<&'static [(&'static str, &'static str)]>,
    payload: Option<PayloadShape>,
}

const fn root(
    family: Family,
    status: u16,
    title: &'static str,
    disclosure: DisclosureMode,
) -> KindDecl {
    KindDecl {
        parent: None,
        status: Some(status),
        title: Some(title),
        message: None,
        debug: None,
        disclosure: Some(disclosure),
        family: Some(family),
        defaults: Some(&[]),
        payload: Some(PayloadShape::None),
    }
}

const fn under(parent: ErrorKind) -> KindDecl {
    KindDecl {
        parent: Some(parent),
        status: None,
        title: None,
        message: None,
        debug: None,
        disclosure: None,
        family: None,
        defaults: None,
        payload: None,
    }
}

impl KindDecl {
    const fn message(mut self, template: &'static str) -> Self {
        self.message = Some(template);
        self
    }

    const fn debug(mut self, template: &'static str) -> Self {
        self.debug = Some(template);
        self
    }

    const fn defaults(mut self, defaults: &'static [(&'static str, &'static str)]) -> Self {
        self.defaults = Some(defaults);
        self
    }

    const fn payload(mut self, payload: PayloadShape) -> Self {
        self.payload = Some(payload);
        self
    }
}

const fn decl(kind: ErrorKind) -> KindDecl {
    use DisclosureMode::{Plain, Secure};
    use ErrorKind::*;

    match kind {
        // --------------------------------------------------------------------
        // Validation
        // --------------------------------------------------------------------
        Validation => root(Family::Validation, 400, "Bad Request", Plain).message(
            "Expecting to find {attribute} in {target} - the server could not comply with \
             the request since it is either malformed or otherwise incorrect. The client is \
             assumed to be in error.",
        ),
        UrlValidation => {
            under(Validation).message("Cannot create an endpoint with an invalid URL: {url}")
        }
        PasswordValidation => under(Validation).message("Password validation error: {detail}"),
        PasswordAgeValidation => under(PasswordValidation).message(
            "You cannot change your password at this time due to the minimum password age. \
             Once you change your password, it must be used for {min_age_days} day(s) before \
             it can be changed. Please try again in {days_left} day(s) or contact your \
             administrator to reset your password.",
        ),
        SchemaValidation => under(Validation).message("{detail}"),
        StringLengthExceeded => under(Validation).message(
            "String length exceeded. The length of string '{string}' exceeded the limit of \
             column {type}(CHAR({length})).",
        ),
        TokenlessAuthConfig => under(Validation).message(
            "Could not determine Identity Provider ID. The configuration option \
             {issuer_attribute} was not found in the request environment.",
        ),
        ValidationTimeStamp => root(Family::Validation, 400, "Bad Request", Plain).message(
            "Timestamp not in expected format. The server could not comply with the request \
             since it is either malformed or otherwise incorrect. The client is assumed to be \
             in error.",
        ),
        ValidationExpiration => root(Family::Validation, 400, "Bad Request", Plain).message(
            "The 'expires_at' must not be before now. The server could not comply with the \
             request since it is either malformed or otherwise incorrect. The client is \
             assumed to be in error.",
        ),
        ValidationSize => root(Family::Validation, 400, "Bad Request", Plain).message(
            "Request attribute {attribute} must be less than or equal to {size}. The server \
             could not comply with the request because the attribute size is invalid (too \
             large). The client is assumed to be in error.",
        ),
        CircularRegionHierarchy => root(Family::Validation, 400, "Bad Request", Plain).message(
            "The specified parent region {parent_region_id} would create a circular region \
             hierarchy.",
        ),

        // --------------------------------------------------------------------
        // Forbidden, not security sensitive
        // --------------------------------------------------------------------
        ForbiddenNotSecurity => root(Family::ForbiddenNotSecurity, 403, "Forbidden", Plain),
        PasswordVerification => under(ForbiddenNotSecurity).message(
            "The password length must be less than or equal to {size}. The server could not \
             comply with the request because the password is invalid.",
        ),
        RegionDeletion => under(ForbiddenNotSecurity).message(
            "Unable to delete region {region_id} because it or its child regions have \
             associated endpoints.",
        ),
        PkiTokenExpected => under(ForbiddenNotSecurity).message(
            "The certificates you requested are not available. It is likely that this server \
             does not use PKI tokens otherwise this is the result of misconfiguration.",
        ),

        // --------------------------------------------------------------------
        // Unauthorized
        // --------------------------------------------------------------------
        Unauthorized => root(Family::Unauthorized, 401, "Unauthorized", Secure)
            .message("The request you have made requires authentication."),
        PasswordExpired => under(Unauthorized).message(
            "The password is expired and needs to be reset by an administrator for user: \
             {user_id}",
        ),
        MissingGroups => under(Unauthorized)
            .message("Unable to find valid groups while using mapping {mapping_id}"),
        UserDisabled => under(Unauthorized).message("The account is disabled for user: {user_id}"),
        AccountLocked => under(Unauthorized).message("The account is locked for user: {user_id}"),
        AuthPlugin => under(Unauthorized)
            .message("Authentication plugin error.")
            .payload(PayloadShape::AuthPlugin),
        AuthMethodNotSupported => under(AuthPlugin)
            .message("Attempted to authenticate with an unsupported method.")
            .payload(PayloadShape::AuthMethods),
        AdditionalAuthRequired => under(AuthPlugin)
            .message("Additional authentications steps required.")
            .payload(PayloadShape::Continuation),

        // --------------------------------------------------------------------
        // Forbidden
        // --------------------------------------------------------------------
        Forbidden => root(Family::Forbidden, 403, "Forbidden", Secure)
            .message("You are not authorized to perform the requested action."),
        ForbiddenAction => under(Forbidden)
            .message("You are not authorized to perform the requested action: {action}"),
        ImmutableAttribute => under(Forbidden)
            .message("Could not change immutable attribute(s) '{attributes}' in target {target}"),
        CrossBackendNotAllowed => under(Forbidden).message(
            "Group membership across backend boundaries is not allowed, group in question is \
             {group_id}, user is {user_id}",
        ),
        InvalidPolicyAssociation => under(Forbidden).message(
            "Invalid mix of entities for policy association - only Endpoint, Service or \
             Region+Service allowed. Request was - Endpoint: {endpoint_id}, Service: \
             {service_id}, Region: {region_id}",
        ),
        InvalidDomainConfig => {
            under(Forbidden).message("Invalid domain specific configuration: {reason}")
        }
        InvalidImpliedRole => under(Forbidden).message("{role_id} cannot be an implied roles"),
        TrustUseLimitReached => under(Forbidden).message("No remaining uses for trust: {trust_id}"),

        // --------------------------------------------------------------------
        // Not found
        // --------------------------------------------------------------------
        NotFound => {
            root(Family::NotFound, 404, "Not Found", Plain).message("Could not find: {target}")
        }
        EndpointNotFound => under(NotFound).message("Could not find endpoint: {endpoint_id}"),
        MetadataNotFound => under(NotFound)
            .message("An unhandled exception has occurred: Could not find metadata."),
        PolicyNotFound => under(NotFound).message("Could not find policy: {policy_id}"),
        PolicyAssociationNotFound => under(NotFound).message("Could not find policy association"),
        RoleNotFound => under(NotFound).message("Could not find role: {role_id}"),
        ImpliedRoleNotFound => {
            under(NotFound).message("{prior_role_id} does not imply {implied_role_id}")
        }
        RoleAssignmentNotFound => under(NotFound).message(
            "Could not find role assignment with role: {role_id}, user or group: {actor_id}, \
             project or domain: {target_id}",
        ),
        RegionNotFound => under(NotFound).message("Could not find region: {region_id}"),
        ServiceNotFound => under(NotFound).message("Could not find service: {service_id}"),
        DomainNotFound => under(NotFound).message("Could not find domain: {domain_id}"),
        ProjectNotFound => under(NotFound).message("Could not find project: {project_id}"),
        InvalidParentProject => {
            under(NotFound).message("Cannot create project with parent: {project_id}")
        }
        TokenNotFound => under(NotFound).message("Could not find token: {token_id}"),
        UserNotFound => under(NotFound).message("Could not find user: {user_id}"),
        GroupNotFound => under(NotFound).message("Could not find group: {group_id}"),
        MappingNotFound => under(NotFound).message("Could not find mapping: {mapping_id}"),
        TrustNotFound => under(NotFound).message("Could not find trust: {trust_id}"),
        CredentialNotFound => under(NotFound).message("Could not find credential: {credential_id}"),
        VersionNotFound => under(NotFound).message("Could not find version: {version}"),
        EndpointGroupNotFound => {
            under(NotFound).message("Could not find Endpoint Group: {endpoint_group_id}")
        }
        IdentityProviderNotFound => {
            under(NotFound).message("Could not find Identity Provider: {idp_id}")
        }
        ServiceProviderNotFound => {
            under(NotFound).message("Could not find Service Provider: {sp_id}")
        }
        FederatedProtocolNotFound => under(NotFound).message(
            "Could not find federated protocol {protocol_id} for Identity Provider: {idp_id}",
        ),
        PublicIdNotFound => under(NotFound).message("{id}"),
        DomainConfigNotFound => under(NotFound).message(
            "Could not find {group_or_option} in domain configuration for domain {domain_id}",
        ),

        // --------------------------------------------------------------------
        // Conflict / Gone / Not implemented
        // --------------------------------------------------------------------
        Conflict => root(Family::Conflict, 409, "Conflict", Plain)
            .message("Conflict occurred attempting to store {type} - {details}"),
        Gone => root(Family::Gone, 410, "Gone", Plain)
            .message("The service you have requested is no longer available on this server."),
        NotImplemented => root(Family::NotImplemented, 501, "Not Implemented", Plain)
            .message("The action you have requested has not been implemented."),

        // --------------------------------------------------------------------
        // Unexpected
        // --------------------------------------------------------------------
        Unexpected => root(Family::Unexpected, 500, "Internal Server Error", Secure)
            .message("An unexpected error prevented the server from fulfilling your request.")
            .debug(
                "An unexpected error prevented the server from fulfilling your request: \
                 {exception}",
            )
            .defaults(&[("exception", "")]),
        TrustConsumeMaximumAttempt => under(Unexpected)
            .debug("Unable to consume trust {trust_id}, unable to acquire lock."),
        CertificateFilesUnavailable => under(Unexpected).debug(
            "Expected signing certificates are not available on the server. Please check \
             configuration.",
        ),
        MalformedEndpoint => under(Unexpected)
            .debug("Malformed endpoint URL ({endpoint}), see ERROR log for details."),
        MappedGroupNotFound => under(Unexpected).debug(
            "Group {group_id} returned by mapping {mapping_id} was not found in the backend.",
        ),
        MetadataFileError => {
            under(Unexpected).debug("Error while reading metadata file, {reason}")
        }
        DirectMapping => under(Unexpected).message(
            "Local section in mapping {mapping_id} refers to a remote match that doesn't \
             exist (e.g. {{0}} in a local section).",
        ),
        AssignmentTypeCalculation => under(Unexpected).debug(
            "Unexpected combination of grant attributes - User: {user_id}, Group: \
             {group_id}, Project: {project_id}, Domain: {domain_id}",
        ),
        ConfigFileNotFound => under(Unexpected)
            .debug("The configuration file {config_file} could not be found."),
        KeysNotFound => under(Unexpected).debug(
            "No encryption keys found; run the key repository setup command to bootstrap one.",
        ),
        MultipleSqlDriversInConfig => under(Unexpected).debug(
            "The domain-specific configuration has specified more than one SQL driver (only \
             one is permitted): {source}.",
        ),
        UnsupportedTokenVersion => {
            under(Unexpected).debug("Token version is unrecognizable or unsupported.")
        }
        SamlSigning => under(Unexpected).debug(
            "Unable to sign SAML assertion. It is likely that this server does not have \
             xmlsec1 installed, or this is the result of misconfiguration. Reason {reason}",
        ),
        OAuthHeadersMissing => under(Unexpected).debug(
            "No Authorization headers found, cannot proceed with OAuth related calls, if \
             running under HTTPd or Apache, ensure WSGIPassAuthorization is set to On.",
        ),
        UnsupportedDriverVersion => {
            under(Unexpected).debug("{driver} is not supported driver version")
        }
    }
}

// ============================================================================
// Resolution (Compile Time)
// ============================================================================

const fn resolve(kind: ErrorKind) -> KindSpec {
    let mut status = None;
    let mut title = None;
    let mut message = None;
    let mut debug = None;
    let mut disclosure = None;
    let mut family = None;
    let mut defaults = None;
    let mut payload = None;

    let mut cursor = Some(kind);
    while let Some(current) = cursor {
        let d = decl(current);
        if status.is_none() {
            status = d.status;
        }
        if title.is_none() {
            title = d.title;
        }
        if message.is_none() {
            message = d.message;
        }
        if debug.is_none() {
            debug = d.debug;
        }
        if disclosure.is_none() {
            disclosure = d.disclosure;
        }
        if family.is_none() {
            family = d.family;
        }
        if defaults.is_none() {
            defaults = d.defaults;
        }
        if payload.is_none() {
            payload = d.payload;
        }
        cursor = d.parent;
    }

    KindSpec {
        status: match status {
            Some(code) => StatusCode::new(code),
            None => panic!("error kind resolves without a status"),
        },
        title: match title {
            Some(title) => title,
            None => panic!("error kind resolves without a title"),
        },
        message_template: message,
        debug_template: debug,
        disclosure: match disclosure {
            Some(mode) => mode,
            None => panic!("error kind resolves without a disclosure mode"),
        },
        family: match family {
            Some(family) => family,
            None => panic!("error kind resolves without a family"),
        },
        defaults: match defaults {
            Some(defaults) => defaults,
            None => &[],
        },
        payload: match payload {
            Some(shape) => shape,
            None => PayloadShape::None,
        },
    }
}

static RESOLVED: [KindSpec; ErrorKind::COUNT] = {
    let mut table = [resolve(ErrorKind::ALL[0]); ErrorKind::COUNT];
    let mut i = 1;
    while i < ErrorKind::COUNT {
        table[i] = resolve(ErrorKind::ALL[i]);
        i += 1;
    }
    table
};

// ============================================================================
// Kind Accessors
// ============================================================================

impl ErrorKind {
    /// Resolved attributes of this kind.
    #[inline]
    pub fn spec(self) -> &'static KindSpec {
        &RESOLVED[self as usize]
    }

    /// Direct parent in the kind tree, `None` for roots.
    #[inline]
    pub const fn parent(self) -> Option<ErrorKind> {
        decl(self).parent
    }

    /// Ancestors from the direct parent up to the root.
    #[inline]
    pub fn ancestors(self) -> Ancestors {
        Ancestors {
            next: self.parent(),
        }
    }

    /// True if `self` is `other` or descends from it.
    ///
    /// ```rust
    /// # use iam_errors::ErrorKind;
    /// assert!(ErrorKind::UserNotFound.is_a(ErrorKind::NotFound));
    /// assert!(!ErrorKind::UserNotFound.is_a(ErrorKind::Forbidden));
    /// ```
    pub fn is_a(self, other: ErrorKind) -> bool {
        self == other || self.ancestors().any(|ancestor| ancestor == other)
    }

    /// Status code reported to the client.
    #[inline]
    pub fn status_code(self) -> StatusCode {
        self.spec().status
    }

    /// Fixed title ("Not Found").
    #[inline]
    pub fn title(self) -> &'static str {
        self.spec().title
    }

    /// Disclosure policy of the kind.
    #[inline]
    pub fn disclosure(self) -> DisclosureMode {
        self.spec().disclosure
    }

    /// Root family of the kind.
    #[inline]
    pub fn family(self) -> Family {
        self.spec().family
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Iterator over a kind's ancestors, nearest first.
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<ErrorKind>,
}

impl Iterator for Ancestors {
    type Item = ErrorKind;

    fn next(&mut self) -> Option<ErrorKind> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}
