//! Structured side payload for authentication-plugin errors.
//!
//! The payload tells the caller how to proceed (which methods are
//! acceptable, or the next step of a multi-step login). It is plain data and
//! travels next to the message, never inside it.

use crate::codes::PayloadShape;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Authentication hint attached to a subset of 401 kinds.
///
/// Serializes as the `identity` member of the error body:
///
/// | Variant | JSON |
/// |---------|------|
/// | `Empty` | `{}` |
/// | `Methods` | `{"methods": ["password", ...]}` |
/// | `Continuation` | the opaque blob, as supplied |
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AuthPayload {
    /// Plugin failure with nothing further to say.
    Empty(EmptyMap),
    /// Methods the deployment accepts.
    Methods {
        /// Method names, in configured order.
        methods: Arc<[String]>,
    },
    /// Opaque next-step data produced by the plugin.
    Continuation(Value),
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmptyMap {}

impl AuthPayload {
    /// Payload for `shape`, or `None` for kinds without one.
    ///
    /// A continuation kind built without a blob carries `null`. The method
    /// list is fetched only for the kind that lists methods.
    pub(crate) fn for_shape(
        shape: PayloadShape,
        auth_methods: impl FnOnce() -> Arc<[String]>,
        continuation: Option<Value>,
    ) -> Option<Self> {
        match shape {
            PayloadShape::None => None,
            PayloadShape::AuthPlugin => Some(Self::Empty(EmptyMap {})),
            PayloadShape::AuthMethods => Some(Self::Methods {
                methods: auth_methods(),
            }),
            PayloadShape::Continuation => {
                Some(Self::Continuation(continuation.unwrap_or(Value::Null)))
            }
        }
    }

    /// Acceptable methods, when this payload lists them.
    pub fn methods(&self) -> Option<&[String]> {
        match self {
            Self::Methods { methods } => Some(methods),
            Self::Empty(_) | Self::Continuation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn methods() -> Arc<[String]> {
        vec!["password".to_string(), "token".to_string()].into()
    }

    #[test]
    fn shapes_serialize_to_expected_json() {
        let empty = AuthPayload::for_shape(PayloadShape::AuthPlugin, methods, None).unwrap();
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));

        let listed = AuthPayload::for_shape(PayloadShape::AuthMethods, methods, None).unwrap();
        assert_eq!(
            serde_json::to_value(&listed).unwrap(),
            json!({"methods": ["password", "token"]})
        );
        assert_eq!(listed.methods().map(<[String]>::len), Some(2));

        let blob = json!({"methods": ["totp"], "totp": {"step": 2}});
        let next =
            AuthPayload::for_shape(PayloadShape::Continuation, methods, Some(blob.clone()))
                .unwrap();
        assert_eq!(serde_json::to_value(&next).unwrap(), blob);
    }

    #[test]
    fn kinds_without_payload_get_none() {
        assert!(AuthPayload::for_shape(PayloadShape::None, methods, Some(json!(1))).is_none());
    }

    #[test]
    fn missing_continuation_is_null() {
        let next = AuthPayload::for_shape(PayloadShape::Continuation, methods, None).unwrap();
        assert_eq!(next, AuthPayload::Continuation(Value::Null));
    }

    #[test]
    fn methods_are_fetched_only_when_listed() {
        let none = AuthPayload::for_shape(PayloadShape::None, || unreachable!(), None);
        assert!(none.is_none());
        let empty = AuthPayload::for_shape(PayloadShape::AuthPlugin, || unreachable!(), None);
        assert_eq!(empty, Some(AuthPayload::Empty(EmptyMap {})));
    }
}
