//! Wire models for the Crowd user management API.

use crowd_core::Error;
use reqwest::StatusCode;
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Basic profile of a directory user.
///
/// Every attribute is optional; the directory may omit any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login name.
    #[serde(
        rename = "name",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_as_text"
    )]
    pub username: Option<String>,
    /// Given name.
    #[serde(
        rename = "first-name",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_as_text"
    )]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(
        rename = "last-name",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_as_text"
    )]
    pub last_name: Option<String>,
    /// Name shown in user interfaces.
    #[serde(
        rename = "display-name",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_as_text"
    )]
    pub display_name: Option<String>,
    /// Email address.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_as_text"
    )]
    pub email: Option<String>,
}

impl UserProfile {
    /// Parses a user payload returned by the directory.
    ///
    /// # Errors
    ///
    /// Fails when the body is empty, not JSON, or not a JSON object.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        match serde_json::from_slice::<Value>(body)? {
            object @ Value::Object(_) => serde_json::from_value(object),
            other => Err(de::Error::invalid_type(
                unexpected(&other),
                &"a JSON object",
            )),
        }
    }
}

/// Reads an attribute as text: strings as-is, numbers and booleans in their
/// JSON spelling, `null` as absent.
fn scalar_as_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(de::Error::invalid_type(
            unexpected(&other),
            &"a string, number or boolean",
        )),
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(flag) => Unexpected::Bool(*flag),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(text) => Unexpected::Str(text),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Password body for the authentication call: `{"value": "..."}`.
#[derive(Serialize)]
pub struct PasswordCredential<'a> {
    value: &'a str,
}

impl<'a> PasswordCredential<'a> {
    /// Wraps the end user's password.
    #[must_use]
    pub const fn new(value: &'a str) -> Self {
        Self { value }
    }
}

impl fmt::Debug for PasswordCredential<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordCredential")
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Structured rejection returned by the directory for a failed authentication.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteErrorInfo {
    /// HTTP status of the response.
    #[serde(skip)]
    pub status: u16,
    /// Directory reason code.
    pub reason: String,
    /// Human-readable message.
    pub message: String,
}

impl RemoteErrorInfo {
    /// Parses an error body, returning `None` unless both `reason` and
    /// `message` are present strings.
    #[must_use]
    pub fn parse(status: StatusCode, body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Self>(body)
            .ok()
            .map(|info| Self {
                status: status.as_u16(),
                ..info
            })
    }

    /// Typed view of the reason code.
    #[must_use]
    pub fn failure_reason(&self) -> FailureReason {
        FailureReason::from(self.reason.as_str())
    }
}

impl From<RemoteErrorInfo> for Error {
    fn from(info: RemoteErrorInfo) -> Self {
        Self::AuthenticationFailed {
            reason: info.reason,
            message: info.message,
        }
    }
}

/// Reason codes the directory reports when rejecting an authentication.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Wrong password or unknown user.
    InvalidUserAuthentication,
    /// The user does not exist.
    UserNotFound,
    /// The account is deactivated.
    InactiveAccount,
    /// The password has expired.
    ExpiredCredential,
    /// The credential was rejected as malformed.
    InvalidCredential,
    /// The user may not access the calling application.
    ApplicationAccessDenied,
    /// The application lacks permission for the operation.
    ApplicationPermissionDenied,
    /// The user record is invalid.
    InvalidUser,
    /// The directory could not complete the operation.
    OperationFailed,
    /// The request carried an illegal argument.
    IllegalArgument,
    /// A code not listed above.
    Other(String),
}

impl FailureReason {
    /// Returns the reason code as sent by the directory.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InvalidUserAuthentication => "INVALID_USER_AUTHENTICATION",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InactiveAccount => "INACTIVE_ACCOUNT",
            Self::ExpiredCredential => "EXPIRED_CREDENTIAL",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::ApplicationAccessDenied => "APPLICATION_ACCESS_DENIED",
            Self::ApplicationPermissionDenied => "APPLICATION_PERMISSION_DENIED",
            Self::InvalidUser => "INVALID_USER",
            Self::OperationFailed => "OPERATION_FAILED",
            Self::IllegalArgument => "ILLEGAL_ARGUMENT",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for FailureReason {
    fn from(code: &str) -> Self {
        match code {
            "INVALID_USER_AUTHENTICATION" => Self::InvalidUserAuthentication,
            "USER_NOT_FOUND" => Self::UserNotFound,
            "INACTIVE_ACCOUNT" => Self::InactiveAccount,
            "EXPIRED_CREDENTIAL" => Self::ExpiredCredential,
            "INVALID_CREDENTIAL" => Self::InvalidCredential,
            "APPLICATION_ACCESS_DENIED" => Self::ApplicationAccessDenied,
            "APPLICATION_PERMISSION_DENIED" => Self::ApplicationPermissionDenied,
            "INVALID_USER" => Self::InvalidUser,
            "OPERATION_FAILED" => Self::OperationFailed,
            "ILLEGAL_ARGUMENT" => Self::IllegalArgument,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_profile_maps_crowd_field_names() {
        let body = json!({
            "first-name": "Fred",
            "last-name": "Stone",
            "display-name": "Fred Stone",
            "email": "f@x.com",
            "name": "fredstone"
        })
        .to_string();

        let profile = UserProfile::from_slice(body.as_bytes()).unwrap();
        assert_eq!(
            profile,
            UserProfile {
                username: Some("fredstone".into()),
                first_name: Some("Fred".into()),
                last_name: Some("Stone".into()),
                display_name: Some("Fred Stone".into()),
                email: Some("f@x.com".into()),
            }
        );
    }

    #[test]
    fn user_profile_tolerates_missing_and_null_fields() {
        let profile =
            UserProfile::from_slice(br#"{"name":"fredstone","email":null,"active":true}"#)
                .unwrap();
        assert_eq!(profile.username.as_deref(), Some("fredstone"));
        assert!(profile.email.is_none());
        assert!(profile.first_name.is_none());
    }

    #[test]
    fn user_profile_coerces_scalar_attributes() {
        let profile = UserProfile::from_slice(
            br#"{"name":"fred","email":5,"first-name":true,"last-name":1.5}"#,
        )
        .unwrap();
        assert_eq!(profile.username.as_deref(), Some("fred"));
        assert_eq!(profile.email.as_deref(), Some("5"));
        assert_eq!(profile.first_name.as_deref(), Some("true"));
        assert_eq!(profile.last_name.as_deref(), Some("1.5"));
    }

    #[test]
    fn user_profile_rejects_nested_attributes() {
        assert!(UserProfile::from_slice(br#"{"name":"fred","email":["a@x.com"]}"#).is_err());
        assert!(UserProfile::from_slice(br#"{"name":{"first":"fred"}}"#).is_err());
    }

    #[test]
    fn user_profile_rejects_empty_and_garbage_bodies() {
        assert!(UserProfile::from_slice(b"").is_err());
        assert!(UserProfile::from_slice(b"   ").is_err());
        assert!(UserProfile::from_slice(b"<html>oops</html>").is_err());
        assert!(UserProfile::from_slice(b"null").is_err());
        assert!(UserProfile::from_slice(b"[]").is_err());
        assert!(UserProfile::from_slice(br#"["fred"]"#).is_err());
        assert!(UserProfile::from_slice(b"42").is_err());
    }

    #[test]
    fn user_profile_serializes_with_wire_names() {
        let profile = UserProfile {
            username: Some("fredstone".into()),
            display_name: Some("Fred Stone".into()),
            ..UserProfile::default()
        };
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value, json!({"name": "fredstone", "display-name": "Fred Stone"}));
    }

    #[test]
    fn password_credential_body_shape() {
        let body = serde_json::to_value(PasswordCredential::new("hunter2")).unwrap();
        assert_eq!(body, json!({"value": "hunter2"}));
        assert!(!format!("{:?}", PasswordCredential::new("hunter2")).contains("hunter2"));
    }

    #[test]
    fn remote_error_info_parses_reason_and_message() {
        let info = RemoteErrorInfo::parse(
            StatusCode::BAD_REQUEST,
            br#"{"reason":"INVALID_USER_AUTHENTICATION","message":"bad creds"}"#,
        )
        .unwrap();

        assert_eq!(info.status, 400);
        assert_eq!(info.reason, "INVALID_USER_AUTHENTICATION");
        assert_eq!(info.message, "bad creds");
        assert_eq!(info.failure_reason(), FailureReason::InvalidUserAuthentication);

        let err: Error = info.into();
        assert_eq!(
            err,
            Error::AuthenticationFailed {
                reason: "INVALID_USER_AUTHENTICATION".into(),
                message: "bad creds".into(),
            }
        );
    }

    #[test]
    fn remote_error_info_requires_both_fields() {
        assert!(RemoteErrorInfo::parse(StatusCode::BAD_REQUEST, br#"{"reason":"X"}"#).is_none());
        assert!(RemoteErrorInfo::parse(StatusCode::BAD_REQUEST, b"").is_none());
        assert!(RemoteErrorInfo::parse(StatusCode::BAD_REQUEST, b"bad request").is_none());
    }

    #[test]
    fn failure_reason_round_trips_codes() {
        for code in [
            "INVALID_USER_AUTHENTICATION",
            "USER_NOT_FOUND",
            "INACTIVE_ACCOUNT",
            "EXPIRED_CREDENTIAL",
            "APPLICATION_ACCESS_DENIED",
            "SOMETHING_NEW",
        ] {
            assert_eq!(FailureReason::from(code).as_str(), code);
        }
        assert_eq!(
            FailureReason::from("SOMETHING_NEW"),
            FailureReason::Other("SOMETHING_NEW".into())
        );
        assert_eq!(FailureReason::ExpiredCredential.to_string(), "EXPIRED_CREDENTIAL");
    }
}
