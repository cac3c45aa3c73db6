//! Integration tests for parsing Crowd payloads.
//!
//! These tests validate that the crowd-auth models read the responses a Crowd
//! server actually returns, including the fields the models ignore.

use crowd_auth::{FailureReason, RemoteErrorInfo, UserProfile};
use reqwest::StatusCode;
use std::fs;
use std::path::PathBuf;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> Vec<u8> {
    let fixture_path = fixtures_dir().join(name);
    fs::read(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

#[test]
fn test_full_user_payload() {
    let profile = UserProfile::from_slice(&load_fixture("crowd_user.json"))
        .expect("Crowd user payload should parse");

    assert_eq!(profile.username.as_deref(), Some("fredstone"));
    assert_eq!(profile.first_name.as_deref(), Some("Fred"));
    assert_eq!(profile.last_name.as_deref(), Some("Stone"));
    assert_eq!(profile.display_name.as_deref(), Some("Fred Stone"));
    assert_eq!(profile.email.as_deref(), Some("f@x.com"));
}

#[test]
fn test_minimal_user_payload() {
    let profile = UserProfile::from_slice(&load_fixture("crowd_user_minimal.json")).unwrap();

    assert_eq!(profile.username.as_deref(), Some("svc-build"));
    assert_eq!(profile.display_name.as_deref(), Some("Build Service"));
    // Service accounts commonly carry no personal attributes
    assert!(profile.first_name.is_none());
    assert!(profile.last_name.is_none());
    assert!(profile.email.is_none());
}

#[test]
fn test_invalid_authentication_payload() {
    let info = RemoteErrorInfo::parse(
        StatusCode::BAD_REQUEST,
        &load_fixture("crowd_auth_failure.json"),
    )
    .expect("400 payload should carry reason and message");

    assert_eq!(info.status, 400);
    assert_eq!(info.failure_reason(), FailureReason::InvalidUserAuthentication);
    assert_eq!(
        info.message,
        "Failed to authenticate principal, password was invalid"
    );
}

#[test]
fn test_inactive_account_payload() {
    let info = RemoteErrorInfo::parse(
        StatusCode::BAD_REQUEST,
        &load_fixture("crowd_inactive_account.json"),
    )
    .unwrap();

    assert_eq!(info.failure_reason(), FailureReason::InactiveAccount);
    assert!(info.message.contains("fredstone"));
}

#[test]
fn test_error_payload_parses_as_blank_profile() {
    // An error body still parses as a (blank) profile object; callers must rely
    // on the status code rather than body shape to classify responses.
    let profile = UserProfile::from_slice(&load_fixture("crowd_auth_failure.json")).unwrap();
    assert_eq!(profile, UserProfile::default());
}
