use super::*;
use serde_json::json;

#[test]
fn credentials_serialize_with_camel_case_keys() {
    let value = serde_json::to_value(Credentials::new("alice", "pw")).unwrap();
    assert_eq!(
        value,
        json!({"provider": "credentials", "userName": "alice", "password": "pw", "rememberMe": true})
    );
}

#[test]
fn credentials_completeness_rejects_blank_fields() {
    assert!(Credentials::new("alice", "pw").is_complete());
    assert!(!Credentials::new("   ", "pw").is_complete());
    assert!(!Credentials::new("alice", "").is_complete());
}

#[test]
fn authenticate_response_flattens_claims() {
    let resp: AuthenticateResponse = serde_json::from_value(json!({
        "userId": "1",
        "userName": "alice",
        "displayName": "Alice A",
        "roles": ["Admin"],
        "bearerToken": "jwt",
        "refreshToken": "rt",
        "responseStatus": null
    }))
    .unwrap();
    assert_eq!(resp.claims.user_id, "1");
    assert_eq!(resp.claims.label(), "Alice A");
    assert!(resp.claims.has_role("Admin"));
    assert!(resp.claims.permissions.is_empty());
    assert_eq!(
        resp.session_token(),
        Some(SessionToken::Bearer { token: "jwt".to_owned(), refresh_token: Some("rt".to_owned()) })
    );
}

#[test]
fn session_token_falls_back_to_session_id() {
    let resp = AuthenticateResponse { session_id: Some("sid".to_owned()), ..Default::default() };
    assert_eq!(resp.session_token(), Some(SessionToken::Session { id: "sid".to_owned() }));
}

#[test]
fn session_token_absent_when_response_carries_none() {
    let resp = AuthenticateResponse { bearer_token: Some(String::new()), ..Default::default() };
    assert_eq!(resp.session_token(), None);
}

#[test]
fn session_token_headers() {
    let bearer = SessionToken::Bearer { token: "abc".to_owned(), refresh_token: None };
    assert_eq!(bearer.header(), ("Authorization", "Bearer abc".to_owned()));
    let session = SessionToken::Session { id: "sid".to_owned() };
    assert_eq!(session.header(), ("X-ss-id", "sid".to_owned()));
}

#[test]
fn session_token_debug_hides_secret() {
    let bearer = SessionToken::Bearer { token: "secret".to_owned(), refresh_token: None };
    assert!(!format!("{bearer:?}").contains("secret"));
}

#[test]
fn label_falls_back_to_user_name() {
    let claims = UserClaims { user_name: "bob".to_owned(), display_name: Some(String::new()), ..Default::default() };
    assert_eq!(claims.label(), "bob");
}

#[test]
fn stored_session_reads_entry_without_optional_fields() {
    let stored: StoredSession =
        serde_json::from_value(json!({"token": {"kind": "session", "id": "sid"}, "extra": true})).unwrap();
    assert_eq!(stored.version, STORED_SESSION_VERSION);
    assert_eq!(stored.token, SessionToken::Session { id: "sid".to_owned() });
    assert!(stored.claims.is_none());
}

#[test]
fn stored_session_field_order_is_stable() {
    let stored = StoredSession::new(SessionToken::Session { id: "sid".to_owned() }, None);
    let raw = serde_json::to_string(&stored).unwrap();
    assert_eq!(raw, r#"{"version":1,"token":{"kind":"session","id":"sid"},"claims":null}"#);
}
