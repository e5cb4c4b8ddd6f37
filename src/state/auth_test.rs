use super::*;

fn claims(name: &str) -> UserClaims {
    UserClaims { user_id: format!("id-{name}"), user_name: name.to_owned(), roles: vec!["Admin".to_owned()], ..Default::default() }
}

// =============================================================
// Principal / AuthSnapshot
// =============================================================

#[test]
fn principal_default_is_anonymous() {
    assert_eq!(Principal::default(), Principal::Anonymous);
    assert!(!Principal::Anonymous.is_authenticated());
    assert!(Principal::Anonymous.claims().is_none());
}

#[test]
fn principal_user_exposes_roles() {
    let principal = Principal::User(claims("alice"));
    assert!(principal.is_authenticated());
    assert!(principal.has_role("Admin"));
    assert!(!principal.has_role("Owner"));
}

#[test]
fn snapshot_constructors_keep_status_consistent() {
    let authed = AuthSnapshot::authenticated(3, claims("alice"));
    assert_eq!(authed.status, AuthStatus::Authenticated);
    assert!(authed.is_authenticated());

    let anon = AuthSnapshot::anonymous(4);
    assert_eq!(anon.principal, Principal::Anonymous);
    assert!(!anon.is_indeterminate());

    let unsure = AuthSnapshot::indeterminate(5, AuthError::NetworkFailure("offline".to_owned()));
    assert_eq!(unsure.principal, Principal::Anonymous);
    assert!(unsure.is_indeterminate());
    assert_eq!(unsure.failure, Some(AuthError::NetworkFailure("offline".to_owned())));
}

#[test]
fn transient_errors_are_classified() {
    assert!(AuthError::NetworkFailure(String::new()).is_transient());
    assert!(AuthError::StorageUnavailable(String::new()).is_transient());
    assert!(AuthError::MalformedResponse(String::new()).is_transient());
    assert!(!AuthError::CredentialsInvalid.is_transient());
    assert!(!AuthError::SessionExpired.is_transient());
}

// =============================================================
// AuthState projection
// =============================================================

#[test]
fn auth_state_default_is_loading_without_user() {
    let state = AuthState::default();
    assert!(state.loading);
    assert!(state.user.is_none());
}

#[test]
fn apply_first_snapshot_clears_loading() {
    let mut state = AuthState::default();
    assert!(state.apply(&AuthSnapshot::authenticated(1, claims("alice"))));
    assert!(!state.loading);
    assert_eq!(state.user.as_ref().map(|u| u.user_name.as_str()), Some("alice"));
    assert_eq!(state.revision, 1);
}

#[test]
fn apply_ignores_older_revisions() {
    let mut state = AuthState::default();
    state.apply(&AuthSnapshot::anonymous(5));
    assert!(!state.apply(&AuthSnapshot::authenticated(4, claims("alice"))));
    assert!(state.user.is_none());
    assert_eq!(state.revision, 5);
}

#[test]
fn apply_marks_indeterminate() {
    let mut state = AuthState::default();
    state.apply(&AuthSnapshot::indeterminate(2, AuthError::NetworkFailure("x".to_owned())));
    assert!(state.indeterminate);
    state.apply(&AuthSnapshot::anonymous(3));
    assert!(!state.indeterminate);
}

#[test]
fn optimistic_state_keeps_loading() {
    let state = AuthState::optimistic(&Principal::User(claims("alice")));
    assert!(state.loading);
    assert!(state.user.is_some());
}
