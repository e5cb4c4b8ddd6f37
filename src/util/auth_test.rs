use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::net::types::UserClaims;
use crate::state::auth::{AuthError, AuthSnapshot};

fn alice() -> UserClaims {
    UserClaims { user_id: "u1".to_owned(), user_name: "alice".to_owned(), ..Default::default() }
}

#[test]
fn should_redirect_unauth_when_not_loading_and_user_missing() {
    let state = AuthState { user: None, loading: false, indeterminate: false, revision: 1 };
    assert!(should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_while_loading() {
    let state = AuthState::default();
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_when_user_exists() {
    let state = AuthState { user: Some(alice()), loading: false, indeterminate: false, revision: 1 };
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn should_not_redirect_when_indeterminate() {
    let mut state = AuthState::default();
    state.apply(&AuthSnapshot::indeterminate(1, AuthError::NetworkFailure("offline".to_owned())));
    assert!(!should_redirect_unauth(&state));
}

#[test]
fn confirmed_anonymous_snapshot_triggers_redirect() {
    let mut state = AuthState::default();
    state.apply(&AuthSnapshot::anonymous(1));
    assert!(should_redirect_unauth(&state));
}

/// Navigation sink that cannot be cloned, like a router handle moved into
/// the guard.
struct Visits(Rc<RefCell<Vec<String>>>);

#[test]
fn redirect_guard_takes_navigate_by_move() {
    let visited: Rc<RefCell<Vec<String>>> = Rc::default();
    let owner = Owner::new();
    owner.with(|| {
        let auth = RwSignal::new(AuthState::default());
        let visits = Visits(Rc::clone(&visited));
        install_unauth_redirect(auth, move |path: &str, _: NavigateOptions| visits.0.borrow_mut().push(path.to_owned()));
    });
    // Still loading: nothing to redirect yet.
    assert!(visited.borrow().is_empty());
}
