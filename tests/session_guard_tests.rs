//! Session and guard integration tests: the pairing invariant across whole
//! login/logout sequences, the stale-resolution races, and the navigation
//! rules as one flow.

use tokio::sync::oneshot;

use splasp_console::console::screens::{navigate, Screen};
use splasp_console::identity::{surfaces_for, Role, SessionAccessor, SessionStore, Surface};

#[test]
fn is_authenticated_tracks_the_last_operation() {
    let store = SessionStore::new();
    let acc = SessionAccessor::new(store);

    assert!(!acc.is_authenticated());
    acc.login("t1", Role::User);
    assert!(acc.is_authenticated());
    acc.login("t2", Role::Admin);
    assert!(acc.is_authenticated());
    acc.logout();
    assert!(!acc.is_authenticated());
    acc.logout();
    assert!(!acc.is_authenticated());
    acc.login("t3", Role::User);
    assert!(acc.is_authenticated());

    // Never a token without a role or a role without a token
    let s = acc.snapshot();
    assert_eq!(s.token().is_some(), s.role().is_some());
}

#[tokio::test]
async fn late_login_resolution_cannot_overwrite_a_newer_one() {
    let store = SessionStore::new();
    let acc = SessionAccessor::new(store);

    // Two sign-ins go on the wire; the first one's response hangs
    let slow_attempt = acc.begin_login();
    let fast_attempt = acc.begin_login();

    let (release_tx, release_rx) = oneshot::channel::<()>();
    let slow = tokio::spawn({
        let acc = acc.clone();
        async move {
            release_rx.await.expect("release signal");
            acc.complete_login(slow_attempt, "slow-token", Role::User)
        }
    });

    // The newer sign-in resolves first and wins
    assert!(acc.complete_login(fast_attempt, "fast-token", Role::Admin));
    assert_eq!(acc.token().as_deref(), Some("fast-token"));

    // Now the older response arrives and must be dropped on the floor
    release_tx.send(()).expect("send release");
    assert!(!slow.await.expect("join"));
    assert_eq!(acc.token().as_deref(), Some("fast-token"));
    assert_eq!(acc.role(), Some(Role::Admin));
}

#[tokio::test]
async fn logout_wins_over_any_in_flight_login() {
    let store = SessionStore::new();
    let acc = SessionAccessor::new(store);

    let pending = acc.begin_login();

    // The user signs in through a faster path, then signs out again while
    // the first response is still in flight
    let fast = acc.begin_login();
    assert!(acc.complete_login(fast, "fast-token", Role::User));
    acc.logout();

    let (release_tx, release_rx) = oneshot::channel::<()>();
    let late = tokio::spawn({
        let acc = acc.clone();
        async move {
            release_rx.await.expect("release signal");
            acc.complete_login(pending, "late-token", Role::Admin)
        }
    });
    release_tx.send(()).expect("send release");

    assert!(!late.await.expect("join"));
    assert!(!acc.is_authenticated());
    assert_eq!(acc.role(), None);
}

#[test]
fn admin_screen_navigation_matrix() {
    let store = SessionStore::new();
    let acc = SessionAccessor::new(store);

    // No token: redirected
    let nav = navigate("sessions", &acc.snapshot());
    assert_eq!((nav.screen, nav.redirected), (Screen::Login, true));

    // USER token: still redirected
    acc.login("t", Role::User);
    let nav = navigate("sessions", &acc.snapshot());
    assert_eq!((nav.screen, nav.redirected), (Screen::Login, true));

    // ADMIN token: rendered
    acc.login("t", Role::Admin);
    let nav = navigate("sessions", &acc.snapshot());
    assert_eq!((nav.screen, nav.redirected), (Screen::Sessions, false));
}

#[test]
fn surface_sets_per_role_are_exact() {
    let store = SessionStore::new();
    let acc = SessionAccessor::new(store);

    let expect = |surfaces: &[Surface]| surfaces.iter().copied().collect::<std::collections::BTreeSet<_>>();

    assert_eq!(surfaces_for(&acc.snapshot()), expect(&[Surface::Login, Surface::Register]));

    acc.login("t", Role::User);
    assert_eq!(surfaces_for(&acc.snapshot()), expect(&[Surface::Home, Surface::MyProjects]));

    acc.login("t", Role::Admin);
    assert_eq!(surfaces_for(&acc.snapshot()), expect(&[Surface::Home, Surface::Sessions]));
}

#[test]
fn unmatched_paths_land_on_home() {
    let store = SessionStore::new();
    let acc = SessionAccessor::new(store);
    acc.login("t", Role::User);

    let nav = navigate("definitely-not-a-screen", &acc.snapshot());
    assert_eq!((nav.screen, nav.redirected), (Screen::Home, false));
}
