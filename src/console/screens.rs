//! Screen registry and navigation. Screens are the console's routes: each
//! entry names its path, the guard protecting it, and the surface tag that
//! must be active for it to appear in navigation.

use crate::identity::{surfaces_for, Access, Guard, Identity, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Login,
    Register,
    MyProjects,
    Sessions,
}

pub struct ScreenEntry {
    pub screen: Screen,
    pub path: &'static str,
    pub title: &'static str,
    pub guard: Option<Guard>,
    pub surface: Surface,
}

pub static SCREENS: [ScreenEntry; 5] = [
    ScreenEntry {
        screen: Screen::Home,
        path: "home",
        title: "Home",
        guard: None,
        surface: Surface::Home,
    },
    ScreenEntry {
        screen: Screen::Login,
        path: "login",
        title: "Sign in",
        guard: None,
        surface: Surface::Login,
    },
    ScreenEntry {
        screen: Screen::Register,
        path: "register",
        title: "Register",
        guard: None,
        surface: Surface::Register,
    },
    ScreenEntry {
        screen: Screen::MyProjects,
        path: "projects",
        title: "My projects",
        guard: Some(Guard::SignedIn),
        surface: Surface::MyProjects,
    },
    ScreenEntry {
        screen: Screen::Sessions,
        path: "sessions",
        title: "Sessions management",
        guard: Some(Guard::AdminOnly),
        surface: Surface::Sessions,
    },
];

pub fn entry(screen: Screen) -> &'static ScreenEntry {
    SCREENS
        .iter()
        .find(|e| e.screen == screen)
        .expect("every screen is registered")
}

/// Resolve a typed path to a screen. Anything unmatched lands on home.
pub fn resolve(path: &str) -> Screen {
    let wanted = path.trim().to_ascii_lowercase();
    SCREENS
        .iter()
        .find(|e| e.path == wanted)
        .map(|e| e.screen)
        .unwrap_or(Screen::Home)
}

/// Outcome of one navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub screen: Screen,
    pub redirected: bool,
}

/// One navigation attempt: resolve the path, then evaluate the destination's
/// guard against a single identity snapshot. Unauthorized attempts are
/// redirected to the login screen and the original destination is discarded.
pub fn navigate(path: &str, identity: &Identity) -> Navigation {
    let screen = resolve(path);
    match entry(screen).guard {
        Some(guard) if guard.evaluate(identity) == Access::RedirectToLogin => Navigation {
            screen: Screen::Login,
            redirected: true,
        },
        _ => Navigation { screen, redirected: false },
    }
}

/// Navigation entries active for the current identity, in registry order.
pub fn nav_entries(identity: &Identity) -> Vec<&'static ScreenEntry> {
    let active = surfaces_for(identity);
    SCREENS.iter().filter(|e| active.contains(&e.surface)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{Role, SessionStore};

    #[test]
    fn unknown_paths_fall_back_to_home() {
        assert_eq!(resolve("sessions"), Screen::Sessions);
        assert_eq!(resolve("no-such-screen"), Screen::Home);
        assert_eq!(resolve(""), Screen::Home);
    }

    #[test]
    fn admin_screen_redirects_unless_admin() {
        let store = SessionStore::new();

        let nav = navigate("sessions", &store.snapshot());
        assert_eq!(nav.screen, Screen::Login);
        assert!(nav.redirected);

        store.login("t", Role::User);
        let nav = navigate("sessions", &store.snapshot());
        assert_eq!(nav.screen, Screen::Login);
        assert!(nav.redirected);

        store.login("t", Role::Admin);
        let nav = navigate("sessions", &store.snapshot());
        assert_eq!(nav.screen, Screen::Sessions);
        assert!(!nav.redirected);
    }

    #[test]
    fn protected_screen_requires_sign_in() {
        let store = SessionStore::new();
        assert!(navigate("projects", &store.snapshot()).redirected);
        store.login("t", Role::User);
        assert!(!navigate("projects", &store.snapshot()).redirected);
    }

    #[test]
    fn nav_entries_follow_the_active_surfaces() {
        let store = SessionStore::new();
        let titles = |id: &crate::identity::Identity| {
            nav_entries(id).iter().map(|e| e.path).collect::<Vec<_>>()
        };

        assert_eq!(titles(&store.snapshot()), vec!["login", "register"]);
        store.login("t", Role::User);
        assert_eq!(titles(&store.snapshot()), vec!["home", "projects"]);
        store.login("t", Role::Admin);
        assert_eq!(titles(&store.snapshot()), vec!["home", "sessions"]);
    }
}
