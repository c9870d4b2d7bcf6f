//! Interactive console. The readline loop plays the part the browser shell
//! plays for the platform's web client: commands navigate between screens,
//! guarded destinations redirect to the sign-in screen, and the visible
//! navigation entries follow the signed-in role.

pub mod screens;
pub mod outputformatter;

use anyhow::Result;
use base64::Engine;
use chrono::{DateTime, NaiveDate, Utc};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::client::schemas::CreateSession;
use crate::client::ApiClient;
use crate::identity::{Access, Guard};
use screens::{entry, navigate, nav_entries, Navigation, Screen};

pub struct Console {
    rt: tokio::runtime::Runtime,
    api: ApiClient,
    current: Screen,
}

enum Flow {
    Continue,
    Quit,
}

impl Console {
    pub fn new(rt: tokio::runtime::Runtime, api: ApiClient) -> Console {
        let current = if api.session().is_authenticated() {
            Screen::Home
        } else {
            Screen::Login
        };
        Console { rt, api, current }
    }

    /// Run the readline loop until quit or EOF.
    pub fn run(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        println!("splasp console. Type 'help' for commands.");
        self.render(Navigation { screen: self.current, redirected: false });

        loop {
            let prompt = match self.api.session().role() {
                Some(role) => format!("splasp ({})> ", role),
                None => "splasp> ".to_string(),
            };
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(&line);
                    match self.dispatch(&mut rl, &line) {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => eprintln!("error: {}", e),
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Type 'quit' to exit");
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("error: {}", e);
                    break;
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, rl: &mut DefaultEditor, line: &str) -> Result<Flow> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["quit"] | ["exit"] => return Ok(Flow::Quit),
            ["help"] => self.print_help(),
            ["status"] => self.print_status(),
            ["health"] => match self.rt.block_on(self.api.health()) {
                Ok(()) => println!("server is healthy"),
                Err(e) => eprintln!("health check failed: {}", e),
            },
            ["open", path] => {
                let nav = navigate(path, &self.api.session().snapshot());
                if nav.redirected {
                    println!("not authorized for '{}'; taking you to sign in", path);
                }
                self.render(nav);
            }
            ["login"] => {
                self.sign_in(rl, None)?;
            }
            ["login", user] => {
                self.sign_in(rl, Some((*user).to_string()))?;
            }
            ["logout"] => {
                self.api.sign_out();
                println!("signed out");
                self.render(Navigation { screen: Screen::Login, redirected: false });
            }
            ["register"] => {
                self.sign_up(rl, None)?;
            }
            ["register", user] => {
                self.sign_up(rl, Some((*user).to_string()))?;
            }
            ["join", code] => self.guarded(Guard::SignedIn, |c| {
                match c.rt.block_on(c.api.join_session(code)) {
                    Ok(s) => println!("joined session '{}' (id {})", s.name, s.id),
                    Err(e) => eprintln!("join failed: {}", e),
                }
            }),
            ["analyze", file, session_id] => {
                let id: i64 = match session_id.parse() {
                    Ok(v) => v,
                    Err(_) => {
                        eprintln!("'{}' is not a session id", session_id);
                        return Ok(Flow::Continue);
                    }
                };
                self.guarded(Guard::SignedIn, |c| {
                    match c.rt.block_on(c.api.analyze_project(std::path::Path::new(file), id)) {
                        Ok(report) => outputformatter::print_analysis(&report),
                        Err(e) => eprintln!("analysis failed: {}", e),
                    }
                });
            }
            ["sessions", "create", name, start, end] => {
                let (start, end) = match (parse_when(start), parse_when(end)) {
                    (Ok(s), Ok(e)) => (s, e),
                    _ => {
                        eprintln!("dates must be RFC3339 or YYYY-MM-DD");
                        return Ok(Flow::Continue);
                    }
                };
                let req = CreateSession { name: (*name).to_string(), start_date: start, end_date: end };
                self.guarded(Guard::AdminOnly, |c| {
                    match c.rt.block_on(c.api.create_session(&req)) {
                        Ok(s) => println!("created session '{}' with join code {}", s.name, s.code),
                        Err(e) => eprintln!("create failed: {}", e),
                    }
                });
            }
            ["sessions", "close", id] => {
                let id: i64 = match id.parse() {
                    Ok(v) => v,
                    Err(_) => {
                        eprintln!("'{}' is not a session id", id);
                        return Ok(Flow::Continue);
                    }
                };
                self.guarded(Guard::AdminOnly, |c| {
                    match c.rt.block_on(c.api.close_session(id)) {
                        Ok(()) => println!("session {} closed", id),
                        Err(e) => eprintln!("close failed: {}", e),
                    }
                });
            }
            _ => {
                println!("unknown command: '{}'. Type 'help' for commands.", line);
            }
        }
        Ok(Flow::Continue)
    }

    /// Run an action behind a guard with the same redirect semantics screens
    /// get: one snapshot per attempt, denial lands on the sign-in screen.
    fn guarded<F: FnOnce(&mut Console)>(&mut self, guard: Guard, action: F) {
        match guard.evaluate(&self.api.session().snapshot()) {
            Access::Grant => action(self),
            Access::RedirectToLogin => {
                println!("not authorized; taking you to sign in");
                self.render(Navigation { screen: Screen::Login, redirected: true });
            }
        }
    }

    fn sign_in(&mut self, rl: &mut DefaultEditor, user: Option<String>) -> Result<()> {
        let (user, pass) = self.read_credentials(rl, user)?;
        match self.rt.block_on(self.api.sign_in(&user, &pass)) {
            Ok(identity) => {
                println!("signed in as {} ({})", user, identity.role().map(|r| r.as_str()).unwrap_or("?"));
                self.render(navigate("home", &identity));
            }
            Err(e) => eprintln!("sign in failed: {}", e),
        }
        Ok(())
    }

    fn sign_up(&mut self, rl: &mut DefaultEditor, user: Option<String>) -> Result<()> {
        let (user, pass) = self.read_credentials(rl, user)?;
        match self.rt.block_on(self.api.sign_up(&user, &pass)) {
            Ok(identity) => {
                println!("registered and signed in as {} ({})", user, identity.role().map(|r| r.as_str()).unwrap_or("?"));
                self.render(navigate("home", &identity));
            }
            Err(e) => eprintln!("registration failed: {}", e),
        }
        Ok(())
    }

    fn read_credentials(&self, rl: &mut DefaultEditor, user: Option<String>) -> Result<(String, String)> {
        let user = match user {
            Some(u) => u,
            None => {
                let fallback = whoami::username();
                let typed = rl.readline(&format!("username [{}]: ", fallback))?;
                let typed = typed.trim().to_string();
                if typed.is_empty() { fallback } else { typed }
            }
        };
        let pass = rl.readline("password: ")?.trim().to_string();
        Ok((user, pass))
    }

    fn render(&mut self, nav: Navigation) {
        self.current = nav.screen;
        let e = entry(nav.screen);
        println!("-- {} --", e.title);
        match nav.screen {
            Screen::Home => {
                let identity = self.api.session().snapshot();
                if identity.is_authenticated() {
                    println!("connected to {}", self.api.base_url());
                } else {
                    // Signed-out users get pointed at the entry screens
                    println!("sign in or register to continue");
                }
                let paths: Vec<&str> = nav_entries(&identity).iter().map(|e| e.path).collect();
                println!("screens: {}", paths.join(", "));
            }
            Screen::Login => {
                println!("use: login <username>   (you will be asked for the password)");
            }
            Screen::Register => {
                println!("use: register <username>");
            }
            Screen::MyProjects => match self.rt.block_on(self.api.my_projects()) {
                Ok(projects) => outputformatter::print_listing(
                    &projects,
                    &outputformatter::PROJECT_COLS,
                    outputformatter::project_rows(&projects),
                ),
                Err(e) => eprintln!("could not load projects: {}", e),
            },
            Screen::Sessions => match self.rt.block_on(self.api.list_sessions()) {
                Ok(sessions) => {
                    outputformatter::print_listing(
                        &sessions,
                        &outputformatter::SESSION_COLS,
                        outputformatter::session_rows(&sessions),
                    );
                    println!("actions: sessions create <name> <start> <end> | sessions close <id>");
                }
                Err(e) => eprintln!("could not load sessions: {}", e),
            },
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  open <screen>                         navigate (home, login, register, projects, sessions)");
        println!("  login [user] / register [user]        authenticate against the platform");
        println!("  logout                                end the session");
        println!("  join <code>                           join an analysis session by its code");
        println!("  analyze <file.xml> <session-id>       upload a Snap! project for analysis");
        println!("  sessions create <name> <start> <end>  (admin) create a timed session");
        println!("  sessions close <id>                   (admin) deactivate a session");
        println!("  status / health / help / quit");
        let identity = self.api.session().snapshot();
        let paths: Vec<&str> = nav_entries(&identity).iter().map(|e| e.path).collect();
        println!("screens available to you now: {}", paths.join(", "));
    }

    fn print_status(&self) {
        println!("server: {}", self.api.base_url());
        let identity = self.api.session().snapshot();
        match (identity.token(), identity.role()) {
            (Some(token), Some(role)) => {
                println!("signed in, role {}", role);
                if let Some((sub, exp)) = token_claims(token) {
                    if let Some(sub) = sub {
                        println!("subject: {}", sub);
                    }
                    if let Some(exp) = exp {
                        println!("token expires: {}", exp.format("%Y-%m-%d %H:%M:%S UTC"));
                    }
                }
            }
            _ => println!("signed out"),
        }
    }
}

/// Peek at the JWT payload for display. No signature verification happens
/// here; the backend owns token validity.
fn token_claims(token: &str) -> Option<(Option<String>, Option<DateTime<Utc>>)> {
    let payload = token.split('.').nth(1)?;
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
    let v: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    let sub = v.get("sub").and_then(|s| s.as_str()).map(str::to_string);
    let exp = v
        .get("exp")
        .and_then(|e| e.as_i64())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    Some((sub, exp))
}

/// Accept RFC3339 or a bare date (taken as midnight UTC).
fn parse_when(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")?;
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("invalid time of day"))?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_when_accepts_both_forms() {
        assert!(parse_when("2025-03-01").is_ok());
        assert!(parse_when("2025-03-01T09:30:00Z").is_ok());
        assert!(parse_when("yesterday").is_err());
    }

    #[test]
    fn token_claims_reads_sub_and_exp() {
        // header.payload.signature with payload {"sub":"ada","exp":1767225600}
        let payload = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .encode(br#"{"sub":"ada","exp":1767225600}"#);
        let token = format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", payload);
        let (sub, exp) = token_claims(&token).unwrap();
        assert_eq!(sub.as_deref(), Some("ada"));
        assert_eq!(exp.unwrap().timestamp(), 1767225600);
    }

    #[test]
    fn token_claims_tolerates_opaque_tokens() {
        assert!(token_claims("not-a-jwt").is_none());
    }
}
