//!
//! splasp console binary
//! ---------------------
//! Interactive terminal client for the SPLASP analysis platform. Signs in
//! against the platform backend, then navigates between the same screens the
//! web client offers: projects, analysis uploads and session management.

use std::env;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use splasp_console::client::ApiClient;
use splasp_console::console::Console;
use splasp_console::identity::{SessionAccessor, SessionStore};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--server <url>] [--user <u>] [--password <p>] [--output table|json]\n\nFlags:\n  --server <url>       Platform backend base URL (default: $SPLASP_SERVER_URL or http://127.0.0.1:8000)\n  --user <u>           Sign in as <u> on startup (asks for the password unless --password is given)\n  --password <p>       Password for --user\n  --output <fmt>       'table' (default) or 'json'; also settable via $SPLASP_OUTPUT\n  -h, --help           Show this help\n\nInteractive commands: type 'help' at the prompt."
    );
}

fn main() -> Result<()> {
    println!(
        r"   _____ ____  __    ___   _____ ____
  / ___// __ \/ /   /   | / ___// __ \
  \__ \/ /_/ / /   / /| | \__ \/ /_/ /
 ___/ / ____/ /___/ ___ |___/ / ____/
/____/_/   /_____/_/  |_/____/_/
          console");

    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);

    let mut server: Option<String> = None;
    let mut user: Option<String> = None;
    let mut password: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--server" => {
                if i + 1 >= args.len() { eprintln!("--server requires a URL"); print_usage(&program); std::process::exit(2); }
                server = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--user" => {
                if i + 1 >= args.len() { eprintln!("--user requires a value"); print_usage(&program); std::process::exit(2); }
                user = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--password" => {
                if i + 1 >= args.len() { eprintln!("--password requires a value"); print_usage(&program); std::process::exit(2); }
                password = Some(args[i + 1].clone());
                i += 2; continue;
            }
            "--output" => {
                if i + 1 >= args.len() { eprintln!("--output requires a value"); print_usage(&program); std::process::exit(2); }
                env::set_var("SPLASP_OUTPUT", &args[i + 1]);
                i += 2; continue;
            }
            "-h" | "--help" => {
                print_usage(&program);
                return Ok(());
            }
            unk => {
                eprintln!("Unrecognized argument: {}", unk);
                print_usage(&program);
                std::process::exit(2);
            }
        }
    }

    let server = server
        .or_else(|| env::var("SPLASP_SERVER_URL").ok())
        .unwrap_or_else(|| "http://127.0.0.1:8000".to_string());

    info!(server = %server, "splasp console starting");

    // One store per process, injected into everything that reads identity
    let store = SessionStore::new();
    let session = SessionAccessor::new(store);
    let api = ApiClient::new(&server, session).context("invalid server URL")?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build Tokio runtime")?;

    // Optional auto sign-in from flags before the prompt appears
    if let (Some(user), Some(password)) = (user.as_deref(), password.as_deref()) {
        match rt.block_on(api.sign_in(user, password)) {
            Ok(identity) => {
                let role = identity.role().map(|r| r.as_str()).unwrap_or("?");
                println!("signed in as {} ({})", user, role);
            }
            Err(e) => eprintln!("auto sign-in failed: {}", e),
        }
    } else if user.is_some() {
        eprintln!("--user without --password; sign in at the prompt instead");
    }

    Console::new(rt, api).run()
}
