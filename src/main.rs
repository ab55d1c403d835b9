//!
//! campusgate terminal client
//! --------------------------
//! Interactive client for the college administration portal. Signs in against
//! the REST API, keeps the session in a durable state file, and walks the same
//! guarded screens the web front-end exposes (role dashboards, profile,
//! password recovery).

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use campusgate::cli::{render_menu, render_navigation, render_notification, render_profile};
use campusgate::identity::Role;
use campusgate::navigation::{Location, LOGIN_PATH};
use campusgate::{Navigation, Notification, Portal, PortalConfig, Screen};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--api <url>] [--media <url>] [--state-dir <dir> | --memory] [--open <path>]\n\nFlags:\n  --api <url>          REST API base (env CAMPUSGATE_API_URL, default http://127.0.0.1:4000/api)\n  --media <url>        Media base for profile images (env CAMPUSGATE_MEDIA_URL)\n  --state-dir <dir>    Directory for the durable session file (env CAMPUSGATE_STATE_DIR, default .campusgate)\n  --memory             Keep the session in memory only\n  --open <path>        Open one location, print the screen and exit\n  -h, --help           Show this help\n\nInteractive commands:\n  login <role> <email> <password>          sign in as Admin, Faculty or Student\n  logout                                   clear the session\n  open <path>                              navigate, e.g. open /admin?page=branch\n  page <id>                                switch menu page in the current dashboard\n  menu                                     show the current dashboard menu\n  profile                                  fetch and show your profile\n  whoami | status                          show the current session\n  forgot <role> <email>                    request a password reset mail\n  reset <role> <resetId> <new> <confirm>   set a new password from a reset link\n  help                                     show this help\n  quit | exit                              leave the client"
    );
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("invalid log filter")?;
    let _ = fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);
    let mut cfg = PortalConfig::from_env();
    let mut open_once: Option<String> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--api" => {
                if i + 1 >= args.len() { eprintln!("--api requires a URL"); print_usage(&program); std::process::exit(2); }
                cfg.api_url = args[i+1].clone();
                i += 2; continue;
            }
            "--media" => {
                if i + 1 >= args.len() { eprintln!("--media requires a URL"); print_usage(&program); std::process::exit(2); }
                cfg.media_url = args[i+1].clone();
                i += 2; continue;
            }
            "--state-dir" => {
                if i + 1 >= args.len() { eprintln!("--state-dir requires a value"); print_usage(&program); std::process::exit(2); }
                cfg.state_dir = Some(PathBuf::from(&args[i+1]));
                i += 2; continue;
            }
            "--open" => {
                if i + 1 >= args.len() { eprintln!("--open requires a path"); print_usage(&program); std::process::exit(2); }
                open_once = Some(args[i+1].clone());
                i += 2; continue;
            }
            "--memory" => { cfg.state_dir = None; }
            "-h" | "--help" => { print_usage(&program); return Ok(()); }
            other => {
                eprintln!("unknown argument: {}", other);
                print_usage(&program);
                std::process::exit(2);
            }
        }
        i += 1;
    }

    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "campusgate",
        "campusgate starting: RUST_LOG='{}', api='{}', state_dir={:?}",
        rust_log, cfg.api_url, cfg.state_dir
    );

    let portal = Portal::from_config(&cfg).context("failed to initialise portal")?;
    let rt = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    if let Some(path) = open_once {
        let nav = portal.open(&Location::parse(&path));
        println!("{}", render_navigation(&nav, portal.media_url()));
        return Ok(());
    }
    run_repl(rt, portal)
}

fn show_error(err: &campusgate::AppError) {
    eprintln!("{}", render_notification(&Notification::from(err)));
}

fn run_repl(rt: tokio::runtime::Runtime, portal: Portal) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    // Resume where a previous run left off: an existing session lands on its home.
    let mut current: Navigation = portal.open(&Location::new(LOGIN_PATH));
    println!("campusgate interpreter. Type 'help' for commands.");
    println!("{}", render_navigation(&current, portal.media_url()));

    loop {
        let line = match editor.readline("> ") {
            Ok(l) => l,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("reading input"),
        };
        let line = line.trim();
        if line.is_empty() { continue; }
        let _ = editor.add_history_entry(line);
        let parts: Vec<&str> = line.split_whitespace().collect();
        let cmd = parts[0].to_ascii_lowercase();

        match cmd.as_str() {
            "quit" | "exit" => break,
            "help" => print_usage("campusgate"),
            "login" => {
                if parts.len() < 4 { eprintln!("usage: login <role> <email> <password>"); continue; }
                let role = match parts[1].parse::<Role>() { Ok(r) => r, Err(e) => { show_error(&e); continue; } };
                match rt.block_on(portal.login(role, parts[2], parts[3])) {
                    Ok(nav) => {
                        current = nav;
                        // Dashboards fetch their profile as soon as they are admitted.
                        match rt.block_on(portal.load_profile()) {
                            Ok(_) => current = portal.open(&current.location),
                            Err(e) => {
                                show_error(&e);
                                if let Some(nav) = portal.recover(&e) { current = nav; }
                            }
                        }
                        println!("{}", render_navigation(&current, portal.media_url()));
                    }
                    Err(e) => show_error(&e),
                }
            }
            "logout" => {
                current = portal.logout();
                println!("{}", render_navigation(&current, portal.media_url()));
            }
            "open" => {
                if parts.len() < 2 { eprintln!("usage: open <path>"); continue; }
                current = portal.open(&Location::parse(parts[1]));
                println!("{}", render_navigation(&current, portal.media_url()));
            }
            "page" => {
                if parts.len() < 2 { eprintln!("usage: page <id>"); continue; }
                let id = parts[1..].join(" ");
                match &current.screen {
                    Screen::Shell { shell, .. } => {
                        let shell = *shell;
                        current = portal.select_page(&shell, &id);
                        println!("{}", render_navigation(&current, portal.media_url()));
                    }
                    _ => eprintln!("not on a dashboard; open your home first"),
                }
            }
            "menu" => match &current.screen {
                Screen::Shell { shell, .. } => println!("{}", render_menu(shell)),
                _ => eprintln!("not on a dashboard"),
            },
            "profile" => match rt.block_on(portal.load_profile()) {
                Ok(p) => {
                    let role = portal.sessions().current_session().map(|s| s.role).unwrap_or(Role::Student);
                    println!("{}", render_profile(&p, role, portal.media_url()));
                }
                Err(e) => {
                    show_error(&e);
                    if let Some(nav) = portal.recover(&e) {
                        current = nav;
                        println!("{}", render_navigation(&current, portal.media_url()));
                    }
                }
            },
            "whoami" | "status" => match portal.sessions().current_session() {
                Some(s) => {
                    let name = s.profile.as_ref().map(|p| p.full_name()).filter(|n| !n.is_empty()).unwrap_or_else(|| "(profile not loaded)".to_string());
                    println!("signed in as {} {}\n  at: {}", s.role, name, current.location);
                }
                None => println!("not signed in\n  at: {}", current.location),
            },
            "forgot" => {
                if parts.len() < 3 { eprintln!("usage: forgot <role> <email>"); continue; }
                let role = match parts[1].parse::<Role>() { Ok(r) => r, Err(e) => { show_error(&e); continue; } };
                match rt.block_on(portal.forget_password(role, parts[2])) {
                    Ok(n) => println!("{}", render_notification(&n)),
                    Err(e) => show_error(&e),
                }
            }
            "reset" => {
                if parts.len() < 5 { eprintln!("usage: reset <role> <resetId> <new> <confirm>"); continue; }
                let role = parts[1].parse::<Role>().ok();
                match rt.block_on(portal.update_password(role, parts[2], parts[3], parts[4])) {
                    Ok(n) => {
                        println!("{}", render_notification(&n));
                        current = portal.open(&Location::new(LOGIN_PATH));
                    }
                    Err(e) => show_error(&e),
                }
            }
            other => eprintln!("unknown command '{}'; type 'help'", other),
        }
    }
    Ok(())
}
