mod cli;
mod commands;
mod config;
mod logging;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ors_admin::{
    FileStore, HttpTransport, NotificationController, RequestDispatcher, RouteNavigator,
    SessionContext,
};

use cli::{Cli, Commands, OutputFormat};
use config::ProfileConfig;
use output::print_error;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&format!("{e:#}"));
            std::process::exit(1);
        }
    }
}

/// Everything a networked command needs.
struct App {
    server: String,
    session: Arc<SessionContext>,
    controller: NotificationController,
}

async fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let profile_name = &cli.profile;
    let profile = config::load_profile(profile_name)?;
    let format = cli
        .format
        .or_else(|| profile.format.as_deref().and_then(OutputFormat::parse))
        .unwrap_or_default();

    match &cli.command {
        Commands::Session(args) => {
            let store = open_store(profile_name)?;
            match &args.command {
                cli::SessionCommands::Set(set_args) => commands::session::set(&store, set_args)?,
                cli::SessionCommands::Show => commands::session::show(&store, profile_name)?,
                cli::SessionCommands::Clear => commands::session::clear(&store)?,
            }
            Ok(true)
        }
        Commands::Config(args) => match &args.command {
            cli::ConfigCommands::Show => {
                println!("{}: {}", "Profile".cyan(), profile_name);
                println!(
                    "{}: {}",
                    "Server".cyan(),
                    profile.server.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "{}: {}",
                    "Format".cyan(),
                    profile.format.as_deref().unwrap_or("json")
                );
                println!(
                    "{}: {}",
                    "Path".cyan(),
                    profile.path.as_deref().unwrap_or(config::DEFAULT_PATH)
                );
                match profile.timeout {
                    Some(secs) => println!("{}: {secs}s", "Timeout".cyan()),
                    None => println!("{}: (client default)", "Timeout".cyan()),
                }
                Ok(true)
            }
            cli::ConfigCommands::Set(set_args) => {
                let mut cfg = profile.clone();
                config::set_key(&mut cfg, &set_args.key, &set_args.value)?;
                config::save_profile(profile_name, &cfg)?;
                output::print_success(&format!("Set {} = {}", set_args.key, set_args.value));
                Ok(true)
            }
        },
        Commands::Notify(args) => {
            let mut app = make_app(&cli, &profile)?;
            let ok = commands::notify::send(&mut app.controller, args, format).await?;
            // The form already printed the session message.
            report_redirect(&app.session, false);
            Ok(ok)
        }
        Commands::Roles => {
            let mut app = make_app(&cli, &profile)?;
            commands::notify::roles(&mut app.controller, format).await?;
            Ok(!report_redirect(&app.session, true))
        }
        Commands::Status => {
            let app = make_app(&cli, &profile)?;
            let ok = commands::server::status(&app.controller, &app.server, format).await?;
            report_redirect(&app.session, true);
            Ok(ok)
        }
    }
}

fn open_store(profile: &str) -> Result<FileStore> {
    let path = config::session_path(profile)?;
    FileStore::open(&path).with_context(|| format!("Failed to open session store {}", path.display()))
}

fn make_app(cli: &Cli, profile: &ProfileConfig) -> Result<App> {
    let server = config::resolve_server(&cli.server, profile)?;
    let client_config = config::client_config(&server, profile);
    let path = cli
        .path
        .clone()
        .or_else(|| profile.path.clone())
        .unwrap_or_else(|| config::DEFAULT_PATH.to_string());

    tracing::debug!(server = %server, path = %path, profile = %cli.profile, "building client");
    let store = Arc::new(open_store(&cli.profile)?);
    let navigator = Arc::new(RouteNavigator::new(path));
    let session = Arc::new(SessionContext::new(&client_config, store.clone(), navigator));
    let transport = Arc::new(HttpTransport::new(&client_config, store)?);
    let dispatcher = Arc::new(RequestDispatcher::new(
        client_config.base()?,
        session.clone(),
        transport,
    ));

    Ok(App {
        server,
        session,
        controller: NotificationController::new(dispatcher),
    })
}

/// Tell the user when a call sent them to the login page.
/// Returns `true` if a redirect happened.
fn report_redirect(session: &SessionContext, with_message: bool) -> bool {
    let status = session.status();
    if !status.error {
        return false;
    }
    if with_message && let Some(message) = &status.message {
        print_error(message);
    }
    match session.take_pending_redirect() {
        Some(target) => println!(
            "Log in again ({}), then retry from {}",
            "ors session set".cyan(),
            target.cyan()
        ),
        None => println!("Log in again with {}", "ors session set".cyan()),
    }
    true
}
