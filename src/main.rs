use aeroadmin::app::Console;
use aeroadmin::cli::{Args, Command, Payload};
use aeroadmin::config::Config;
use aeroadmin::error::{AeroError, ApiError, Result};
use aeroadmin::models::ResourceKind;
use aeroadmin::stats::breakdown;
use aeroadmin::ui::output::{
    display_banner, display_breakdown, display_login_required, display_record, display_records,
    display_session,
};
use aeroadmin::view::{Applied, Banner, ResourceView};
use clap::{CommandFactory, Parser};
use colored::*;
use serde_json::Value;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let command = match args.command.clone() {
        Some(command) => command,
        None => {
            let _ = Args::command().print_help();
            process::exit(1);
        }
    };

    let config = match Config::from_env_and_args(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red(), e);
            process::exit(1);
        }
    };

    init_logging(config.verbose);

    let mut console = match Console::open(&config) {
        Ok(console) => console,
        Err(e) => {
            eprintln!("{} {}", "Error:".red(), e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&mut console, command).await {
        match &e {
            AeroError::LoginRequired { from } => display_login_required(from),
            // Already reported through the view banner
            AeroError::Api(_) => {}
            other => eprintln!("{} {}", "Error:".red(), other),
        }
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "aeroadmin=debug" } else { "aeroadmin=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(console: &mut Console, command: Command) -> Result<()> {
    if let Some(location) = command.location() {
        console.enter(&location).admit()?;
    }

    match command {
        Command::Login { username, password } => {
            let (session, next) = console.login(&username, &password).await?;
            display_banner(&Banner::Success(format!(
                "Welcome {} ({})",
                session.username, session.role
            )));
            println!("{}", format!("Continue at {}", next).dimmed());
        }
        Command::Logout => {
            console.logout();
            display_banner(&Banner::Success("Logged out".to_string()));
        }
        Command::Whoami => {
            display_session(console.store().current().as_ref());
            println!(
                "{}",
                format!(
                    "API {} (credentials: {})",
                    console.client().base_url(),
                    console.client().credential_mode()
                )
                .dimmed()
            );
        }
        Command::List { resource } => {
            let view = console.view(resource);
            let outcome = view.refresh().await;
            settle(console, &view, outcome.map(|_| ()))?;
            display_records(resource, &view.records());
        }
        Command::Get { resource, id } => {
            let view = console.view(resource);
            let outcome = view.open(&id).await;
            settle(console, &view, outcome.as_ref().map(|_| ()).map_err(|e| e.clone()))?;
            if let Ok(Applied::Current(record)) = outcome {
                display_record(resource, &record);
            }
        }
        Command::Create { resource, payload } => {
            let body = read_payload(&payload)?;
            let view = console.view(resource);
            let outcome = view.create(&body).await;
            settle(console, &view, outcome.map(|_| ()))?;
        }
        Command::Update {
            resource,
            id,
            payload,
        } => {
            let body = read_payload(&payload)?;
            let view = console.view(resource);
            let outcome = view.update(&id, &body).await;
            settle(console, &view, outcome.map(|_| ()))?;
        }
        Command::Delete { resource, id } => {
            let view = console.view(resource);
            let outcome = view.remove(&id).await;
            settle(console, &view, outcome.map(|_| ()))?;
        }
        Command::Passport { resource, number } => {
            let result = console.resources().by_passport(resource, &number).await;
            console.refresh();
            match result {
                Ok(record) => display_record(resource, &record),
                Err(e) => {
                    display_banner(&Banner::Error(resource.describe_error(&e)));
                    return Err(e.into());
                }
            }
        }
        Command::FlightState { vol_num, state } => {
            let result = console.resources().set_flight_state(&vol_num, &state).await;
            console.refresh();
            match result {
                Ok(response) => {
                    let message = response
                        .get("message")
                        .and_then(|m| m.as_str())
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Flight state changed to {}", state));
                    display_banner(&Banner::Success(message));
                }
                Err(e) => {
                    display_banner(&Banner::Error(ResourceKind::Flight.describe_error(&e)));
                    return Err(e.into());
                }
            }
        }
        Command::Stats { resource, by } => {
            let view = console.view(resource);
            let outcome = view.refresh().await;
            settle(console, &view, outcome.map(|_| ()))?;
            let field = by.unwrap_or_else(|| resource.default_stat_field().to_string());
            display_breakdown(resource, &breakdown(&view.records(), &field));
        }
    }

    Ok(())
}

/// Show the view's banner and apply any auth signal the call produced.
fn settle(
    console: &mut Console,
    view: &ResourceView,
    outcome: std::result::Result<(), ApiError>,
) -> Result<()> {
    console.refresh();
    if let Some(banner) = view.banner() {
        display_banner(&banner);
    }
    outcome.map_err(AeroError::from)
}

fn read_payload(payload: &Payload) -> Result<Value> {
    let raw = match (&payload.data, &payload.file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => fs::read_to_string(path)?,
        (None, None) => {
            return Err(AeroError::Config(
                "either --data or --file is required".to_string(),
            ))
        }
    };
    let body: Value = serde_json::from_str(&raw)?;
    if !body.is_object() {
        return Err(AeroError::Config("payload must be a JSON object".to_string()));
    }
    Ok(body)
}
