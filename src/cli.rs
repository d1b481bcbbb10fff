use crate::api::credentials::{DEFAULT_SERVICE_PASSWORD, DEFAULT_SERVICE_USER};
use crate::api::CredentialMode;
use crate::models::ResourceKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "aeroadmin")]
#[command(about = "Airport operations back-office console", long_about = None)]
pub struct Args {
    #[arg(
        long = "base-url",
        global = true,
        help = "API base URL (e.g., http://localhost:8000)"
    )]
    pub base_url: Option<String>,

    #[arg(
        long = "credential-mode",
        global = true,
        help = "Credentials sent with each request (mixed, bearer, service-account)"
    )]
    pub credential_mode: Option<CredentialMode>,

    #[arg(long = "home", global = true, help = "Directory holding the saved session")]
    pub home: Option<PathBuf>,

    #[arg(
        long = "ephemeral",
        global = true,
        help = "Keep the session in memory only for this run"
    )]
    pub ephemeral: bool,

    #[arg(short = 'v', long = "verbose", global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in and save the session
    Login {
        #[arg(short = 'u', long = "username", default_value = DEFAULT_SERVICE_USER)]
        username: String,
        #[arg(short = 'p', long = "password", default_value = DEFAULT_SERVICE_PASSWORD)]
        password: String,
    },

    /// Forget the saved session
    Logout,

    /// Show the current session
    Whoami,

    /// List records of a resource
    List { resource: ResourceKind },

    /// Show one record
    Get { resource: ResourceKind, id: String },

    /// Create a record from JSON
    Create {
        resource: ResourceKind,
        #[command(flatten)]
        payload: Payload,
    },

    /// Replace a record from JSON
    Update {
        resource: ResourceKind,
        id: String,
        #[command(flatten)]
        payload: Payload,
    },

    /// Delete a record
    Delete { resource: ResourceKind, id: String },

    /// Look up a passenger or reservation by passport number
    Passport {
        resource: ResourceKind,
        number: String,
    },

    /// Change the state of a flight
    FlightState { vol_num: String, state: String },

    /// Counts and percentages for a resource
    Stats {
        resource: ResourceKind,
        #[arg(long = "by", help = "Field to group by (defaults to state, or nationality for passengers)")]
        by: Option<String>,
    },
}

#[derive(clap::Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct Payload {
    #[arg(long = "data", help = "Inline JSON body")]
    pub data: Option<String>,

    #[arg(long = "file", help = "Path to a JSON file")]
    pub file: Option<PathBuf>,
}

impl Command {
    /// Protected location this command opens, `None` for public commands.
    pub fn location(&self) -> Option<String> {
        match self {
            Command::Login { .. } | Command::Logout | Command::Whoami => None,
            Command::List { resource } | Command::Stats { resource, .. } => {
                Some(resource.location().to_string())
            }
            Command::Create { resource, .. } => Some(format!("{}/nouveau", resource.location())),
            Command::Get { resource, id } | Command::Delete { resource, id } => {
                Some(format!("{}/{}", resource.location(), id))
            }
            Command::Update { resource, id, .. } => {
                Some(format!("{}/{}/edit", resource.location(), id))
            }
            Command::Passport { resource, number } => {
                Some(format!("{}/{}", resource.location(), number))
            }
            Command::FlightState { vol_num, .. } => {
                Some(format!("{}/{}", ResourceKind::Flight.location(), vol_num))
            }
        }
    }
}
