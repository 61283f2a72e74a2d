//! Cadence terminal client

use anyhow::Context;
use cadence_cli::{interactive, CadenceConfig, CliError};
use cadence_server_client::{AuthSession, CadenceClient, FileCredentialStore, TrackUpload};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Listen to a Cadence music server from the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (default: ./cadence.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        /// Username or email address
        #[arg(short, long)]
        identifier: String,

        #[arg(short, long, env = "CADENCE_PASSWORD")]
        password: String,
    },

    /// Sign out and forget the session
    Logout,

    /// Create an account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "CADENCE_PASSWORD")]
        password: String,
    },

    /// Confirm an email address with the code sent to it
    Verify {
        #[arg(short, long)]
        email: String,

        #[arg(long)]
        code: u32,
    },

    /// Show the signed-in user
    Whoami,

    /// List the library
    Tracks {
        /// Only tracks by this artist
        #[arg(long, conflicts_with = "title")]
        artist: Option<String>,

        /// Only tracks with this title
        #[arg(long)]
        title: Option<String>,
    },

    /// Upload a song
    Upload {
        /// Audio file
        file: PathBuf,

        #[arg(long)]
        title: String,

        #[arg(long)]
        artist: String,

        /// Display length, e.g. 3:45
        #[arg(long)]
        duration: Option<String>,

        /// Cover image
        #[arg(long)]
        cover: Option<PathBuf>,
    },

    /// List users (admins only)
    Users,

    /// Grant or revoke admin rights (admins only)
    Promote {
        user_id: i64,

        /// Revoke instead of grant
        #[arg(long)]
        revoke: bool,
    },

    /// Delete a user (admins only)
    DeleteUser { user_id: i64 },

    /// Start the interactive player
    Play,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cadence=info,cadence_cli=info,cadence_playback=info,cadence_server_client=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = CadenceConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    config.validate()?;

    let store = Arc::new(FileCredentialStore::new(config.storage.credentials_path.clone()));
    let session = Arc::new(AuthSession::new(store));
    let client = CadenceClient::new(config.server_config(), session)?;

    match cli.command {
        Commands::Login {
            identifier,
            password,
        } => {
            let user = client.login(&identifier, &password).await?;
            info!("Logged in as {}", user.username);
            println!("Logged in as {}", user.username);
        }
        Commands::Logout => {
            client.session().load().await?;
            client.logout().await?;
            println!("Logged out");
        }
        Commands::Register {
            email,
            username,
            password,
        } => {
            let message = client.register(&email, &username, &password).await?;
            println!("{message}");
        }
        Commands::Verify { email, code } => {
            let message = client.verify_email(&email, code).await?;
            println!("{message}");
        }
        Commands::Whoami => {
            let user = signed_in(&client).await?;
            let role = if user.is_admin() { " (admin)" } else { "" };
            println!("{} <{}>{role}", user.username, user.email);
        }
        Commands::Tracks { artist, title } => {
            signed_in(&client).await?;
            let tracks = match (artist, title) {
                (Some(artist), _) => client.tracks_by_artist(&artist).await?,
                (None, Some(title)) => client.tracks_by_title(&title).await?,
                (None, None) => client.list_tracks().await?,
            };

            if tracks.is_empty() {
                println!("No tracks");
            }
            for (i, track) in tracks.iter().enumerate() {
                let length = track.duration_hint.as_deref().unwrap_or("");
                println!("{:>3}. {} - {} {length}", i + 1, track.title, track.artist);
            }
        }
        Commands::Upload {
            file,
            title,
            artist,
            duration,
            cover,
        } => {
            signed_in(&client).await?;
            let mut upload = TrackUpload::new(title, artist, file);
            upload.duration = duration;
            upload.cover = cover;
            let track = client.upload_track(&upload).await?;
            println!("Uploaded {} - {} ({})", track.title, track.artist, track.id);
        }
        Commands::Users => {
            signed_in(&client).await?;
            for user in client.list_users().await? {
                let role = if user.is_admin() { " (admin)" } else { "" };
                println!("{:>5}  {} <{}>{role}", user.id, user.username, user.email);
            }
        }
        Commands::Promote { user_id, revoke } => {
            signed_in(&client).await?;
            let user = client.set_user_admin(user_id, !revoke).await?;
            let now = if user.is_admin() { "an admin" } else { "a regular user" };
            println!("{} is now {now}", user.username);
        }
        Commands::DeleteUser { user_id } => {
            signed_in(&client).await?;
            client.delete_user(user_id).await?;
            println!("Deleted user {user_id}");
        }
        Commands::Play => {
            signed_in(&client).await?;
            interactive::run(&client, &config).await?;
        }
    }

    Ok(())
}

/// Restore the saved session or explain how to get one
async fn signed_in(client: &CadenceClient) -> Result<cadence_server_client::UserProfile, CliError> {
    client.restore_session().await?.ok_or(CliError::NotLoggedIn)
}
