use std::io::Read;

use anyhow::{Context as AnyhowContext, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};
use dentaldesk::{
    auth::hash_password,
    config::{Config, StorageBackend},
    db::PatientStore,
    logging,
    services::next_patient_id,
    startup,
    state::{create_db_pool, AppState, AppStateOptions},
};
use dentaldesk_models::NewUser;

#[derive(Parser)]
#[command(
    name = "dentaldesk",
    about = "Operator tasks for a DentalDesk installation",
    version,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stored form (`hash.salt`) of a password.
    HashPassword {
        /// Password to hash. Read from stdin when omitted.
        password: Option<String>,
    },

    /// Create a login account in the configured store.
    CreateUser {
        username: String,
        /// Password for the account. Read from stdin when omitted.
        #[arg(long)]
        password: Option<String>,
        /// Display name; defaults to the username.
        #[arg(long)]
        full_name: Option<String>,
        /// Role label; defaults to `staff`.
        #[arg(long)]
        role: Option<String>,
    },

    /// Insert any missing default settings. Existing settings are left alone.
    SeedSettings,

    /// Show the patient ID the next registration would receive.
    NextPatientId {
        /// Compute for this year instead of the current one.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Apply pending database migrations.
    Migrate,

    /// Print CLI version.
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::HashPassword { password } => {
            let password = password_or_stdin(password)?;
            println!("{}", hash_password(&password)?);
        }
        Commands::CreateUser {
            username,
            password,
            full_name,
            role,
        } => {
            let password = password_or_stdin(password)?;
            run_create_user(NewUser {
                username,
                password,
                full_name,
                role,
            })
            .await?;
        }
        Commands::SeedSettings => run_seed_settings().await?,
        Commands::NextPatientId { year } => run_next_patient_id(year).await?,
        Commands::Migrate => run_migrate().await?,
    }

    Ok(())
}

fn password_or_stdin(password: Option<String>) -> Result<String> {
    if let Some(p) = password {
        return Ok(p);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read password from stdin")?;
    let password = buf.trim_end_matches(['\r', '\n']).to_string();
    anyhow::ensure!(!password.is_empty(), "Password must not be empty");
    Ok(password)
}

/// Configuration plus the logging guard that must outlive the command.
fn load_config() -> Result<(Config, logging::LoggingGuard)> {
    let config = Config::load().context("Failed to load configuration")?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;
    let guard = logging::init_logging(&config.logging).context("Failed to initialize logging")?;
    if config.storage.backend == StorageBackend::Memory {
        tracing::warn!("storage.backend is `memory`; changes made here are not persisted");
    }
    Ok((config, guard))
}

async fn open_state(config: Config) -> Result<AppState> {
    let options = AppStateOptions {
        run_migrations: false,
        seed_settings: false,
    };
    AppState::new_with_options(config, options)
        .await
        .context("Failed to open the clinic store")
}

async fn run_create_user(new_user: NewUser) -> Result<()> {
    let (config, _log_guard) = load_config()?;
    let state = open_state(config).await?;

    let user = state
        .sessions
        .register(new_user)
        .await
        .context("Failed to create user")?;
    println!(
        "{}",
        serde_json::to_string_pretty(&dentaldesk_models::PublicUser::from(&user))?
    );
    Ok(())
}

async fn run_seed_settings() -> Result<()> {
    let (config, _log_guard) = load_config()?;
    let state = open_state(config).await?;

    let created = state
        .settings_service
        .seed_defaults()
        .await
        .context("Failed to seed settings")?;
    if created.is_empty() {
        println!("All default settings already present");
    } else {
        println!("Created: {}", created.join(", "));
    }
    Ok(())
}

async fn run_next_patient_id(year: Option<i32>) -> Result<()> {
    let (config, _log_guard) = load_config()?;
    let state = open_state(config).await?;

    let format = state.settings_service.patient_id_format().await?;
    let existing = state.store.list_patient_ids().await?;
    let year = year.unwrap_or_else(|| chrono::Utc::now().year());
    println!("{}", next_patient_id(&format, year, &existing));
    Ok(())
}

async fn run_migrate() -> Result<()> {
    let (config, _log_guard) = load_config()?;
    anyhow::ensure!(
        config.storage.backend == StorageBackend::Postgres,
        "Migrations only apply to the postgres backend"
    );

    let pool = create_db_pool(&config)
        .await
        .context("Failed to connect to the database")?;
    startup::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;
    println!("Migrations applied");
    Ok(())
}
