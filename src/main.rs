use anyhow::Result;
use clap::{Parser, Subcommand};
use guardian::app_context::AppContext;
use guardian::config::AppConfig;
use guardian::database::entities::users::UserRole;
use guardian::database::{establish_connection, get_database_url};
use guardian::server;
use std::path::PathBuf;
use tracing::info;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Serve {
        #[clap(short, long)]
        port: Option<u16>,
        #[clap(short, long)]
        database: Option<String>,
        #[clap(long)]
        cors_origin: Option<String>,
        #[clap(long)]
        storage_root: Option<PathBuf>,
    },
    Migrate {
        #[clap(subcommand)]
        direction: server::MigrateDirection,
        #[clap(short, long, global = true)]
        database: Option<String>,
    },
    User {
        #[clap(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommands {
    /// Create an account; `--admin` grants the admin role.
    Create {
        #[clap(long)]
        email: String,
        #[clap(long)]
        name: String,
        #[clap(long)]
        admin: bool,
        #[clap(short, long)]
        database: Option<String>,
    },
    /// Issue a session and print its bearer token.
    Session {
        #[clap(long)]
        email: String,
        #[clap(short, long)]
        database: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    let mut config = AppConfig::from_env()?;

    match args.command {
        Commands::Serve {
            port,
            database,
            cors_origin,
            storage_root,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(database) = database {
                config.database = database;
            }
            if cors_origin.is_some() {
                config.cors_origin = cors_origin;
            }
            if let Some(root) = storage_root {
                config.storage_root = root;
            }
            info!("Starting server on port {}", config.port);
            server::start_server(config).await?;
        }
        Commands::Migrate {
            direction,
            database,
        } => {
            let database = database.unwrap_or(config.database);
            info!("Running database migration: {:?}", direction);
            server::migrate_database(&database, direction).await?;
        }
        Commands::User { command } => match command {
            UserCommands::Create {
                email,
                name,
                admin,
                database,
            } => {
                if let Some(database) = database {
                    config.database = database;
                }
                let context = open_context(&config).await?;
                let role = if admin { UserRole::Admin } else { UserRole::User };
                let user = context.users().create_user(&email, &name, role).await?;
                info!("Created user {} ({})", user.email, user.id);
            }
            UserCommands::Session { email, database } => {
                if let Some(database) = database {
                    config.database = database;
                }
                let context = open_context(&config).await?;
                let session = context.users().issue_session(&email).await?;
                info!("Session expires at {}", session.expires_at);
                println!("{}", session.session_id);
            }
        },
    }

    Ok(())
}

async fn open_context(config: &AppConfig) -> Result<AppContext> {
    let db = establish_connection(&get_database_url(Some(&config.database))).await?;
    Ok(AppContext::new(db, config))
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .unwrap_or(&"info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("sqlx=warn,{}", log_level)))
        .without_time()
        .init();
}
