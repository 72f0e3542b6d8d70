//! Project Catalog HTTP server

mod config;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use clap::{Parser, Subcommand};
use config::{AppConfig, DatabaseConfig, LoggingConfig};
use project_catalog::CatalogModule;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::path::PathBuf;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "catalog-server", version, about = "Project catalog HTTP server")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run migrations and serve the REST API (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create a staff account
    CreateStaff {
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&config.logging)?;

    let db = connect(&config.database).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(db, config).await,
        Command::Migrate => CatalogModule::migrate(&db).await,
        Command::CreateStaff {
            email,
            username,
            password,
            name,
        } => {
            CatalogModule::migrate(&db).await?;
            let module = CatalogModule::init(db, config.catalog)?;
            let user = module
                .service()
                .create_staff_user(&email, &username, &password, &name)
                .await
                .context("creating staff user")?;
            info!(user_id = user.id, username = %user.username, "Staff user created");
            Ok(())
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .context("invalid log filter")?;

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json {
        registry.with(tracing_subscriber::fmt::layer().json()).try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }
    Ok(())
}

async fn connect(database: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(database.url.clone());
    options
        .max_connections(database.max_connections)
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("connecting to {}", database.url))?;
    info!(backend = ?db.get_database_backend(), "Connected to database");
    Ok(db)
}

async fn serve(db: DatabaseConnection, config: AppConfig) -> Result<()> {
    CatalogModule::migrate(&db).await?;

    tokio::fs::create_dir_all(&config.catalog.media_root)
        .await
        .with_context(|| format!("creating {}", config.catalog.media_root.display()))?;

    let module = CatalogModule::init(db, config.catalog)?;

    let app = module
        .register_rest(Router::new().route("/health", get(health_check)))
        .layer(TimeoutLayer::new(config.server.request_timeout))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.server.bind_addr))?;
    info!(addr = %listener.local_addr()?, "Project catalog listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
