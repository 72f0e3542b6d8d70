//! Module wiring: repositories, media storage, service and routes

use crate::config::Config;
use crate::domain::{Repositories, Service};
use crate::infra::media::LocalMediaStorage;
use crate::infra::storage::repositories::{
    SeaOrmApplicationRepository, SeaOrmProjectRepository, SeaOrmSoftwareRepository,
    SeaOrmTagRepository, SeaOrmToolRepository, SeaOrmUserRepository,
};
use anyhow::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

/// Project catalog module
pub struct CatalogModule {
    config: Config,
    service: Arc<Service>,
}

impl CatalogModule {
    /// Build the module on an open database connection
    pub fn init(db: DatabaseConnection, config: Config) -> Result<Self> {
        config.validate()?;

        let conn = Arc::new(db);

        // Build repositories
        let repos = Repositories {
            users: Arc::new(SeaOrmUserRepository::new(conn.clone())),
            tags: Arc::new(SeaOrmTagRepository::new(conn.clone())),
            applications: Arc::new(SeaOrmApplicationRepository::new(conn.clone())),
            tools: Arc::new(SeaOrmToolRepository::new(conn.clone())),
            softwares: Arc::new(SeaOrmSoftwareRepository::new(conn.clone())),
            projects: Arc::new(SeaOrmProjectRepository::new(conn)),
        };
        let media = Arc::new(LocalMediaStorage::new(config.media_root.clone()));

        // Build domain service
        let service = Arc::new(Service::new(repos, media, &config));

        tracing::info!(media_root = %config.media_root.display(), "Project catalog initialized");
        Ok(Self { config, service })
    }

    /// Apply pending database migrations
    pub async fn migrate(db: &DatabaseConnection) -> Result<()> {
        use crate::infra::storage::migrations::Migrator;
        use sea_orm_migration::MigratorTrait;

        Migrator::up(db, None).await?;
        tracing::info!("Project catalog migrations completed");
        Ok(())
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// Mount the REST API onto `router`
    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        tracing::info!("Registering project catalog REST routes");
        crate::api::rest::routes::register_routes(
            router,
            self.service.clone(),
            self.config.max_upload_size,
        )
    }
}
