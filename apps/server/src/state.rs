//! Shared application state

use crate::{
    auth::SessionManager,
    config::{Config, StorageBackend},
    db::{ClinicStore, MemoryStore, PostgresStore},
    services::{
        AppointmentService, InvoiceService, LabService, PatientService, SettingsService,
        UploadService, VisitService,
    },
    Result,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppStateOptions {
    pub run_migrations: bool,
    /// Insert missing default settings at startup.
    pub seed_settings: bool,
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
            seed_settings: true,
        }
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ClinicStore>,
    pub sessions: Arc<SessionManager>,
    pub patient_service: Arc<PatientService>,
    pub visit_service: Arc<VisitService>,
    pub appointment_service: Arc<AppointmentService>,
    pub invoice_service: Arc<InvoiceService>,
    pub lab_service: Arc<LabService>,
    pub settings_service: Arc<SettingsService>,
    pub upload_service: Arc<UploadService>,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        let options = AppStateOptions {
            run_migrations: config.storage.run_migrations,
            ..AppStateOptions::default()
        };
        Self::new_with_options(config, options).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!(backend = ?config.storage.backend, "Initializing application state...");

        let store: Arc<dyn ClinicStore> = match config.storage.backend {
            StorageBackend::Postgres => {
                let db_pool = create_db_pool(&config).await?;
                if options.run_migrations {
                    crate::startup::run_migrations(&db_pool).await?;
                }
                Arc::new(PostgresStore::new(db_pool))
            }
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let state = Self::from_store(config, store);
        if options.seed_settings {
            state.settings_service.seed_defaults().await?;
        }

        tracing::info!("Application state initialized successfully");
        Ok(state)
    }

    /// Wire every service over an existing store.
    pub fn from_store(config: Config, store: Arc<dyn ClinicStore>) -> Self {
        let config = Arc::new(config);

        let settings_service = Arc::new(SettingsService::new(store.clone()));
        let patient_service = Arc::new(PatientService::new(
            store.clone(),
            settings_service.clone(),
        ));
        let visit_service = Arc::new(VisitService::new(store.clone()));
        let appointment_service = Arc::new(AppointmentService::new(
            store.clone(),
            config.billing.clone(),
        ));
        let invoice_service = Arc::new(InvoiceService::new(store.clone()));
        let lab_service = Arc::new(LabService::new(store.clone()));
        let upload_service = Arc::new(UploadService::new(
            &config.uploads.directory,
            visit_service.clone(),
            settings_service.clone(),
        ));
        let sessions = Arc::new(SessionManager::new(store.clone(), &config.auth));

        Self {
            config,
            store,
            sessions,
            patient_service,
            visit_service,
            appointment_service,
            invoice_service,
            lab_service,
            settings_service,
            upload_service,
        }
    }

    /// State over a fresh [`MemoryStore`], for tests and local experiments.
    pub fn in_memory(config: Config) -> Self {
        Self::from_store(config, Arc::new(MemoryStore::new()))
    }
}

pub async fn create_db_pool(config: &Config) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.database.statement_timeout_seconds;
    let lock_timeout = config.database.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;

                // Fail fast instead of queueing behind long locks.
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;

                Ok(())
            })
        })
        .connect(&config.database.url)
        .await
        .map_err(crate::Error::Database)?;

    tracing::info!(
        "Database pool created (min: {}, max: {})",
        config.database.pool_min_size,
        config.database.pool_max_size
    );

    Ok(pool)
}
