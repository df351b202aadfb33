use crate::infrastructure::config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{info, instrument};

/// Kept low; the service issues one short statement per request.
const MAX_CONNECTIONS: u32 = 5;

/// Owns the process's database handle from startup until `close`.
pub struct Database {
    pool: PgPool,
}

impl Database {
    #[instrument(skip(config), fields(host = %config.host, port = config.port, database = %config.name))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let options = connect_options(config)?;
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        info!("Database connection established");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}

fn connect_options(config: &DatabaseConfig) -> Result<PgConnectOptions, sqlx::Error> {
    // A full URL wins over the individual fields
    if let Some(url) = &config.url {
        return url.parse();
    }
    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name))
}
