use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use enduser_api::application::service::UserService;
use enduser_api::data::memory::InMemoryUserRepository;
use enduser_api::data::postgres::PgUserRepository;
use enduser_api::domain::repository::UserRepository;
use enduser_api::infrastructure::config::{AppConfig, StoreBackend};
use enduser_api::infrastructure::database::Database;
use enduser_api::infrastructure::logging::init_logging;
use enduser_api::presentation::handlers::AppState;
use enduser_api::presentation::middleware::RequestLogMiddleware;
use enduser_api::presentation::routes;
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};

const EXIT_CONFIG_ERROR: i32 = 2;
const EXIT_CONNECTION_ERROR: i32 = 3;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Initialize logging
    init_logging();

    // Load configuration from the environment and .env
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            process::exit(EXIT_CONFIG_ERROR);
        }
    };

    // Open the store; an unreachable database is fatal
    let (repository, database): (Arc<dyn UserRepository>, Option<Database>) = match config.backend
    {
        StoreBackend::Postgres => {
            info!(
                host = %config.database.host,
                port = config.database.port,
                database = %config.database.name,
                "Connecting to database"
            );
            let database = match Database::connect(&config.database).await {
                Ok(database) => database,
                Err(e) => {
                    error!(error = %e, "Unexpected connection error");
                    process::exit(EXIT_CONNECTION_ERROR);
                }
            };
            let repository: Arc<dyn UserRepository> =
                Arc::new(PgUserRepository::new(database.pool()));
            (repository, Some(database))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory user store; data is lost on shutdown");
            let repository: Arc<dyn UserRepository> = Arc::new(InMemoryUserRepository::new());
            (repository, None)
        }
    };

    let state = web::Data::new(AppState {
        service: UserService::new(repository),
    });

    // Configure HTTP server
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(RequestLogMiddleware)
            .wrap(cors)
            .configure(routes::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?;

    info!(
        host = %config.server.host,
        port = config.server.port,
        routes = %"GET /health, POST /enduser, GET|PUT|DELETE /enduser/{email}",
        "Starting HTTP server"
    );
    let result = server.run().await;

    // Release the pool once the server has drained
    if let Some(database) = database {
        database.close().await;
    }
    info!("Server stopped");
    result
}
