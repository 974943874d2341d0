use std::net::TcpListener;
use std::sync::Arc;

use chirpy::auth::{AccessTokenCodec, PasswordHasher};
use chirpy::configuration::get_configuration;
use chirpy::session::SessionService;
use chirpy::startup::run;
use chirpy::store::PostgresStore;
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    tracing::info!(
        host = %configuration.database.host,
        database = %configuration.database.database_name,
        "Attempting to connect to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
    })?;

    tracing::info!("Database ready");

    // The signing secret is read once here and never changes afterwards.
    let sessions = SessionService::new(
        Arc::new(PostgresStore::new(pool)),
        AccessTokenCodec::new(configuration.jwt.secret.as_bytes()),
        PasswordHasher::default(),
    );

    let address = configuration.application.address();
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(listener, sessions)?;
    server.await
}
