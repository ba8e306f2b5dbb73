use std::net::TcpListener;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use calc_api::auth::RevocationList;
use calc_api::configuration::get_configuration;
use calc_api::repository::{PgCalculationRepository, PgUserRepository};
use calc_api::startup::run;
use calc_api::store::RedisTokenStore;
use calc_api::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    let configuration = get_configuration().expect("Failed to read configuration");

    let connection_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to connect to Postgres: {}", e),
            )
        })?;

    let token_store = RedisTokenStore::connect(&configuration.redis.url)
        .await
        .map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to connect to Redis: {}", e),
            )
        })?;

    let users = Arc::new(PgUserRepository::new(connection_pool.clone()));
    let calculations = Arc::new(PgCalculationRepository::new(connection_pool));
    let revocations = RevocationList::new(Arc::new(token_store));

    let address = format!("0.0.0.0:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!(%address, "Starting server");

    run(
        listener,
        users,
        calculations,
        revocations,
        configuration.jwt,
    )?
    .await
}
