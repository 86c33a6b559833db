use dotenvy::dotenv;
use nuoi_em::{
    api::{self, AppState},
    config::{database, settings},
    errors::Result,
    gateway::payos::PayOsClient,
    storage::cloudinary::CloudinaryClient,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_PATH: &str = "config.toml";

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = settings::load_app_configuration(CONFIG_PATH)
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect to the database and make sure the schema exists
    let db = database::create_connection(&app_config.file.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database schema ready"))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. External service clients
    let gateway = PayOsClient::new(&app_config.file.payos_base_url, &app_config.payos)?;
    let storage = CloudinaryClient::new(
        &app_config.file.cloudinary_base_url,
        &app_config.file.upload_folder,
        app_config.cloudinary.clone(),
    )?;

    // 6. Serve
    let state = AppState::new(
        db,
        Arc::new(gateway),
        Arc::new(storage),
        &app_config.file.public_base_url,
        &app_config.admin_token,
    );
    let app = api::router(state, app_config.file.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(&app_config.file.bind_address).await?;
    info!("Listening on {}", app_config.file.bind_address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
