use actix_web::{App, HttpServer, web};
use contact_portal::data::database::{Database, Store};
use contact_portal::infrastructure::config::{AppConfig, load_dotenv};
use contact_portal::infrastructure::logging::init_logging;
use contact_portal::presentation::handlers::AppState;
use contact_portal::presentation::middleware::RequestTracing;
use contact_portal::presentation::routes;
use contact_portal::presentation::session::SessionKeys;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `.env` may carry RUST_LOG, so it must be loaded before the subscriber.
    let env_file = load_dotenv();
    init_logging("info");
    if let Some(path) = &env_file {
        info!(path = %path.display(), "Loaded environment file");
    }

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e
    })?;
    info!(
        bind = %config.bind_addr(),
        users_db = %config.users_db_path.display(),
        contacts_db = %config.contacts_db_path.display(),
        "Configuration loaded"
    );

    let accounts = Arc::new(Database::open(&config.users_db_path, Store::Accounts)?);
    let contacts = Arc::new(Database::open(&config.contacts_db_path, Store::Contacts)?);

    let sessions = SessionKeys::new(
        config.session_secret.clone(),
        config.session_ttl_secs,
        config.secure_cookies,
    );
    let state = web::Data::new(AppState::new(accounts, contacts, sessions));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(RequestTracing)
            .configure(routes::configure)
    });

    let bind_addr = config.bind_addr();
    let server = server.bind((config.host.as_str(), config.port))?;
    info!(
        address = %bind_addr,
        routes = %"GET /, GET|POST /signup, GET|POST /login, GET|POST /contact, GET /sent, GET /logout, GET /health",
        "Starting HTTP server"
    );
    server.run().await?;

    info!("Server stopped");
    Ok(())
}
