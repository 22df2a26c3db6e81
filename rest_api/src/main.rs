use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rest_api::config::load_rest_api_config;
use rest_api::{audit_role_records, configure_routes};
use security::JwtKeys;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_file = std::env::args().nth(1).map(PathBuf::from);
    let config = load_rest_api_config(config_file.as_deref())?;

    if let Some(roles_file) = &config.roles_file {
        match audit_role_records(roles_file) {
            Ok(drifts) if !drifts.is_empty() => {
                warn!(count = drifts.len(), "Role records differ from the built-in role table; only the built-in table grants access");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Skipping role record audit"),
        }
    }

    let keys = Arc::new(JwtKeys::new(config.jwt_secret.as_bytes()));
    let addr = (config.host.clone(), config.port);
    info!("Dialysis clinic authorization API starting on http://{}:{}", addr.0, addr.1);

    HttpServer::new(move || {
        let keys = Arc::clone(&keys);
        App::new()
            .wrap(Logger::default())
            .app_data(web::JsonConfig::default().limit(64 * 1024))
            .configure(move |cfg| configure_routes(cfg, keys))
    })
    .bind(addr.clone())
    .with_context(|| format!("Failed to bind {}:{}", addr.0, addr.1))?
    .run()
    .await
    .context("REST API server stopped with an error")
}
