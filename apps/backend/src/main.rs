use actix_web::{web, App, HttpServer};
use backend::infra::state::build_state;
use backend::middleware::RequestTrace;
use backend::routes;
use backend::state::security_config::SecurityConfig;
use backend::telemetry;
use db_infra::config::db::DbConfig;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = match std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
    {
        Ok(port) => port,
        Err(_) => {
            error!("BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        }
    };

    let Some(security_config) = SecurityConfig::from_env() else {
        error!("NEXTAUTH_SECRET must be set");
        std::process::exit(1);
    };

    let db_config = DbConfig::from_env();
    info!(config = ?db_config, "resolving database");

    let app_state = match build_state()
        .with_db(db_config)
        .with_security(security_config)
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    info!(%host, port, db = app_state.db().is_some(), "starting meal tracker backend");

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
