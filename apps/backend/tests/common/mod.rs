#![allow(dead_code)]

use std::time::SystemTime;

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App};
use backend::middleware::RequestTrace;
use backend::repos::users::{self, User};
use backend::routes;
use backend::state::app_state::AppState;
use backend::state::security_config::SecurityConfig;
use backend::mint_token;
use backend_test_support::sqlite::TempSqlite;
use migration::{migrate, LedgerMode, MigrationCommand};

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

pub fn security() -> SecurityConfig {
    SecurityConfig::new(TEST_SECRET.as_bytes())
}

/// Temp SQLite database with every schema change applied.
pub async fn migrated_db() -> TempSqlite {
    let db = TempSqlite::new().await;
    migrate(db.conn(), MigrationCommand::Up, LedgerMode::Off)
        .await
        .expect("migrate temp database");
    db
}

pub fn state_for(db: &TempSqlite) -> AppState {
    AppState::new(db.conn().clone(), security())
}

pub async fn seed_user(db: &TempSqlite, username: &str, role: &str) -> User {
    users::create_user(db.conn(), username, Some(role))
        .await
        .expect("seed user")
}

pub fn bearer_for(user: &User) -> String {
    let token =
        mint_token(user.id, &user.username, SystemTime::now(), &security()).expect("mint token");
    format!("Bearer {token}")
}

pub async fn test_app(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>
{
    test::init_service(
        App::new()
            .wrap(RequestTrace)
            .app_data(web::Data::new(state))
            .configure(routes::configure),
    )
    .await
}

