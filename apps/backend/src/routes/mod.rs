use actix_web::web;

pub mod admin;
pub mod health;
pub mod profile;
pub mod tags;

/// Register every route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(health::configure_routes)
            .service(web::scope("/profile").configure(profile::configure_routes))
            .service(web::scope("/tags").configure(tags::configure_routes))
            .service(web::scope("/admin").configure(admin::configure_routes)),
    );
}
