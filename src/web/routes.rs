use actix_web::{web, Resource};
use crate::web::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    configure_api(cfg);
    cfg.route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health_check));
}

/// Largest chat body accepted, in bytes. Matches the 4 MiB request cap of the
/// serverless host the site was first deployed on.
pub const CHAT_BODY_LIMIT: usize = 4 * 1024 * 1024;

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::PayloadConfig::new(CHAT_BODY_LIMIT))
            .service(chat_resource("/chat-proxy"))
            .service(chat_resource("/twekee-faq")),
    );
}

// POST only; every other method gets a JSON 405
fn chat_resource(path: &str) -> Resource {
    web::resource(path)
        .route(web::post().to(handlers::chat_proxy))
        .default_service(web::route().to(handlers::method_not_allowed))
}
