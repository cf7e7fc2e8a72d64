//! HTTP handlers and route configuration.

mod health;
mod posts;

use actix_web::web;

use crate::middleware::error::AppError;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let json = web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into());

    cfg.app_data(json).service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .route("/status", web::get().to(posts::status))
            .route("/feed", web::get().to(posts::feed))
            .service(
                web::resource("/posts")
                    .route(web::get().to(posts::list))
                    .route(web::post().to(posts::submit)),
            ),
    );
}
