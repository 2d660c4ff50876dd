use crate::presentation::handlers::{self, WebError};
use actix_web::web;
use tracing::warn;

const FORM_LIMIT_BYTES: usize = 16 * 1024;

/// Registers every route plus the form extractor config.
pub fn configure(cfg: &mut web::ServiceConfig) {
    let form_config = web::FormConfig::default()
        .limit(FORM_LIMIT_BYTES)
        .error_handler(|err, req| {
            warn!(path = %req.path(), error = %err, "Rejected form body");
            WebError::BadRequest(err.to_string()).into()
        });

    cfg.app_data(form_config)
        .route("/health", web::get().to(handlers::health_check))
        .route("/", web::get().to(handlers::home))
        .service(
            web::resource("/signup")
                .route(web::get().to(handlers::signup_form))
                .route(web::post().to(handlers::signup)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(handlers::login_form))
                .route(web::post().to(handlers::login)),
        )
        .service(
            web::resource("/contact")
                .route(web::get().to(handlers::contact_form))
                .route(web::post().to(handlers::contact)),
        )
        .route("/sent", web::get().to(handlers::sent))
        .route("/logout", web::get().to(handlers::logout));
}
