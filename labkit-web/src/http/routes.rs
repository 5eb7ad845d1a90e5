//! Route table

use super::handlers;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/control", web::post().to(handlers::set_control))
        .route("/reset", web::post().to(handlers::reset))
        .route("/api/frame", web::get().to(handlers::frame));
}
