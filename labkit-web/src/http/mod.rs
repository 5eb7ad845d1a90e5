//! HTTP service for the signal demo

pub mod handlers;
pub mod models;
pub mod routes;

use actix_web::{App, HttpServer, middleware, web};
use handlers::AppState;
use labkit_core::Session;
use labkit_core::signal::SignalDerivation;
use std::io;

/// HTTP server around one shared signal session.
pub struct LabServer {
    state: web::Data<AppState>,
    bind_address: String,
}

impl LabServer {
    pub fn new(session: Session<SignalDerivation>, bind_address: String) -> Self {
        Self { state: web::Data::new(AppState::new(session)), bind_address }
    }

    /// Binds and serves until shutdown.
    ///
    /// One worker: every request locks the same session, so extra workers
    /// would only wait on each other.
    pub async fn run(self) -> io::Result<()> {
        log::info!("Starting HTTP server at http://{}", self.bind_address);

        let state = self.state.clone();
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(middleware::Logger::default())
                .configure(routes::configure)
        })
        .workers(1)
        .bind(&self.bind_address)?
        .run()
        .await
    }
}
