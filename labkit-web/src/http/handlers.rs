//! Request handlers

use super::models::{ControlForm, FrameResponse};
use crate::render;
use actix_web::http::header;
use actix_web::{HttpResponse, web};
use labkit_core::signal::{SignalDerivation, SignalFrame};
use labkit_core::{ControlEvent, LabError, Session, Snapshot};
use parking_lot::Mutex;

/// The session and its last rendered frame.
pub struct SignalLab {
    pub session: Session<SignalDerivation>,
    pub sink: Snapshot<SignalFrame>,
}

/// Application state shared by all requests.
pub struct AppState {
    lab: Mutex<SignalLab>,
}

impl AppState {
    /// Wraps `session` and renders its initial frame.
    pub fn new(session: Session<SignalDerivation>) -> Self {
        let mut sink = Snapshot::default();
        session.refresh(&mut sink);
        Self { lab: Mutex::new(SignalLab { session, sink }) }
    }

    /// Runs one cycle under the lock.
    fn apply(&self, event: ControlEvent) -> labkit_core::Result<()> {
        let mut lab = self.lab.lock();
        let SignalLab { session, sink } = &mut *lab;
        session.apply(event, sink)
    }

    /// Parses the textual `raw` value for control `name` and applies it.
    fn apply_raw(&self, name: &str, raw: &str) -> labkit_core::Result<()> {
        let value = {
            let lab = self.lab.lock();
            let spec = lab.session.store().spec(name)?;
            spec.domain.parse(name, raw)?
        };
        self.apply(ControlEvent::set(name, value))
    }
}

fn back_to_page() -> HttpResponse {
    HttpResponse::SeeOther().insert_header((header::LOCATION, "/")).finish()
}

fn rejected(e: &LabError) -> HttpResponse {
    HttpResponse::BadRequest()
        .content_type("text/plain; charset=utf-8")
        .body(e.to_string())
}

/// The demo page.
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    let lab = state.lab.lock();
    let html = render::page(lab.session.store(), lab.sink.frame());
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(html)
}

/// Updates one control.
pub async fn set_control(form: web::Form<ControlForm>, state: web::Data<AppState>) -> HttpResponse {
    let ControlForm { name, value } = form.into_inner();
    match state.apply_raw(&name, &value) {
        Ok(()) => back_to_page(),
        Err(e) => {
            log::warn!("Rejected {}={}: {}", name, value, e);
            rejected(&e)
        }
    }
}

/// Restores every control to its default.
pub async fn reset(state: web::Data<AppState>) -> HttpResponse {
    match state.apply(ControlEvent::Reset) {
        Ok(()) => back_to_page(),
        Err(e) => rejected(&e),
    }
}

/// The current parameters and frame as JSON.
pub async fn frame(state: web::Data<AppState>) -> HttpResponse {
    let lab = state.lab.lock();
    let body = FrameResponse {
        params: lab.session.store().snapshot(),
        frame: lab.sink.current(),
        error: lab.sink.failure().map(ToString::to_string),
        renders: lab.sink.renders(),
    };
    HttpResponse::Ok().json(body)
}
