//! app.rs
//! Rutas del servidor de voz. Van en la raíz (sin /api) porque Twilio
//! se configura apuntando directamente a /voice.

use crate::handlers::{admin_handler, voice_handler};
use actix_web::web;

pub fn init_app(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(admin_handler::index_endpoint))
        .route("/voice", web::get().to(voice_handler::voice_endpoint))
        .route("/voice", web::post().to(voice_handler::voice_endpoint))
        .route(
            "/check_code",
            web::post().to(voice_handler::check_code_endpoint),
        )
        .route(
            "/audio/{filename}",
            web::get().to(voice_handler::serve_audio_endpoint),
        )
        .route(
            "/admin/reset_code/{code}",
            web::get().to(admin_handler::reset_code_endpoint),
        )
        .route(
            "/admin/reset_all",
            web::get().to(admin_handler::reset_all_endpoint),
        );
}
