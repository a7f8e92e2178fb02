//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod dispatch_service;
pub mod import_service;
pub mod reservation_service;
pub mod scheduling;
pub mod serial_code_service;
pub mod twilio_service;
pub mod twiml;
