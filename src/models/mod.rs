//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod reservation_model;
pub mod serial_code_model;
