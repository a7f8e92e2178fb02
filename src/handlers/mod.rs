//! handlers/mod.rs
//! Módulo que agrupa los handlers del servidor de voz.

pub mod admin_handler;
pub mod voice_handler;
