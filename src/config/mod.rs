//! config/mod.rs
//! Configuración por variables de entorno (.env) para ambos binarios.

pub mod app_config;
pub mod audio_map;
