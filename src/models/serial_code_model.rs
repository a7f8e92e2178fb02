//! models/serial_code_model.rs
//! Estructuras del código serial que habilita una reproducción de audio.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SerialCodeRecord {
    pub code: String,
    /// URL absoluta (http/https) o nombre de archivo servido por /audio/.
    pub audio_url: String,
    pub used: bool,
}

/// Entrada del archivo de seed (serial_codes.json).
#[derive(Debug, Clone, Deserialize)]
pub struct SerialCodeSeed {
    pub audio_url: String,
    #[serde(default)]
    pub used: bool,
}

/// Resultado de intentar canjear un código.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemOutcome {
    NotFound,
    AlreadyUsed,
    /// Canje exitoso; lleva la audio_url tal cual está en la tabla.
    Redeemed(String),
}

/// Resultado del reset administrativo de un código.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    NotFound,
    AlreadyUnused,
    Reset,
}
