//! models/reservation_model.rs
//! Estructuras de las reservas de llamadas salientes.

use serde::{Deserialize, Serialize};

/// Estados posibles de una reserva.
pub const STATUS_WAITING: &str = "waiting";
pub const STATUS_CALLED: &str = "called";
pub const STATUS_ERROR: &str = "error";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CallReservationRecord {
    /// order_id del CSV; clave del upsert.
    pub id: String,
    /// Ya normalizado a E.164 (+81...).
    pub phone_number: String,
    pub oshi_name: String,
    pub preferred_date: String,
    pub time_slot: String,
    /// RFC3339 en JST; comparable como texto.
    pub scheduled_at: String,
    pub status: String,
    pub retry_count: i64,
    pub last_call_status: Option<String>,
    pub error_message: Option<String>,
    pub called_at: Option<String>,
}

/// Fila del CSV de entrada.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportRow {
    pub order_id: String,
    pub phone_number: String,
    pub oshi_name: String,
    pub preferred_date: String,
    pub time_slot: String,
}

/// Columnas que el CSV debe traer sí o sí.
pub const REQUIRED_CSV_COLUMNS: [&str; 5] = [
    "order_id",
    "phone_number",
    "oshi_name",
    "preferred_date",
    "time_slot",
];

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub imported: u64,
    pub skipped: u64,
    pub errors: u64,
}

/// Llamada tal como la reporta la API REST de Twilio.
#[derive(Debug, Clone, Deserialize)]
pub struct CallResource {
    pub sid: String,
    /// queued, ringing, in-progress, completed, busy, no-answer, failed...
    pub status: String,
    /// Resultado del AMD: human, machine_end_beep, fax, unknown...
    pub answered_by: Option<String>,
}
