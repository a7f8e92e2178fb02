//! config/app_config.rs
//! Estructuras de configuración leídas del entorno, con valores por defecto.

use anyhow::{anyhow, Result};
use std::env;

/// Configuración del servidor de voz (entrante).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base pública para construir URLs absolutas de /audio
    /// (ej. "https://mi-app.onrender.com"). Si falta, se usa la
    /// información de conexión del request.
    pub public_base_url: Option<String>,
    /// Carpeta local de donde se sirven los archivos de audio.
    pub audio_dir: String,
    /// Cantidad de dígitos DTMF que pide el Gather.
    pub gather_digits: u32,
    /// Segundos de espera de entrada en el Gather.
    pub gather_timeout_secs: u32,
    pub port: u16,
    /// JSON con los datos iniciales de códigos seriales.
    pub serial_codes_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            public_base_url: None,
            audio_dir: ".".to_string(),
            gather_digits: 4,
            gather_timeout_secs: 10,
            port: 5000,
            serial_codes_file: "serial_codes.json".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            public_base_url: env::var("PUBLIC_BASE_URL").ok().filter(|v| !v.is_empty()),
            audio_dir: env::var("AUDIO_DIR").unwrap_or(defaults.audio_dir),
            gather_digits: env_u32("GATHER_DIGITS", defaults.gather_digits),
            gather_timeout_secs: env_u32("GATHER_TIMEOUT_SECS", defaults.gather_timeout_secs),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            serial_codes_file: env::var("SERIAL_CODES_FILE").unwrap_or(defaults.serial_codes_file),
        }
    }
}

/// Credenciales y parámetros de Twilio para el dispatcher.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Número de origen (formato E.164).
    pub from_number: String,
    /// TwiML Bin que reproduce el audio; se le agrega ?AudioUrl=...
    pub twiml_bin_url: String,
}

impl TwilioConfig {
    pub fn from_env() -> Result<Self> {
        let account_sid = env::var("TWILIO_ACCOUNT_SID").unwrap_or_default();
        let auth_token = env::var("TWILIO_AUTH_TOKEN").unwrap_or_default();
        if account_sid.is_empty() || auth_token.is_empty() {
            return Err(anyhow!(
                "Define TWILIO_ACCOUNT_SID y TWILIO_AUTH_TOKEN en el entorno"
            ));
        }
        let twiml_bin_url = env::var("TWILIO_TWIML_BIN_URL").unwrap_or_default();
        if twiml_bin_url.is_empty() {
            return Err(anyhow!(
                "TWILIO_TWIML_BIN_URL no está definido. Revisa tu .env"
            ));
        }
        Ok(TwilioConfig {
            account_sid,
            auth_token,
            from_number: env::var("TWILIO_PHONE_NUMBER").unwrap_or_default(),
            twiml_bin_url,
        })
    }
}

/// Política de reintentos y ritmo del dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// DRY_RUN=true: no se llama de verdad, solo se registra.
    pub dry_run: bool,
    pub max_retry_count: i64,
    pub retry_interval_minutes: i64,
    /// Espera entre crear la llamada y consultar su estado (el AMD tarda).
    pub status_poll_delay_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        DispatchConfig {
            dry_run: true,
            max_retry_count: 3,
            retry_interval_minutes: 5,
            status_poll_delay_secs: 5,
        }
    }
}

impl DispatchConfig {
    pub fn from_env() -> Self {
        let defaults = DispatchConfig::default();
        DispatchConfig {
            dry_run: env::var("DRY_RUN")
                .map(|v| v.to_lowercase() == "true")
                .unwrap_or(defaults.dry_run),
            max_retry_count: env_i64("MAX_RETRY_COUNT", defaults.max_retry_count),
            retry_interval_minutes: env_i64(
                "RETRY_INTERVAL_MINUTES",
                defaults.retry_interval_minutes,
            ),
            status_poll_delay_secs: env::var("STATUS_POLL_DELAY_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.status_poll_delay_secs),
        }
    }
}

fn env_u32(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
