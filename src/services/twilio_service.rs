//! services/twilio_service.rs
//! Cliente mínimo de la API REST de Twilio (crear llamada y consultar
//! su estado), con detección de contestador (AMD) habilitada.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::config::app_config::TwilioConfig;
use crate::models::reservation_model::CallResource;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Parámetros de AMD que usaba el proyecto original.
const MACHINE_DETECTION: &str = "DetectMessageEnd";
const MACHINE_DETECTION_TIMEOUT_SECS: &str = "30";
const MACHINE_DETECTION_SPEECH_THRESHOLD_MS: &str = "2400";
const MACHINE_DETECTION_SPEECH_END_THRESHOLD_MS: &str = "1200";
const MACHINE_DETECTION_SILENCE_TIMEOUT_MS: &str = "5000";

#[derive(Clone)]
pub struct TwilioService {
    http_client: Client,
    config: TwilioConfig,
    api_base: String,
}

impl TwilioService {
    pub fn new(config: TwilioConfig) -> Self {
        TwilioService {
            http_client: Client::new(),
            config,
            api_base: TWILIO_API_BASE.to_string(),
        }
    }

    /// URL TwiML que reproducirá el audio: el TwiML Bin recibe la URL
    /// del archivo como query param.
    pub fn twiml_url_for(&self, audio_url: &str) -> String {
        format!(
            "{}?AudioUrl={}",
            self.config.twiml_bin_url,
            urlencoding::encode(audio_url)
        )
    }

    /// Crea la llamada saliente con AMD habilitado.
    pub async fn place_call(&self, to: &str, twiml_url: &str) -> Result<CallResource> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls.json",
            self.api_base, self.config.account_sid
        );

        let params = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Url", twiml_url),
            ("MachineDetection", MACHINE_DETECTION),
            ("MachineDetectionTimeout", MACHINE_DETECTION_TIMEOUT_SECS),
            (
                "MachineDetectionSpeechThreshold",
                MACHINE_DETECTION_SPEECH_THRESHOLD_MS,
            ),
            (
                "MachineDetectionSpeechEndThreshold",
                MACHINE_DETECTION_SPEECH_END_THRESHOLD_MS,
            ),
            (
                "MachineDetectionSilenceTimeout",
                MACHINE_DETECTION_SILENCE_TIMEOUT_MS,
            ),
        ];

        let resp = self
            .http_client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .context("Fallo al hacer POST de la llamada a Twilio")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Twilio rechazó la llamada (status {}): {}",
                status,
                body_txt
            ));
        }

        let call = resp
            .json::<CallResource>()
            .await
            .context("Respuesta de Twilio no parseable")?;
        log::info!("Llamada creada: Call SID={}", call.sid);
        Ok(call)
    }

    /// Re-consulta una llamada para obtener status y resultado del AMD.
    pub async fn fetch_call(&self, call_sid: &str) -> Result<CallResource> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Calls/{}.json",
            self.api_base, self.config.account_sid, call_sid
        );

        let resp = self
            .http_client
            .get(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .send()
            .await
            .context("Fallo al consultar la llamada en Twilio")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!(
                "Twilio no devolvió la llamada {} (status {}): {}",
                call_sid,
                status,
                body_txt
            ));
        }

        resp.json::<CallResource>()
            .await
            .context("Respuesta de Twilio no parseable")
    }
}
