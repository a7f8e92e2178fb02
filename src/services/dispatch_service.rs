//! services/dispatch_service.rs
//! Recorre las reservas vencidas y ejecuta las llamadas salientes,
//! aplicando la política de reintentos sobre el resultado del AMD.

use anyhow::{anyhow, Context, Result};
use chrono::Duration as ChronoDuration;
use std::time::Duration;

use crate::config::app_config::DispatchConfig;
use crate::config::audio_map::AudioCatalog;
use crate::models::reservation_model::CallReservationRecord;
use crate::services::reservation_service::ReservationService;
use crate::services::scheduling;
use crate::services::twilio_service::TwilioService;

/// Decisión final sobre una llamada ya consultada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallOutcome {
    /// Volver a 'waiting' y reintentar más tarde.
    Retry,
    /// Atendió una persona y la llamada terminó bien.
    Called,
    /// Fallo definitivo (o se agotaron los reintentos).
    Error,
}

/// Tabla de decisión: ocupado / sin respuesta / fallida o contestador
/// detectado reintenta mientras quede presupuesto; 'completed' atendida
/// por humano cierra en éxito; el resto cierra en error.
pub fn evaluate_call(
    call_status: &str,
    answered_by: Option<&str>,
    retry_count: i64,
    max_retry_count: i64,
) -> CallOutcome {
    // Con DetectMessageEnd el AMD reporta variantes machine_start,
    // machine_end_beep, etc.; todas cuentan como contestador.
    let machine_answered = answered_by
        .map(|a| a.starts_with("machine"))
        .unwrap_or(false);

    let retry_needed =
        matches!(call_status, "busy" | "no-answer" | "failed") || machine_answered;

    if retry_needed && retry_count < max_retry_count {
        return CallOutcome::Retry;
    }

    if call_status == "completed" && answered_by == Some("human") {
        CallOutcome::Called
    } else {
        CallOutcome::Error
    }
}

pub struct DispatchService {
    reservation_service: ReservationService,
    /// None en modo DRY_RUN.
    twilio: Option<TwilioService>,
    audio_catalog: AudioCatalog,
    config: DispatchConfig,
}

impl DispatchService {
    pub fn new(
        reservation_service: ReservationService,
        twilio: Option<TwilioService>,
        audio_catalog: AudioCatalog,
        config: DispatchConfig,
    ) -> Self {
        DispatchService {
            reservation_service,
            twilio,
            audio_catalog,
            config,
        }
    }

    /// Una pasada del dispatcher: busca reservas vencidas y las procesa
    /// una por una, en secuencia. El error de una reserva se registra en
    /// esa fila y no corta el lote.
    pub async fn execute(&self) -> Result<()> {
        let now = scheduling::now_jst();
        let now_str = now.to_rfc3339();

        log::info!("Buscando reservas para llamar (ahora: {})", now_str);
        let targets = self.reservation_service.due_reservations(&now_str).await?;

        if targets.is_empty() {
            log::info!("No hay reservas pendientes de llamada");
            return Ok(());
        }

        log::info!("{} reservas listas para llamar", targets.len());

        for target in targets {
            log::info!(
                "--- Procesando order_id={} tel={} oshi={} ---",
                target.id,
                target.phone_number,
                target.oshi_name
            );

            if let Err(e) = self.process_reservation(&target).await {
                log::error!("order_id={} falló: {:?}", target.id, e);
                self.reservation_service
                    .mark_error(&target.id, &format!("{:?}", e), None, None)
                    .await?;
            }
        }

        log::info!("Pasada de llamadas terminada");
        Ok(())
    }

    async fn process_reservation(&self, target: &CallReservationRecord) -> Result<()> {
        let audio_url = self
            .audio_catalog
            .url_for(&target.oshi_name)
            .ok_or_else(|| {
                anyhow!("No hay audio configurado para el oshi '{}'", target.oshi_name)
            })?;

        let now_str = scheduling::now_jst().to_rfc3339();

        if self.config.dry_run {
            log::info!(
                "[DRY RUN] No se llama de verdad. Audio: {}",
                audio_url
            );
            self.reservation_service
                .mark_called(&target.id, &now_str, "dry-run")
                .await?;
            return Ok(());
        }

        let twilio = self
            .twilio
            .as_ref()
            .context("Cliente Twilio no inicializado fuera de DRY_RUN")?;

        let twiml_url = twilio.twiml_url_for(audio_url);
        let call = twilio.place_call(&target.phone_number, &twiml_url).await?;

        // El AMD tarda en clasificar; esperamos antes de consultar.
        tokio::time::sleep(Duration::from_secs(self.config.status_poll_delay_secs)).await;

        let call_info = twilio.fetch_call(&call.sid).await?;
        let answered_by = call_info.answered_by.as_deref();
        log::info!(
            "order_id={} status={} answered_by={:?}",
            target.id,
            call_info.status,
            answered_by
        );

        let last_call_status = format!(
            "{} / {}",
            call_info.status,
            answered_by.unwrap_or("unknown")
        );

        match evaluate_call(
            &call_info.status,
            answered_by,
            target.retry_count,
            self.config.max_retry_count,
        ) {
            CallOutcome::Retry => {
                let next_time = scheduling::now_jst()
                    + ChronoDuration::minutes(self.config.retry_interval_minutes);
                let new_count = target.retry_count + 1;
                self.reservation_service
                    .schedule_retry(
                        &target.id,
                        &next_time.to_rfc3339(),
                        new_count,
                        &last_call_status,
                    )
                    .await?;
                log::info!(
                    "order_id={} se reintenta en {} min ({}/{})",
                    target.id,
                    self.config.retry_interval_minutes,
                    new_count,
                    self.config.max_retry_count
                );
            }
            CallOutcome::Called => {
                self.reservation_service
                    .mark_called(&target.id, &now_str, &last_call_status)
                    .await?;
                log::info!("order_id={} atendida por una persona", target.id);
            }
            CallOutcome::Error => {
                self.reservation_service
                    .mark_error(
                        &target.id,
                        &format!("Fallo definitivo: {}", last_call_status),
                        Some(&last_call_status),
                        Some(&now_str),
                    )
                    .await?;
                log::error!(
                    "order_id={} cerrada en error ({})",
                    target.id,
                    last_call_status
                );
            }
        }

        Ok(())
    }
}
