//! services/import_service.rs
//! Import del CSV de pedidos de llamada hacia la tabla call_reservations.

use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::models::reservation_model::{
    ImportRow, ImportSummary, REQUIRED_CSV_COLUMNS, STATUS_CALLED,
};
use crate::services::reservation_service::ReservationService;
use crate::services::scheduling;

#[derive(Clone)]
pub struct ImportService {
    reservation_service: ReservationService,
}

impl ImportService {
    pub fn new(reservation_service: ReservationService) -> Self {
        ImportService {
            reservation_service,
        }
    }

    /// Lee el CSV y hace upsert fila por fila. Los errores de una fila
    /// se registran y se sigue con la siguiente; nunca abortan el lote.
    pub async fn import_csv(&self, csv_path: &Path) -> Result<ImportSummary> {
        log::info!("Leyendo CSV: {}", csv_path.display());

        let mut reader = csv::Reader::from_path(csv_path)
            .with_context(|| format!("No se pudo abrir el CSV {}", csv_path.display()))?;

        // Validar columnas obligatorias antes de procesar nada.
        let headers = reader
            .headers()
            .context("No se pudieron leer las cabeceras del CSV")?
            .clone();
        let missing: Vec<&str> = REQUIRED_CSV_COLUMNS
            .iter()
            .copied()
            .filter(|col| !headers.iter().any(|h| h == *col))
            .collect();
        if !missing.is_empty() {
            return Err(anyhow!("Faltan columnas en el CSV: {:?}", missing));
        }

        // Estados ya persistidos, para saltar pedidos ya llamados.
        let existing = self.reservation_service.list_statuses().await?;

        let mut summary = ImportSummary::default();

        for (index, result) in reader.deserialize::<ImportRow>().enumerate() {
            let line = index + 1;

            let row = match result {
                Ok(row) => row,
                Err(e) => {
                    log::error!("[{}] Fila ilegible: {}", line, e);
                    summary.errors += 1;
                    continue;
                }
            };

            if existing.get(&row.order_id).map(|s| s.as_str()) == Some(STATUS_CALLED) {
                log::info!(
                    "[{}] order_id={} ya fue llamado, se salta",
                    line,
                    row.order_id
                );
                summary.skipped += 1;
                continue;
            }

            match self.import_row(&row).await {
                Ok(scheduled_at) => {
                    log::info!(
                        "[{}] order_id={} registrado (llamada programada: {})",
                        line,
                        row.order_id,
                        scheduled_at
                    );
                    summary.imported += 1;
                }
                Err(e) => {
                    log::error!("[{}] order_id={} falló: {:?}", line, row.order_id, e);
                    summary.errors += 1;
                }
            }
        }

        log::info!(
            "Import terminado: ok={}, saltados={}, errores={}",
            summary.imported,
            summary.skipped,
            summary.errors
        );
        Ok(summary)
    }

    /// Normaliza, sortea el horario y persiste una fila. Devuelve el
    /// horario programado en RFC3339.
    async fn import_row(&self, row: &ImportRow) -> Result<String> {
        let phone_number = scheduling::normalize_phone_number(&row.phone_number);

        let scheduled_at = scheduling::generate_random_datetime(
            &row.preferred_date,
            &row.time_slot,
            &mut rand::thread_rng(),
        )?
        .to_rfc3339();

        self.reservation_service
            .upsert(
                &row.order_id,
                &phone_number,
                &row.oshi_name,
                &row.preferred_date,
                &row.time_slot,
                &scheduled_at,
            )
            .await?;

        Ok(scheduled_at)
    }
}
