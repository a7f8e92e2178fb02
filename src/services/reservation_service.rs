//! services/reservation_service.rs
//! Persistencia de las reservas de llamadas (tabla call_reservations).

use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;

use crate::models::reservation_model::{
    CallReservationRecord, STATUS_CALLED, STATUS_ERROR, STATUS_WAITING,
};

#[derive(Clone, Debug)]
pub struct ReservationService {
    db_pool: Pool<Sqlite>,
}

impl ReservationService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        ReservationService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations/call_reservations")
            .run(&self.db_pool)
            .await?;
        Ok(())
    }

    /// id -> status de todas las reservas; se usa para la idempotencia
    /// del import (saltar las que ya están 'called').
    pub async fn list_statuses(&self) -> Result<HashMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT id, status FROM call_reservations")
                .fetch_all(&self.db_pool)
                .await
                .context("Fallo al listar estados de reservas")?;
        Ok(rows.into_iter().collect())
    }

    /// Upsert por id. En conflicto se actualizan los datos del pedido y
    /// el estado vuelve a 'waiting'; retry_count y compañía no se tocan.
    pub async fn upsert(
        &self,
        id: &str,
        phone_number: &str,
        oshi_name: &str,
        preferred_date: &str,
        time_slot: &str,
        scheduled_at: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO call_reservations (
                id, phone_number, oshi_name, preferred_date,
                time_slot, scheduled_at, status
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                phone_number = excluded.phone_number,
                oshi_name = excluded.oshi_name,
                preferred_date = excluded.preferred_date,
                time_slot = excluded.time_slot,
                scheduled_at = excluded.scheduled_at,
                status = excluded.status
            "#,
        )
        .bind(id)
        .bind(phone_number)
        .bind(oshi_name)
        .bind(preferred_date)
        .bind(time_slot)
        .bind(scheduled_at)
        .bind(STATUS_WAITING)
        .execute(&self.db_pool)
        .await
        .context("Fallo al hacer upsert de la reserva")?;

        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<CallReservationRecord>> {
        let record = sqlx::query_as::<_, CallReservationRecord>(
            r#"
            SELECT id, phone_number, oshi_name, preferred_date, time_slot,
                   scheduled_at, status, retry_count, last_call_status,
                   error_message, called_at
            FROM call_reservations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al buscar reserva")?;
        Ok(record)
    }

    /// Reservas vencidas: status 'waiting' y horario <= ahora.
    /// La comparación es textual; vale porque todo se guarda en JST.
    pub async fn due_reservations(&self, now_rfc3339: &str) -> Result<Vec<CallReservationRecord>> {
        let rows = sqlx::query_as::<_, CallReservationRecord>(
            r#"
            SELECT id, phone_number, oshi_name, preferred_date, time_slot,
                   scheduled_at, status, retry_count, last_call_status,
                   error_message, called_at
            FROM call_reservations
            WHERE status = ?1 AND scheduled_at <= ?2
            ORDER BY scheduled_at
            "#,
        )
        .bind(STATUS_WAITING)
        .bind(now_rfc3339)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al consultar reservas vencidas")?;
        Ok(rows)
    }

    /// Cierra la reserva como llamada con éxito.
    pub async fn mark_called(
        &self,
        id: &str,
        called_at: &str,
        last_call_status: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE call_reservations
            SET status = ?2, called_at = ?3, last_call_status = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(STATUS_CALLED)
        .bind(called_at)
        .bind(last_call_status)
        .execute(&self.db_pool)
        .await
        .context("Fallo al marcar reserva como llamada")?;
        Ok(())
    }

    /// Reprograma: vuelve a 'waiting' con retry_count incrementado y
    /// nuevo horario.
    pub async fn schedule_retry(
        &self,
        id: &str,
        next_scheduled_at: &str,
        new_retry_count: i64,
        last_call_status: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE call_reservations
            SET status = ?2, retry_count = ?3, scheduled_at = ?4,
                last_call_status = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(STATUS_WAITING)
        .bind(new_retry_count)
        .bind(next_scheduled_at)
        .bind(last_call_status)
        .execute(&self.db_pool)
        .await
        .context("Fallo al reprogramar la reserva")?;
        Ok(())
    }

    /// Cierra la reserva en error definitivo (con o sin resultado de
    /// llamada, según de dónde venga el fallo).
    pub async fn mark_error(
        &self,
        id: &str,
        error_message: &str,
        last_call_status: Option<&str>,
        called_at: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE call_reservations
            SET status = ?2, error_message = ?3,
                last_call_status = COALESCE(?4, last_call_status),
                called_at = COALESCE(?5, called_at)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(STATUS_ERROR)
        .bind(error_message)
        .bind(last_call_status)
        .bind(called_at)
        .execute(&self.db_pool)
        .await
        .context("Fallo al registrar error en la reserva")?;
        Ok(())
    }
}
