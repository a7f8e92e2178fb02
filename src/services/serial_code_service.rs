//! services/serial_code_service.rs
//! CRUD de códigos seriales sobre SQLite, incluido el canje atómico.

use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::path::Path;

use crate::models::serial_code_model::{
    RedeemOutcome, ResetOutcome, SerialCodeRecord, SerialCodeSeed,
};

#[derive(Clone, Debug)]
pub struct SerialCodeService {
    db_pool: Pool<Sqlite>,
}

impl SerialCodeService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SerialCodeService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations/serial_codes")
            .run(&self.db_pool)
            .await?;
        Ok(())
    }

    /// Siembra la tabla desde un JSON la primera vez (tabla vacía).
    /// Formato: { "1234": { "audio_url": "...", "used": false }, ... }
    pub async fn seed_from_file(&self, path: &str) -> Result<()> {
        if self.count().await? > 0 {
            return Ok(());
        }

        if !Path::new(path).exists() {
            log::warn!("No se encontró {}; la tabla serial_codes queda vacía", path);
            return Ok(());
        }

        log::info!("Tabla serial_codes vacía; cargando datos iniciales de {}", path);
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("No se pudo leer {}", path))?;
        let seeds: HashMap<String, SerialCodeSeed> =
            serde_json::from_str(&raw).with_context(|| format!("JSON inválido en {}", path))?;

        for (code, seed) in &seeds {
            sqlx::query(
                r#"
                INSERT INTO serial_codes (code, audio_url, used)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(code) DO NOTHING
                "#,
            )
            .bind(code)
            .bind(&seed.audio_url)
            .bind(seed.used)
            .execute(&self.db_pool)
            .await
            .context("Fallo al insertar código serial inicial")?;
        }

        log::info!("Datos iniciales cargados: {} códigos", seeds.len());
        Ok(())
    }

    pub async fn count(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM serial_codes")
            .fetch_one(&self.db_pool)
            .await?;
        Ok(count)
    }

    pub async fn get(&self, code: &str) -> Result<Option<SerialCodeRecord>> {
        let record = sqlx::query_as::<_, SerialCodeRecord>(
            "SELECT code, audio_url, used FROM serial_codes WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al buscar código serial")?;
        Ok(record)
    }

    /// Canjea un código: si existe y no está usado, lo marca usado y
    /// devuelve su audio_url. El UPDATE condicional hace de guarda: si
    /// dos llamadas canjean a la vez, solo una ve rows_affected == 1.
    pub async fn redeem(&self, code: &str) -> Result<RedeemOutcome> {
        let record = match self.get(code).await? {
            Some(r) => r,
            None => return Ok(RedeemOutcome::NotFound),
        };

        if record.used {
            return Ok(RedeemOutcome::AlreadyUsed);
        }

        let result = sqlx::query("UPDATE serial_codes SET used = 1 WHERE code = ?1 AND used = 0")
            .bind(code)
            .execute(&self.db_pool)
            .await
            .context("Fallo al marcar código como usado")?;

        if result.rows_affected() == 0 {
            // Alguien lo canjeó entre el SELECT y el UPDATE.
            return Ok(RedeemOutcome::AlreadyUsed);
        }

        log::info!("Código {} marcado como usado", code);
        Ok(RedeemOutcome::Redeemed(record.audio_url))
    }

    /// Reset administrativo de un código puntual.
    pub async fn reset_code(&self, code: &str) -> Result<ResetOutcome> {
        let record = match self.get(code).await? {
            Some(r) => r,
            None => return Ok(ResetOutcome::NotFound),
        };

        if !record.used {
            return Ok(ResetOutcome::AlreadyUnused);
        }

        sqlx::query("UPDATE serial_codes SET used = 0 WHERE code = ?1")
            .bind(code)
            .execute(&self.db_pool)
            .await
            .context("Fallo al resetear código")?;

        Ok(ResetOutcome::Reset)
    }

    /// Marca todos los códigos como no usados; devuelve cuántos cambió.
    pub async fn reset_all(&self) -> Result<u64> {
        let result = sqlx::query("UPDATE serial_codes SET used = 0 WHERE used = 1")
            .execute(&self.db_pool)
            .await
            .context("Fallo al resetear todos los códigos")?;
        Ok(result.rows_affected())
    }
}
