//! tests/mod.rs
//! Pruebas unitarias de la lógica de negocio.

mod dispatch_tests;
mod import_tests;
mod reservation_tests;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

/// Pool en memoria limitado a una conexión: con más de una, cada
/// conexión vería su propia base de datos vacía.
pub async fn memory_pool() -> Pool<Sqlite> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria")
}
