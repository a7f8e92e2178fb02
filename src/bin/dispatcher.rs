//! bin/dispatcher.rs
//! CLI de llamadas salientes: `dispatcher import <csv>` carga pedidos y
//! les sortea un horario; `dispatcher execute` llama a los que ya
//! vencieron, con reintentos acotados si no atiende una persona.

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;

use voice_service::config::app_config::{DispatchConfig, TwilioConfig};
use voice_service::config::audio_map::AudioCatalog;
use voice_service::logger::init_logger;
use voice_service::services::dispatch_service::DispatchService;
use voice_service::services::import_service::ImportService;
use voice_service::services::reservation_service::ReservationService;
use voice_service::services::twilio_service::TwilioService;

#[derive(Parser)]
#[command(name = "dispatcher", about = "Programa e importa llamadas salientes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importa un CSV de pedidos (order_id, phone_number, oshi_name,
    /// preferred_date, time_slot) y programa los horarios de llamada.
    Import { csv_path: PathBuf },
    /// Llama a todas las reservas en 'waiting' cuyo horario ya pasó.
    Execute,
}

async fn setup_database() -> Pool<Sqlite> {
    let db_url = match std::env::var("CALLS_DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            std::fs::create_dir_all("data").expect("No se pudo crear directorio 'data'");
            let db_path = std::env::current_dir()
                .expect("No se pudo obtener el current_dir")
                .join("data")
                .join("call_reservations.db");
            format!("sqlite:{}?mode=rwc", db_path.to_string_lossy())
        }
    };

    log::info!("Conectando a SQLite en {}", db_url);

    Pool::<Sqlite>::connect(&db_url)
        .await
        .expect("No se pudo conectar a la base de datos SQLite.")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logger();

    let cli = Cli::parse();

    let db_pool = setup_database().await;
    let reservation_service = ReservationService::new(db_pool);
    reservation_service.run_migrations().await?;

    match cli.command {
        Command::Import { csv_path } => {
            let import_service = ImportService::new(reservation_service);
            import_service.import_csv(&csv_path).await?;
        }
        Command::Execute => {
            let dispatch_config = DispatchConfig::from_env();

            // En DRY_RUN ni siquiera se necesitan credenciales.
            let twilio = if dispatch_config.dry_run {
                log::info!("Modo DRY RUN: no se harán llamadas reales");
                None
            } else {
                Some(TwilioService::new(TwilioConfig::from_env()?))
            };

            let audio_catalog = AudioCatalog::load()?;
            let dispatch_service = DispatchService::new(
                reservation_service,
                twilio,
                audio_catalog,
                dispatch_config,
            );
            dispatch_service.execute().await?;
        }
    }

    Ok(())
}
