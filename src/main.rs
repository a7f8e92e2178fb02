//! main.rs
//! Servidor de voz entrante: Twilio llama a /voice, el usuario marca su
//! código serial y, si es válido, se reproduce el audio asociado.

use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::{Pool, Sqlite};

use voice_service::app;
use voice_service::config::app_config::AppConfig;
use voice_service::logger::init_logger;
use voice_service::services::serial_code_service::SerialCodeService;

async fn setup_database() -> Pool<Sqlite> {
    // DATABASE_URL manda; si no está, SQLite local en ./data
    let db_url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            std::fs::create_dir_all("data").expect("No se pudo crear directorio 'data'");
            let db_path = std::env::current_dir()
                .expect("No se pudo obtener el current_dir")
                .join("data")
                .join("serial_codes.db");
            // mode=rwc: crea el archivo si no existe
            format!("sqlite:{}?mode=rwc", db_path.to_string_lossy())
        }
    };

    log::info!("Conectando a SQLite en {}", db_url);

    Pool::<Sqlite>::connect(&db_url)
        .await
        .expect("No se pudo conectar a la base de datos SQLite.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let config = AppConfig::from_env();

    let db_pool = setup_database().await;

    let serial_service = SerialCodeService::new(db_pool.clone());
    if let Err(e) = serial_service.run_migrations().await {
        panic!("Fallo en migraciones de 'serial_codes': {:?}", e);
    }

    // Datos iniciales desde serial_codes.json si la tabla está vacía.
    if let Err(e) = serial_service.seed_from_file(&config.serial_codes_file).await {
        panic!("Fallo cargando datos iniciales: {:?}", e);
    }

    let bind_addr = ("0.0.0.0", config.port);
    log::info!("Levantando servidor en {}:{}", bind_addr.0, bind_addr.1);

    let config_data = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(serial_service.clone()))
            .app_data(config_data.clone())
            .configure(app::init_app)
    })
    .workers(1)
    .bind(bind_addr)?
    .run()
    .await
}
