//! handlers/voice_handler.rs
//! Endpoints del flujo de llamada entrante: /voice, /check_code y /audio.

use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::path::PathBuf;

use crate::config::app_config::AppConfig;
use crate::models::serial_code_model::RedeemOutcome;
use crate::services::serial_code_service::SerialCodeService;
use crate::services::twiml::{Gather, VoiceResponse};

const LANG_JA: &str = "ja-JP";

/// Twilio manda los dígitos en el campo "Digits" del form.
#[derive(Deserialize)]
pub struct CheckCodeForm {
    #[serde(rename = "Digits")]
    pub digits: Option<String>,
}

fn twiml_response(xml: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .body(xml)
}

/// GET|POST /voice — saludo inicial y Gather de los dígitos del código.
pub async fn voice_endpoint(config: web::Data<AppConfig>) -> HttpResponse {
    let mut response = VoiceResponse::new();

    response.gather(
        Gather::new("/check_code")
            .num_digits(config.gather_digits)
            .timeout_secs(config.gather_timeout_secs)
            .say(
                "こんにちは。シリアルコードを入力してください。",
                LANG_JA,
            ),
    );

    // Si el Gather expira sin entrada, seguimos acá.
    response.say(
        "入力が確認できませんでした。もう一度おかけ直しください。",
        LANG_JA,
    );

    twiml_response(response.to_xml())
}

/// POST /check_code — valida el código y decide qué se reproduce.
pub async fn check_code_endpoint(
    serial_service: web::Data<SerialCodeService>,
    config: web::Data<AppConfig>,
    form: web::Form<CheckCodeForm>,
    req: HttpRequest,
) -> HttpResponse {
    let digits = form.into_inner().digits.unwrap_or_default();
    log::info!("Código ingresado: {}", digits);

    let mut response = VoiceResponse::new();

    match serial_service.redeem(&digits).await {
        Ok(RedeemOutcome::NotFound) => {
            response
                .say(
                    "入力されたシリアルコードが見つかりません。もう一度確認してください。",
                    LANG_JA,
                )
                .hangup();
        }
        Ok(RedeemOutcome::AlreadyUsed) => {
            response
                .say("このシリアルコードは既に使用されています。", LANG_JA)
                .hangup();
        }
        Ok(RedeemOutcome::Redeemed(audio_url)) => {
            let resolved = resolve_audio_url(&audio_url, &config, &req);
            log::info!("URL de reproducción: {}", resolved);

            response
                .say("認証に成功しました。音声を再生します。", LANG_JA)
                .play(&resolved)
                .say("ご利用ありがとうございました。", LANG_JA);
        }
        Err(e) => {
            log::error!("Fallo al canjear el código {}: {:?}", digits, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error",
                "details": format!("{:?}", e)
            }));
        }
    }

    twiml_response(response.to_xml())
}

/// Convierte audio_url en una URL absoluta que Twilio pueda descargar.
/// Si ya es http(s) se respeta; si es un archivo, se apunta a /audio/
/// usando PUBLIC_BASE_URL o, en su defecto, los datos de conexión del
/// request (connection_info ya considera X-Forwarded-Proto, así que
/// detrás del proxy sale https).
fn resolve_audio_url(audio_url: &str, config: &AppConfig, req: &HttpRequest) -> String {
    if audio_url.starts_with("http://") || audio_url.starts_with("https://") {
        return audio_url.to_string();
    }

    let base = match &config.public_base_url {
        Some(base) => base.trim_end_matches('/').to_string(),
        None => {
            let info = req.connection_info();
            format!("{}://{}", info.scheme(), info.host())
        }
    };

    format!("{}/audio/{}", base, audio_url)
}

/// GET /audio/{filename} — sirve el archivo de audio local.
pub async fn serve_audio_endpoint(
    config: web::Data<AppConfig>,
    path: web::Path<String>,
) -> Result<NamedFile, actix_web::Error> {
    let filename = path.into_inner();

    // El patrón de ruta ya impide '/'; esto corta cualquier '..'.
    if filename.contains("..") {
        return Err(actix_web::error::ErrorNotFound("archivo no encontrado"));
    }

    let audio_path = PathBuf::from(&config.audio_dir).join(&filename);
    Ok(NamedFile::open(audio_path)?)
}
