//! handlers/admin_handler.rs
//! Endpoints administrativos (sin autenticación, igual que el original)
//! y la página raíz de verificación.

use actix_web::{web, HttpResponse};

use crate::models::serial_code_model::ResetOutcome;
use crate::services::serial_code_service::SerialCodeService;

/// GET /admin/reset_code/{code} — vuelve un código a no usado.
pub async fn reset_code_endpoint(
    serial_service: web::Data<SerialCodeService>,
    path: web::Path<String>,
) -> HttpResponse {
    let code = path.into_inner();

    match serial_service.reset_code(&code).await {
        Ok(ResetOutcome::NotFound) => HttpResponse::NotFound()
            .content_type("text/plain; charset=utf-8")
            .body(format!("エラー: コード \"{}\" は存在しません。", code)),
        Ok(ResetOutcome::AlreadyUnused) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(format!("コード \"{}\" は既に未使用です。", code)),
        Ok(ResetOutcome::Reset) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(format!("コード \"{}\" を未使用に戻しました。", code)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}

/// GET /admin/reset_all — vuelve todos los códigos a no usados.
pub async fn reset_all_endpoint(serial_service: web::Data<SerialCodeService>) -> HttpResponse {
    match serial_service.reset_all().await {
        Ok(count) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(format!("{}個のコードを未使用に戻しました。", count)),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}

/// GET / — página de verificación de que el servidor está arriba.
pub async fn index_endpoint() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(
            r#"<html>
    <head>
        <meta charset="utf-8">
        <title>Twilio Voice Service</title>
    </head>
    <body>
        <h1>Twilio シリアルコード認証型音声配信サービス</h1>
        <p>サーバーは正常に動作しています。</p>
        <p>Twilio管理画面で、着信時のWebhook URLを設定してください。</p>
        <ul>
            <li>Voice URL: <code>/voice</code></li>
        </ul>
    </body>
</html>"#,
        )
}
