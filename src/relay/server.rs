use crate::config::RelayConfig;
use crate::domain::model::UploadFile;
use crate::relay::error::RelayError;
use crate::relay::service::RelayService;
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer};
use futures::StreamExt;

pub const PROCESS_ROUTE: &str = "/api/dify-process";

/// `userId` 只保留前面這些位元組，其餘丟棄
pub const MAX_USER_ID_BYTES: usize = 256;

/// 從 multipart 請求取出的欄位
#[derive(Debug, Default)]
pub struct IncomingForm {
    pub file: Option<UploadFile>,
    pub user_id: Option<String>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(PROCESS_ROUTE, web::post().to(process_file));
}

async fn process_file(
    service: web::Data<RelayService>,
    payload: Multipart,
) -> Result<HttpResponse, RelayError> {
    tracing::info!("=== Relay request start ===");

    // 設定缺漏時不讀取上傳內容，也不呼叫上游
    service.ensure_configured()?;

    let form = read_form(payload, service.max_file_size())
        .await
        .map_err(|e| {
            tracing::error!("Failed to read multipart body: {}", e);
            RelayError::internal(e)
        })?;

    let success = service.relay(form.file, form.user_id).await?;
    Ok(HttpResponse::Ok().json(success))
}

/// 讀取 `file` 與 `userId` 欄位，其餘欄位略過。
/// 超過 `max_size` 的檔案只記錄大小，不保留內容；`userId` 最多保留 `MAX_USER_ID_BYTES`
pub async fn read_form(
    mut payload: Multipart,
    max_size: u64,
) -> Result<IncomingForm, MultipartError> {
    let mut form = IncomingForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        match name.as_str() {
            "file" if form.file.is_none() => {
                form.file = Some(read_file_field(&mut field, max_size).await?);
            }
            "userId" if form.user_id.is_none() => {
                let bytes = read_prefix(&mut field, MAX_USER_ID_BYTES).await?;
                form.user_id = Some(String::from_utf8_lossy(&bytes).into_owned());
            }
            _ => drain(&mut field).await?,
        }
    }

    Ok(form)
}

async fn read_file_field(field: &mut Field, max_size: u64) -> Result<UploadFile, MultipartError> {
    let name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .unwrap_or_default()
        .to_string();
    let mime_type = field
        .content_type()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default();

    let mut bytes = Vec::new();
    let mut size: u64 = 0;
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        size += chunk.len() as u64;
        if size <= max_size {
            bytes.extend_from_slice(&chunk);
        }
    }

    Ok(UploadFile {
        name,
        mime_type,
        size,
        bytes,
    })
}

async fn read_prefix(field: &mut Field, limit: usize) -> Result<Vec<u8>, MultipartError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        let room = limit.saturating_sub(bytes.len());
        bytes.extend_from_slice(&chunk[..room.min(chunk.len())]);
    }
    Ok(bytes)
}

async fn drain(field: &mut Field) -> Result<(), MultipartError> {
    while let Some(chunk) = field.next().await {
        chunk?;
    }
    Ok(())
}

/// 啟動中繼伺服器並持續服務，直到收到停止訊號
pub async fn run(config: RelayConfig) -> std::io::Result<()> {
    let service = RelayService::from_config(&config).map_err(|e| {
        tracing::error!("Failed to build relay service: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    if service.ensure_configured().is_err() {
        tracing::warn!("⚠️ DIFY_API_URL / DIFY_API_KEY not set; every request will fail with a configuration error");
    }

    let service = web::Data::new(service);
    tracing::info!("🚀 Relay listening on {}{}", config.bind, PROCESS_ROUTE);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(service.clone())
            .configure(configure)
    })
    .bind(&config.bind)?
    .run()
    .await
}
