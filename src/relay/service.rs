use crate::config::RelayConfig;
use crate::core::validator::FileValidator;
use crate::domain::model::{RelaySuccess, UploadFile};
use crate::relay::error::RelayError;
use crate::relay::normalize::normalize;
use crate::utils::error::Result;
use crate::utils::text::{looks_like_html, preview};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

/// 前端沒有帶 userId 時使用的預設值
pub const DEFAULT_USER_ID: &str = "user-12345";

/// 上游回應無法解析時錯誤訊息附帶的預覽長度
const PREVIEW_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            api_url: config.api_url(),
            api_key: config.api_key(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// 上游工作流程 API 的連線憑證
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub api_url: &'a str,
    pub api_key: &'a str,
}

/// 中繼服務：唯一持有上游 API Key 的元件，每個請求之間不保留任何狀態
#[derive(Debug, Clone)]
pub struct RelayService {
    client: Client,
    settings: RelaySettings,
    validator: FileValidator,
}

impl RelayService {
    pub fn new(settings: RelaySettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self {
            client,
            settings,
            validator: FileValidator::default(),
        })
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Self::new(RelaySettings::from(config))
    }

    pub fn max_file_size(&self) -> u64 {
        self.validator.max_size()
    }

    pub fn ensure_configured(&self) -> std::result::Result<Credentials<'_>, RelayError> {
        let api_url = self.settings.api_url.as_deref().filter(|v| !v.is_empty());
        let api_key = self.settings.api_key.as_deref().filter(|v| !v.is_empty());

        match (api_url, api_key) {
            (Some(api_url), Some(api_key)) => Ok(Credentials { api_url, api_key }),
            _ => {
                tracing::error!(
                    has_api_url = api_url.is_some(),
                    has_api_key = api_key.is_some(),
                    "Missing workflow API configuration"
                );
                Err(RelayError::Configuration)
            }
        }
    }

    /// 驗證檔案、轉送至工作流程 API，並將回應整理成固定格式
    pub async fn relay(
        &self,
        file: Option<UploadFile>,
        user_id: Option<String>,
    ) -> std::result::Result<RelaySuccess, RelayError> {
        let credentials = self.ensure_configured()?;

        let file = file.ok_or(RelayError::MissingFile)?;
        let user_id = user_id
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        tracing::info!(
            file_name = %file.name,
            file_size = file.size,
            file_type = %file.mime_type,
            user_id = %user_id,
            "📥 Relay request received"
        );

        self.validator
            .check(&file)
            .map_err(RelayError::Rejected)?;

        let filename = file.name.clone();
        let payload = self.forward(credentials, file, &user_id).await?;

        normalize(&payload, &filename).inspect_err(|e| {
            tracing::error!("Invalid workflow response structure: {}", e);
        })
    }

    async fn forward(
        &self,
        credentials: Credentials<'_>,
        file: UploadFile,
        user_id: &str,
    ) -> std::result::Result<serde_json::Value, RelayError> {
        let part = Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime_type)
            .map_err(RelayError::internal)?;

        let form = Form::new()
            .text("inputs", "{}")
            .text("response_mode", "blocking")
            .text("user", user_id.to_string())
            .part("files", part);

        tracing::info!("📤 Sending request to workflow API: {}", credentials.api_url);

        let response = self
            .client
            .post(credentials.api_url)
            .bearer_auth(credentials.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        tracing::info!("Workflow API response status: {}", status);

        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            tracing::error!("Workflow API error response: {}", preview(&text, PREVIEW_CHARS));
            return Err(upstream_error(status.as_u16(), &text));
        }

        tracing::debug!("Workflow API raw response: {}", text);

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("JSON parse error: {}", e);
            RelayError::MalformedJson {
                preview: preview(&text, PREVIEW_CHARS),
            }
        })
    }
}

/// 上游非成功狀態：HTML 錯誤頁一律回 500，JSON 取其 message，否則原文照回
fn upstream_error(status: u16, text: &str) -> RelayError {
    if looks_like_html(text) {
        return RelayError::UpstreamHtml { status };
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(json) => {
            let message = json
                .get("message")
                .and_then(|v| v.as_str())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| text.to_string());
            RelayError::UpstreamJson { status, message }
        }
        Err(_) => RelayError::UpstreamText {
            status,
            body: text.to_string(),
        },
    }
}

/// 連線失敗（拒絕連線、DNS、逾時）歸類為網路錯誤，其餘視為內部錯誤
fn transport_error(err: reqwest::Error) -> RelayError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        tracing::error!("Network error while calling workflow API: {}", err);
        RelayError::Network {
            details: err.to_string(),
        }
    } else {
        tracing::error!("Unexpected error while calling workflow API: {:?}", err);
        RelayError::internal(err)
    }
}
